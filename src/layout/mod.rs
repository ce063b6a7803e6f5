/// Typed model of a captured disk layout description.
///
/// The description is line-oriented, whitespace-delimited,
/// with 4 record kinds relevant to resizing:
///
/// ```text
/// disk <device> <size_bytes> <label_type>
/// part <disk_device> <size_bytes> <start_bytes> <type_or_name> <flags> <part_device>
/// fs   <device> <mountpoint> <fstype> ...
/// swap <device> ...
/// ```
///
/// Comments, disabled records, and unknown keywords are ignored.
/// A known record kind with too few (or malformed) fields is also
/// ignored rather than rejected: a missing `fs` or `swap` record only
/// weakens resize classification, it never fails a recovery run.
#[derive(Debug, Default, PartialEq)]
pub struct Layout {
    pub disks: Vec<Disk>,
    pub partitions: Vec<Partition>,
    pub filesystems: Vec<Filesystem>,
    pub swaps: Vec<Swap>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Disk {
    pub device: String,
    pub size_bytes: u64,
    pub label_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub disk_device: String,
    pub size_bytes: u64,
    pub start_bytes: u64,
    pub part_type: String,
    pub flags: String,
    pub device: String,

    /// Verbatim source line, kept for the rewriter
    pub line: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filesystem {
    pub device: String,
    pub mountpoint: String,
    pub fs_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Swap {
    pub device: String,
}

impl Layout {
    pub fn parse(text: &str) -> Self {
        let mut layout = Self::default();

        for line in text.lines() {
            let fields: Vec<&str> = line.split_whitespace().collect();

            match fields.first() {
                Some(&"disk") => {
                    if let Some(disk) = parse_disk(&fields) {
                        layout.disks.push(disk);
                    }
                }
                Some(&"part") => {
                    if let Some(part) = parse_partition(&fields, line) {
                        layout.partitions.push(part);
                    }
                }
                Some(&"fs") => {
                    if let Some(fs) = parse_filesystem(&fields) {
                        layout.filesystems.push(fs);
                    }
                }
                Some(&"swap") => {
                    if let Some(swap) = parse_swap(&fields) {
                        layout.swaps.push(swap);
                    }
                }
                _ => continue,
            }
        }

        layout
    }

    /// Returns the partition of `disk_device` with the greatest start
    /// offset, or None if the disk has no partition records.
    /// Equal start offsets resolve to the record seen last.
    pub fn last_partition(&self, disk_device: &str) -> Option<&Partition> {
        let mut last: Option<&Partition> = None;

        for part in &self.partitions {
            if part.disk_device != disk_device {
                continue;
            }

            match last {
                Some(found) if part.start_bytes < found.start_bytes => continue,
                _ => last = Some(part),
            }
        }

        last
    }

    pub fn filesystem(&self, device: &str) -> Option<&Filesystem> {
        self.filesystems.iter().find(|fs| fs.device == device)
    }

    pub fn has_swap(&self, device: &str) -> bool {
        self.swaps.iter().any(|swap| swap.device == device)
    }
}

fn parse_disk(fields: &[&str]) -> Option<Disk> {
    if fields.len() < 4 {
        return None;
    }

    Some(Disk {
        device: fields[1].to_string(),
        size_bytes: fields[2].parse().ok()?,
        label_type: fields[3].to_string(),
    })
}

fn parse_partition(fields: &[&str], line: &str) -> Option<Partition> {
    if fields.len() < 7 {
        return None;
    }

    Some(Partition {
        disk_device: fields[1].to_string(),
        size_bytes: fields[2].parse().ok()?,
        start_bytes: fields[3].parse().ok()?,
        part_type: fields[4].to_string(),
        flags: fields[5].to_string(),
        device: fields[6].to_string(),
        line: line.to_string(),
    })
}

fn parse_filesystem(fields: &[&str]) -> Option<Filesystem> {
    if fields.len() < 4 {
        return None;
    }

    Some(Filesystem {
        device: fields[1].to_string(),
        mountpoint: fields[2].to_string(),
        fs_type: fields[3].to_string(),
    })
}

fn parse_swap(fields: &[&str]) -> Option<Swap> {
    if fields.len() < 2 {
        return None;
    }

    Some(Swap {
        device: fields[1].to_string(),
    })
}
