pub mod decide;
pub mod eligible;
pub mod rewrite;

use std::collections::HashSet;

use colored::Colorize;
use serde::{
    Deserialize,
    Serialize,
};

use crate::constants::defaults;
use crate::errors::RelayoutError;
use crate::layout::{
    Disk,
    Layout,
    Partition,
};

use self::decide::{
    SizeAction,
    SkipReason,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ResizeMode {
    /// Leave the layout description untouched
    Disabled,

    /// Resize all partitions proportionally (separate component)
    All,

    /// Resize only the last partition of each disk
    LastOnly,
}

#[derive(Debug)]
pub struct ResizeOpts {
    pub mode: ResizeMode,

    /// Partition devices always eligible, overriding every exclusion
    pub include: HashSet<String>,

    /// Literal partition devices and/or sentinels boot, swap, efi
    pub exclude: HashSet<String>,

    pub grow_threshold_pct: u64,
    pub shrink_limit_pct: u64,
}

impl Default for ResizeOpts {
    fn default() -> Self {
        Self {
            mode: ResizeMode::LastOnly,
            include: HashSet::new(),
            exclude: defaults::exclude_spec(),
            grow_threshold_pct: defaults::GROW_THRESHOLD_PCT,
            shrink_limit_pct: defaults::SHRINK_LIMIT_PCT,
        }
    }
}

/// Per-disk decision, collected for the apply report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "skipped")]
    Skipped {
        disk: String,
        partition: String,
        reason: String,
    },

    #[serde(rename = "grown")]
    Grown {
        disk: String,
        partition: String,
        old_size: u64,
        new_size: u64,
    },

    #[serde(rename = "shrunk")]
    Shrunk {
        disk: String,
        partition: String,
        old_size: u64,
        new_size: u64,
    },
}

/// Evaluates every disk in the layout description sequentially and
/// returns the updated text plus one outcome per disk.
///
/// `new_disk_size` supplies the byte size of the replacement disk for
/// a captured disk device. The updated text accumulates at most one
/// changed size field per disk; the first fatal condition aborts the
/// whole run and the working copy is discarded by the caller, so a
/// partially-resized layout is never published.
pub fn resize_last_partitions<F>(
    text: &str,
    opts: &ResizeOpts,
    mut new_disk_size: F,
) -> Result<(String, Vec<Outcome>), RelayoutError>
where
    F: FnMut(&str) -> Result<u64, RelayoutError>,
{
    match opts.mode {
        ResizeMode::Disabled => {
            println!(
                "{}",
                "auto-resize disabled, leaving layout untouched".yellow()
            );

            return Ok((text.to_string(), Vec::new()));
        }
        ResizeMode::All => {
            return Err(RelayoutError::NotImplemented(
                "full-layout resize (mode `all`)".to_string(),
            ));
        }
        ResizeMode::LastOnly => {}
    }

    let layout = Layout::parse(text);
    let mut working = text.to_string();
    let mut outcomes = Vec::new();

    for disk in &layout.disks {
        let last = layout.last_partition(&disk.device).ok_or_else(|| {
            RelayoutError::BadLayout(format!(
                "no partition records for disk {}",
                disk.device
            ))
        })?;

        let new_size = new_disk_size(&disk.device)?;
        let eligibility =
            eligible::classify(last, &layout, &opts.include, &opts.exclude);

        let action = decide::decide(
            disk.size_bytes,
            new_size,
            last,
            &eligibility,
            opts.grow_threshold_pct,
            opts.shrink_limit_pct,
        )
        .map_err(|err| {
            println!(
                "{}",
                format!(
                    "{}: aborting run at last partition {}",
                    disk.device, last.device
                )
                .red()
            );

            err
        })?;

        log_action(disk, last, &action, opts);

        let outcome = match action {
            SizeAction::Skip(reason) => Outcome::Skipped {
                disk: disk.device.clone(),
                partition: last.device.clone(),
                reason: skip_summary(&reason),
            },
            SizeAction::Grow { new_size } => {
                working = rewrite::apply(&working, last, new_size)?;

                Outcome::Grown {
                    disk: disk.device.clone(),
                    partition: last.device.clone(),
                    old_size: last.size_bytes,
                    new_size,
                }
            }
            SizeAction::Shrink { new_size } => {
                working = rewrite::apply(&working, last, new_size)?;

                Outcome::Shrunk {
                    disk: disk.device.clone(),
                    partition: last.device.clone(),
                    old_size: last.size_bytes,
                    new_size,
                }
            }
        };

        outcomes.push(outcome);
    }

    Ok((working, outcomes))
}

/// One human-readable line per disk decision
fn log_action(
    disk: &Disk,
    last: &Partition,
    action: &SizeAction,
    opts: &ResizeOpts,
) {
    match action {
        SizeAction::Skip(SkipReason::SameSize) => {
            println!(
                "{}: disk size unchanged ({} bytes), nothing to do",
                disk.device, disk.size_bytes,
            );
        }

        // Advisory states both the threshold outcome and the
        // eligibility outcome, whichever the operator cares about
        SizeAction::Skip(SkipReason::BelowGrowThreshold {
            delta,
            threshold,
            resizeable,
        }) => {
            let eligibility_note = match resizeable {
                true => "partition is resizeable",
                false => "partition is also excluded from resizing",
            };

            println!(
                "{}",
                format!(
                    "{}: not growing last partition {}: disk grew by \
                     {delta} bytes, below the {}% threshold of \
                     {threshold} bytes ({eligibility_note})",
                    disk.device, last.device, opts.grow_threshold_pct,
                )
                .yellow()
            );
        }

        SizeAction::Skip(SkipReason::GrowDenied { reasons }) => {
            println!(
                "{}",
                format!(
                    "{}: not growing last partition {}: {}",
                    disk.device,
                    last.device,
                    reasons.join("; "),
                )
                .yellow()
            );
        }

        SizeAction::Grow { new_size } => {
            println!(
                "{}",
                format!(
                    "{}: growing last partition {} from {} to {} bytes",
                    disk.device, last.device, last.size_bytes, new_size,
                )
                .green()
            );
        }

        SizeAction::Shrink { new_size } => {
            println!(
                "{}",
                format!(
                    "{}: shrinking last partition {} from {} to {} bytes",
                    disk.device, last.device, last.size_bytes, new_size,
                )
                .yellow()
            );
        }
    }
}

fn skip_summary(reason: &SkipReason) -> String {
    match reason {
        SkipReason::SameSize => "disk size unchanged".to_string(),

        SkipReason::BelowGrowThreshold {
            delta, threshold, ..
        } => {
            format!("growth {delta} bytes below threshold {threshold} bytes")
        }

        SkipReason::GrowDenied { reasons } => {
            format!("excluded from resizing: {}", reasons.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const TWO_DISKS: &str = "\
disk /dev/sda 10000000000 gpt
part /dev/sda 536870912 2097152 EFI_System boot,esp /dev/sda1
part /dev/sda 1000000000 9000000000 root none /dev/sda2
disk /dev/sdb 10000000000 gpt
part /dev/sdb 9000000000 1048576 data none /dev/sdb1
fs /dev/sda2 / ext4 uuid=0b95fe47
fs /dev/sdb1 /srv xfs uuid=12ab34cd
";

    fn sizes(
        entries: &[(&str, u64)],
    ) -> impl FnMut(&str) -> Result<u64, RelayoutError> {
        let map: HashMap<String, u64> = entries
            .iter()
            .map(|(dev, size)| (dev.to_string(), *size))
            .collect();

        move |device: &str| {
            map.get(device)
                .copied()
                .ok_or_else(|| RelayoutError::NoSuchDevice(device.to_string()))
        }
    }

    #[test]
    fn test_resize_grow_and_skip() {
        let opts = ResizeOpts::default();
        let lookup = sizes(&[
            ("/dev/sda", 15_000_000_000),
            ("/dev/sdb", 10_000_000_000),
        ]);

        let (updated, outcomes) =
            resize_last_partitions(TWO_DISKS, &opts, lookup)
                .expect("resize failed");

        let expected_grown =
            decide::aligned_disk_end(15_000_000_000) - 9_000_000_000;

        assert_eq!(
            vec![
                Outcome::Grown {
                    disk: "/dev/sda".to_string(),
                    partition: "/dev/sda2".to_string(),
                    old_size: 1_000_000_000,
                    new_size: expected_grown,
                },
                Outcome::Skipped {
                    disk: "/dev/sdb".to_string(),
                    partition: "/dev/sdb1".to_string(),
                    reason: "disk size unchanged".to_string(),
                },
            ],
            outcomes,
        );

        // One size field changed, everything else byte-identical
        assert_eq!(
            TWO_DISKS
                .replace(" 1000000000 ", &format!(" {expected_grown} ")),
            updated,
        );
    }

    #[test]
    fn test_resize_noop_is_byte_identical() {
        let opts = ResizeOpts::default();
        let lookup = sizes(&[
            ("/dev/sda", 10_000_000_000),
            ("/dev/sdb", 10_000_000_000),
        ]);

        let (updated, outcomes) =
            resize_last_partitions(TWO_DISKS, &opts, lookup)
                .expect("resize failed");

        assert_eq!(TWO_DISKS, updated);
        assert_eq!(2, outcomes.len());
    }

    #[test]
    fn test_resize_denied_last_partition() {
        // The last partition is the ESP itself: big growth is skipped
        let text = "\
disk /dev/sda 10000000000 gpt
part /dev/sda 536870912 9000000000 EFI_System boot,esp /dev/sda1
";

        let opts = ResizeOpts::default();
        let lookup = sizes(&[("/dev/sda", 15_000_000_000)]);

        let (updated, outcomes) =
            resize_last_partitions(text, &opts, lookup).expect("resize failed");

        assert_eq!(text, updated);
        assert!(matches!(&outcomes[0], Outcome::Skipped { .. }));
    }

    #[test]
    fn test_resize_force_include_last_partition() {
        let text = "\
disk /dev/sda 10000000000 gpt
part /dev/sda 536870912 9000000000 EFI_System boot,esp /dev/sda1
";

        let opts = ResizeOpts {
            include: HashSet::from(["/dev/sda1".to_string()]),
            ..Default::default()
        };
        let lookup = sizes(&[("/dev/sda", 15_000_000_000)]);

        let (updated, outcomes) =
            resize_last_partitions(text, &opts, lookup).expect("resize failed");

        assert_ne!(text, updated);
        assert!(matches!(&outcomes[0], Outcome::Grown { .. }));
    }

    #[test]
    fn test_resize_no_partitions_is_fatal() {
        let text = "disk /dev/sda 10000000000 gpt\n";

        let opts = ResizeOpts::default();
        let lookup = sizes(&[("/dev/sda", 10_000_000_000)]);

        let result = resize_last_partitions(text, &opts, lookup);

        assert!(
            matches!(result, Err(RelayoutError::BadLayout(_))),
            "expected bad-layout error, got {result:?}",
        );
    }

    #[test]
    fn test_resize_fatal_shrink_aborts_run() {
        // /dev/sdb lost 5% with a 2% limit: whole run fails,
        // /dev/sda's grow never gets published
        let opts = ResizeOpts::default();
        let lookup = sizes(&[
            ("/dev/sda", 15_000_000_000),
            ("/dev/sdb", 9_500_000_000),
        ]);

        let result = resize_last_partitions(TWO_DISKS, &opts, lookup);

        assert!(
            matches!(result, Err(RelayoutError::PolicyViolation(_))),
            "expected policy violation, got {result:?}",
        );
    }

    #[test]
    fn test_resize_mode_disabled() {
        let opts = ResizeOpts {
            mode: ResizeMode::Disabled,
            ..Default::default()
        };
        let lookup = sizes(&[]);

        let (updated, outcomes) =
            resize_last_partitions(TWO_DISKS, &opts, lookup)
                .expect("disabled mode failed");

        assert_eq!(TWO_DISKS, updated);
        assert!(outcomes.is_empty());
    }

    #[test]
    fn test_resize_mode_all_not_implemented() {
        let opts = ResizeOpts {
            mode: ResizeMode::All,
            ..Default::default()
        };
        let lookup = sizes(&[]);

        let result = resize_last_partitions(TWO_DISKS, &opts, lookup);

        assert!(
            matches!(result, Err(RelayoutError::NotImplemented(_))),
            "expected not-implemented error, got {result:?}",
        );
    }
}
