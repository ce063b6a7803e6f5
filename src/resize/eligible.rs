use std::collections::HashSet;

use crate::constants::{
    EXCLUDE_BOOT,
    EXCLUDE_EFI,
    EXCLUDE_SWAP,
};
use crate::layout::{
    Layout,
    Partition,
};

/// Resize permission for one last partition.
///
/// Force-included devices always win. Otherwise all exclusion rules
/// run to completion so a denial carries every matching reason,
/// not just the first one.
#[derive(Debug, Clone, PartialEq)]
pub enum Eligibility {
    /// Listed in the force-include set, resize even if otherwise excluded
    ForceInclude,

    /// No exclusion rule matched
    Allow,

    /// At least one exclusion rule matched
    Deny(Vec<String>),
}

impl Eligibility {
    pub fn resizeable(&self) -> bool {
        !matches!(self, Self::Deny(_))
    }

    pub fn deny_reasons(&self) -> &[String] {
        match self {
            Self::Deny(reasons) => reasons,
            _ => &[],
        }
    }
}

pub fn classify(
    part: &Partition,
    layout: &Layout,
    include: &HashSet<String>,
    exclude: &HashSet<String>,
) -> Eligibility {
    if include.contains(&part.device) {
        return Eligibility::ForceInclude;
    }

    let mountpoint = layout
        .filesystem(&part.device)
        .map(|fs| fs.mountpoint.as_str())
        .unwrap_or_default();

    let mut reasons = Vec::new();

    if exclude.contains(&part.device) {
        reasons.push(format!("device {} is excluded", part.device));
    }

    let content = [part.part_type.as_str(), part.flags.as_str(), mountpoint];

    if exclude.contains(EXCLUDE_BOOT)
        && matches_any(&content, &["boot", "bios", "grub"])
    {
        reasons.push("looks like a boot partition".to_string());
    }

    if exclude.contains(EXCLUDE_SWAP) {
        if layout.has_swap(&part.device) {
            reasons.push(format!("active swap registered on {}", part.device));
        }

        if matches_any(&content[..2], &["swap"]) {
            reasons.push("looks like a swap partition".to_string());
        }
    }

    if exclude.contains(EXCLUDE_EFI)
        && matches_any(&content, &["efi", "esp"])
    {
        reasons.push("looks like an EFI system partition".to_string());
    }

    if reasons.is_empty() {
        return Eligibility::Allow;
    }

    Eligibility::Deny(reasons)
}

/// Case-insensitive substring match of any needle in any haystack
fn matches_any(haystacks: &[&str], needles: &[&str]) -> bool {
    haystacks.iter().any(|haystack| {
        let haystack = haystack.to_lowercase();

        needles.iter().any(|needle| haystack.contains(needle))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::defaults;

    fn dummy_part(part_type: &str, flags: &str, device: &str) -> Partition {
        Partition {
            disk_device: "/dev/sda".to_string(),
            size_bytes: 1048576,
            start_bytes: 1048576,
            part_type: part_type.to_string(),
            flags: flags.to_string(),
            device: device.to_string(),
            line: String::new(),
        }
    }

    #[test]
    fn test_classify_heuristics() {
        struct Test<'a> {
            part: Partition,
            fs_line: &'a str,
            swap_line: &'a str,
            expected_reasons: usize,
        }

        let tests = vec![
            // Plain data partition
            Test {
                part: dummy_part("root", "none", "/dev/sda2"),
                fs_line: "fs /dev/sda2 /home ext4\n",
                swap_line: "",
                expected_reasons: 0,
            },
            // GRUB flag, case-insensitive
            Test {
                part: dummy_part("primary", "GRUB_BIOS", "/dev/sda2"),
                fs_line: "",
                swap_line: "",
                expected_reasons: 1,
            },
            // Mounted on /boot/efi: boot heuristic and EFI heuristic
            // match independently
            Test {
                part: dummy_part("EFI_System", "none", "/dev/sda2"),
                fs_line: "fs /dev/sda2 /boot/efi vfat\n",
                swap_line: "",
                expected_reasons: 2,
            },
            // Registered swap and swap-looking type
            Test {
                part: dummy_part("linux-swap", "none", "/dev/sda2"),
                fs_line: "",
                swap_line: "swap /dev/sda2 uuid=deadbeef\n",
                expected_reasons: 2,
            },
            // esp flag only
            Test {
                part: dummy_part("primary", "boot,esp", "/dev/sda2"),
                fs_line: "",
                swap_line: "",
                expected_reasons: 2,
            },
        ];

        for test in tests {
            let text = format!("{}{}", test.fs_line, test.swap_line);
            let layout = Layout::parse(&text);

            let result = classify(
                &test.part,
                &layout,
                &HashSet::new(),
                &defaults::exclude_spec(),
            );

            assert_eq!(
                test.expected_reasons,
                result.deny_reasons().len(),
                "unexpected reasons for {:?}: {:?}",
                test.part,
                result,
            );
            assert_eq!(test.expected_reasons == 0, result.resizeable());
        }
    }

    #[test]
    fn test_classify_literal_exclude() {
        let part = dummy_part("root", "none", "/dev/sda2");
        let layout = Layout::parse("");

        let exclude = HashSet::from(["/dev/sda2".to_string()]);
        let result = classify(&part, &layout, &HashSet::new(), &exclude);

        assert!(!result.resizeable());
        assert_eq!(1, result.deny_reasons().len());
    }

    #[test]
    fn test_classify_force_include_wins() {
        // Force-include overrides every exclusion rule,
        // even a literal exclude of the same device
        let part = dummy_part("linux-swap", "boot,esp", "/dev/sda2");
        let layout = Layout::parse("swap /dev/sda2 uuid=deadbeef\n");

        let include = HashSet::from(["/dev/sda2".to_string()]);
        let mut exclude = defaults::exclude_spec();
        exclude.insert("/dev/sda2".to_string());

        let result = classify(&part, &layout, &include, &exclude);

        assert_eq!(Eligibility::ForceInclude, result);
        assert!(result.resizeable());
    }

    #[test]
    fn test_classify_empty_exclude_spec() {
        // Without sentinels in the exclude spec,
        // content heuristics never run
        let part = dummy_part("linux-swap", "boot,esp", "/dev/sda2");
        let layout = Layout::parse("swap /dev/sda2 uuid=deadbeef\n");

        let result =
            classify(&part, &layout, &HashSet::new(), &HashSet::new());

        assert_eq!(Eligibility::Allow, result);
    }
}
