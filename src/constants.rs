pub mod defaults {
    /// Captured layout description, one record per line
    pub const LAYOUT_FILE: &str = "./disklayout.conf";

    /// Minimum percentage growth of the whole disk before
    /// the last partition is actually enlarged
    pub const GROW_THRESHOLD_PCT: u64 = 10;

    /// Maximum tolerated percentage loss of the whole disk
    /// before the run aborts instead of shrinking
    pub const SHRINK_LIMIT_PCT: u64 = 2;

    pub fn exclude_spec() -> std::collections::HashSet<String> {
        std::collections::HashSet::from([
            super::EXCLUDE_BOOT.to_string(),
            super::EXCLUDE_SWAP.to_string(),
            super::EXCLUDE_EFI.to_string(),
        ])
    }
}

// Sentinel tokens accepted in the exclude spec
// alongside literal partition device paths
pub const EXCLUDE_BOOT: &str = "boot";
pub const EXCLUDE_SWAP: &str = "swap";
pub const EXCLUDE_EFI: &str = "efi";

/// Partition end alignment unit
pub const MIB: u64 = 1024 * 1024;

pub const BACKUP_SUFFIX: &str = ".bak";
pub const TMP_SUFFIX: &str = ".tmp";
