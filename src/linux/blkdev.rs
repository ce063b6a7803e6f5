use std::fs;
use std::path::{
    Path,
    PathBuf,
};

use crate::errors::RelayoutError;

// Kernel block layer reports sizes in 512-byte sectors,
// regardless of the device's logical block size
const SECTOR_SIZE: u64 = 512;

/// Resolves a captured disk path (often a /dev/disk/by-* symlink)
/// to the block device it points to on the running system.
pub fn resolve_block_device(device: &str) -> Result<PathBuf, RelayoutError> {
    fs::canonicalize(device)
        .map_err(|_| RelayoutError::NoSuchDevice(device.to_string()))
}

/// Raw byte size of a block device, from the sysfs sector count
pub fn disk_size_bytes(device: &Path) -> Result<u64, RelayoutError> {
    let name = device
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            RelayoutError::NoSuchDevice(device.display().to_string())
        })?;

    let sysfs_size = format!("/sys/class/block/{name}/size");
    let sectors = fs::read_to_string(&sysfs_size)
        .map_err(|err| RelayoutError::NoSuchFile(err, sysfs_size.clone()))?;

    let sectors: u64 = sectors.trim().parse().map_err(|_| {
        RelayoutError::NoSuchDevice(format!(
            "bad sector count in {sysfs_size}: {}",
            sectors.trim(),
        ))
    })?;

    Ok(sectors * SECTOR_SIZE)
}
