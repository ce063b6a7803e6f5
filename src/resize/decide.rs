use crate::constants::MIB;
use crate::errors::RelayoutError;
use crate::layout::Partition;

use super::eligible::Eligibility;

/// Outcome of the size decision for one disk's last partition.
///
/// Fatal outcomes are `RelayoutError`s instead: a shrink beyond the
/// limit, a shrink of a non-resizeable partition, and a shrink below
/// the minimum viable size are policy violations that abort the whole
/// run, while a grown size below the current size is a logic bug.
#[derive(Debug, Clone, PartialEq)]
pub enum SizeAction {
    Skip(SkipReason),
    Grow { new_size: u64 },
    Shrink { new_size: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Old and new disk sizes are identical
    SameSize,

    /// Disk grew by less than the configured threshold.
    /// Carries the eligibility outcome too, so the advisory can state
    /// both facts instead of guessing which one the operator cares about.
    BelowGrowThreshold {
        delta: u64,
        threshold: u64,
        resizeable: bool,
    },

    /// Disk grew enough, but the partition is excluded from resizing
    GrowDenied { reasons: Vec<String> },
}

/// Decides whether and how the last partition of a disk changes size
/// when the disk itself changed from `old_size` to `new_size` bytes.
///
/// Growing is conservative: below the threshold the partition is left
/// alone. Shrinking is strict: a disk `shrink_limit_pct` percent
/// smaller or worse aborts the run, as does any shrink of a partition
/// that is not resizeable.
pub fn decide(
    old_size: u64,
    new_size: u64,
    last_part: &Partition,
    eligibility: &Eligibility,
    grow_threshold_pct: u64,
    shrink_limit_pct: u64,
) -> Result<SizeAction, RelayoutError> {
    if new_size == old_size {
        return Ok(SizeAction::Skip(SkipReason::SameSize));
    }

    // The partition end stays on a MiB boundary,
    // matching the alignment of the captured layout
    let disk_end = aligned_disk_end(new_size);

    if new_size > old_size {
        let delta = new_size - old_size;
        let threshold = old_size / 100 * grow_threshold_pct;

        if delta < threshold {
            return Ok(SizeAction::Skip(SkipReason::BelowGrowThreshold {
                delta,
                threshold,
                resizeable: eligibility.resizeable(),
            }));
        }

        if !eligibility.resizeable() {
            return Ok(SizeAction::Skip(SkipReason::GrowDenied {
                reasons: eligibility.deny_reasons().to_vec(),
            }));
        }

        let grown = disk_end.checked_sub(last_part.start_bytes).ok_or_else(
            || {
                RelayoutError::RelayoutBug(format!(
                    "last partition {} starts at {} beyond grown disk end {}",
                    last_part.device, last_part.start_bytes, disk_end,
                ))
            },
        )?;

        if grown < last_part.size_bytes {
            return Err(RelayoutError::RelayoutBug(format!(
                "grown size {} of last partition {} below current size {}",
                grown, last_part.device, last_part.size_bytes,
            )));
        }

        return Ok(SizeAction::Grow { new_size: grown });
    }

    let loss = old_size - new_size;
    let limit = old_size / 100 * shrink_limit_pct;

    // Loss strictly under the limit is tolerated; at the limit or
    // beyond, migrating needs manual layout editing
    if loss >= limit {
        return Err(RelayoutError::PolicyViolation(format!(
            "new disk more than {}% smaller: lost {} of {} bytes (limit {}), \
             the layout must be edited manually",
            shrink_limit_pct, loss, old_size, limit,
        )));
    }

    if !eligibility.resizeable() {
        return Err(RelayoutError::PolicyViolation(format!(
            "cannot shrink non-resizeable last partition {}: {}",
            last_part.device,
            eligibility.deny_reasons().join("; "),
        )));
    }

    let shrunk = disk_end.saturating_sub(last_part.start_bytes);
    if shrunk <= MIB {
        return Err(RelayoutError::PolicyViolation(format!(
            "new size {} of last partition {} below the {} byte minimum",
            shrunk, last_part.device, MIB,
        )));
    }

    Ok(SizeAction::Shrink { new_size: shrunk })
}

/// Largest multiple of 1 MiB not exceeding the new disk size
pub fn aligned_disk_end(new_size: u64) -> u64 {
    new_size / MIB * MIB
}
