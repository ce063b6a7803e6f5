use clap::{
    Args,
    Parser,
    Subcommand,
};

use crate::constants::defaults;
use crate::errors::RelayoutError;
use crate::resize::ResizeMode;

#[derive(Debug, Parser)]
#[clap(
    version,
    about = "Auto-resize of the last disk partition in captured recovery layout files"
)]
pub struct Cli {
    #[command(subcommand)]
    pub commands: Option<Commands>,

    /// Layout description file
    #[arg(
        global = true,
        short = 'f',
        long = "file",
        value_parser = validate_filename,
        default_value_t = String::from(defaults::LAYOUT_FILE)
    )]
    pub layout_file: String,

    /// Resize mode; `all` is handled by a separate component
    #[arg(
        global = true,
        long = "mode",
        value_enum,
        default_value_t = ResizeMode::LastOnly
    )]
    pub mode: ResizeMode,

    /// Partition device always eligible for resize,
    /// even if an exclusion rule matches it (repeatable)
    #[arg(global = true, short = 'i', long = "include")]
    pub include: Vec<String>,

    /// Partition device or sentinel (boot, swap, efi) never resized
    /// (repeatable; defaults to boot, swap, efi when not given)
    #[arg(global = true, short = 'x', long = "exclude")]
    pub exclude: Vec<String>,

    /// Minimum disk growth in percent before the last partition
    /// is actually enlarged
    #[arg(
        global = true,
        long = "grow-threshold",
        value_parser = validate_pct,
        default_value_t = defaults::GROW_THRESHOLD_PCT
    )]
    pub grow_threshold_pct: u64,

    /// Maximum disk shrinkage in percent tolerated before the run
    /// aborts instead of shrinking the last partition
    #[arg(
        global = true,
        long = "shrink-limit",
        value_parser = validate_pct,
        default_value_t = defaults::SHRINK_LIMIT_PCT
    )]
    pub shrink_limit_pct: u64,

    /// Override the detected size of a replacement disk,
    /// e.g. `/dev/sda=12G` (repeatable). Lets `check` run on layouts
    /// whose disks are not present on this machine
    #[arg(global = true, long = "disk-size", value_parser = parse_disk_size)]
    pub disk_sizes: Vec<(String, u64)>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Evaluate all resize decisions without writing anything
    Check,

    /// Rewrite the layout file with resized last partitions
    Apply(ArgsApply),
}

#[derive(Debug, Args)]
pub struct ArgsApply {
    /// Do not keep a .bak copy of the original layout file
    #[arg(long = "no-backup")]
    pub no_backup: bool,
}

fn validate_filename(name: &str) -> Result<String, RelayoutError> {
    if name.is_empty() {
        return Err(RelayoutError::BadArgs(String::from("empty filename")));
    }

    Ok(name.to_string())
}

fn validate_pct(pct: &str) -> Result<u64, RelayoutError> {
    let pct: u64 = pct.parse().map_err(|_| {
        RelayoutError::BadArgs(format!("bad percentage {pct}"))
    })?;

    if pct > 100 {
        return Err(RelayoutError::BadArgs(format!(
            "percentage {pct} over 100"
        )));
    }

    Ok(pct)
}

fn parse_disk_size(arg: &str) -> Result<(String, u64), RelayoutError> {
    let (device, size) = arg.split_once('=').ok_or_else(|| {
        RelayoutError::BadArgs(format!(
            "bad disk size override {arg}: expected <device>=<size>"
        ))
    })?;

    if device.is_empty() {
        return Err(RelayoutError::BadArgs(format!(
            "bad disk size override {arg}: empty device"
        )));
    }

    Ok((device.to_string(), parse_human_bytes(size)?))
}

fn parse_human_bytes(s: &str) -> Result<u64, RelayoutError> {
    // Plain byte counts first: humanize-rs insists on a unit
    if let Ok(bytes) = s.parse::<u64>() {
        return Ok(bytes);
    }

    let bytes = (s.to_lowercase())
        .parse::<humanize_rs::bytes::Bytes>()
        .map_err(|err| {
            RelayoutError::BadArgs(format!("bad byte size {s}: {err}"))
        })?;

    Ok(bytes.size() as u64)
}
