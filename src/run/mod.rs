pub mod apply;
pub mod check;

use std::collections::HashMap;

use colored::Colorize;

use crate::cli;
use crate::constants::defaults;
use crate::errors::RelayoutError;
use crate::linux;
use crate::resize::ResizeOpts;

pub fn run(cli_args: cli::Cli) -> Result<(), RelayoutError> {
    match cli_args.commands {
        // Default is to check
        None | Some(cli::Commands::Check) => check::run(&cli_args),

        Some(cli::Commands::Apply(ref args_apply)) => {
            if !linux::user::is_root() {
                println!("{}", "WARN: running as non-root user".yellow());
            }

            let report = apply::run(&cli_args, args_apply)?;
            println!("{}", report.to_json_string());

            Ok(())
        }
    }
}

fn resize_opts(cli_args: &cli::Cli) -> ResizeOpts {
    let exclude = match cli_args.exclude.is_empty() {
        true => defaults::exclude_spec(),
        false => cli_args.exclude.iter().cloned().collect(),
    };

    ResizeOpts {
        mode: cli_args.mode,
        include: cli_args.include.iter().cloned().collect(),
        exclude,
        grow_threshold_pct: cli_args.grow_threshold_pct,
        shrink_limit_pct: cli_args.shrink_limit_pct,
    }
}

/// Byte size of the replacement disk for a captured disk device:
/// a CLI override when given, otherwise the resolved block device's
/// size on the running system.
fn new_disk_size(
    cli_args: &cli::Cli,
) -> impl FnMut(&str) -> Result<u64, RelayoutError> {
    let overrides: HashMap<String, u64> =
        cli_args.disk_sizes.iter().cloned().collect();

    move |device: &str| {
        if let Some(size) = overrides.get(device) {
            return Ok(*size);
        }

        let resolved = linux::blkdev::resolve_block_device(device)?;

        linux::blkdev::disk_size_bytes(&resolved)
    }
}
