use std::time::{
    Duration,
    Instant,
};

use serde_json::json;

use crate::cli;
use crate::errors::RelayoutError;
use crate::resize::{
    self,
    Outcome,
};
use crate::utils;

#[derive(Debug)]
pub struct Report {
    pub outcomes: Vec<Outcome>,
    pub backup: Option<String>,
    pub duration: Duration,
}

impl Report {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "outcomes": self.outcomes,
            "backup": self.backup,
            "elapsedTime": self.duration,
        })
    }

    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}

/// Evaluates all disks, then publishes the updated layout in one
/// atomic replace. Nothing is written before every disk has been
/// decided without a fatal error, and the original is backed up
/// before it gets replaced.
pub(super) fn run(
    cli_args: &cli::Cli,
    args_apply: &cli::ArgsApply,
) -> Result<Report, RelayoutError> {
    let start = Instant::now();

    let layout_text = std::fs::read_to_string(&cli_args.layout_file)
        .map_err(|err| {
            RelayoutError::NoSuchFile(err, cli_args.layout_file.clone())
        })?;

    let opts = super::resize_opts(cli_args);
    let (updated, outcomes) = resize::resize_last_partitions(
        &layout_text,
        &opts,
        super::new_disk_size(cli_args),
    )?;

    let mut backup = None;

    if updated != layout_text {
        if !args_apply.no_backup {
            backup = Some(utils::fs::backup_file(&cli_args.layout_file)?);
        }

        utils::fs::publish_file(&cli_args.layout_file, &updated)?;
    }

    Ok(Report {
        outcomes,
        backup,
        duration: start.elapsed(),
    })
}
