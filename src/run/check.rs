use colored::Colorize;

use crate::cli;
use crate::errors::RelayoutError;
use crate::resize::{
    self,
    Outcome,
};

pub(super) fn run(cli_args: &cli::Cli) -> Result<(), RelayoutError> {
    let layout_text = std::fs::read_to_string(&cli_args.layout_file)
        .map_err(|err| {
            RelayoutError::NoSuchFile(err, cli_args.layout_file.clone())
        })?;

    let opts = super::resize_opts(cli_args);
    let (_, outcomes) = resize::resize_last_partitions(
        &layout_text,
        &opts,
        super::new_disk_size(cli_args),
    )?;

    let changes = outcomes
        .iter()
        .filter(|outcome| !matches!(outcome, Outcome::Skipped { .. }))
        .count();

    println!(
        "{}",
        format!(
            "OK: {} disk(s) evaluated, {changes} change(s) pending, \
             nothing written",
            outcomes.len(),
        )
        .green()
    );

    Ok(())
}
