use anyhow::Result;

use super::super::args::PopulateCommand;
use super::{CommandResult, CommandSummary, PopulateSummary, helper::finish};
use crate::{
    config::{load_config, resolve_path},
    core::{load_locales, populate_dir},
};

pub fn populate(cmd: PopulateCommand) -> Result<CommandResult> {
    let PopulateCommand {
        common,
        locales,
        locales_dir,
        templates_dir,
        output_dir,
    } = cmd;

    let mut config = load_config(&common.root)?.config;
    if locales_dir.is_some() {
        config.locales_dir = locales_dir;
    }
    if let Some(dir) = templates_dir {
        config.templates_dir = dir;
    }
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }

    let locale_set = load_locales(&config, &common.root, &locales, common.verbose)?;
    if common.verbose {
        eprintln!("Populating locales: {}", locale_set.ids().join(", "));
    }

    let output_dir = resolve_path(&common.root, &config.output_dir);
    let report = populate_dir(
        &resolve_path(&common.root, &config.templates_dir),
        &locale_set.locales,
        &output_dir,
        common.verbose,
    )?;

    let summary = CommandSummary::Populate(PopulateSummary {
        templates_found: report.templates_found,
        files_written: report.files_written(),
        locales: report.locales,
        output_dir,
    });

    let mut issues = locale_set.issues;
    issues.extend(report.issues);

    Ok(finish(summary, issues))
}
