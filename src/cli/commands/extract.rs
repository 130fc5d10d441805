use anyhow::Result;

use super::super::args::ExtractCommand;
use super::{CommandResult, CommandSummary, ExtractSummary, helper::finish};
use crate::{
    config::{load_config, resolve_path},
    core::extract_dir,
};

pub fn extract(cmd: ExtractCommand) -> Result<CommandResult> {
    let ExtractCommand {
        common,
        source_dir,
        templates_dir,
        source_locale_file,
    } = cmd;

    let mut config = load_config(&common.root)?.config;
    if let Some(dir) = source_dir {
        config.source_dir = dir;
    }
    if let Some(dir) = templates_dir {
        config.templates_dir = dir;
    }
    if let Some(file) = source_locale_file {
        config.source_locale_file = file;
    }

    let report = extract_dir(&config, &common.root, common.verbose)?;

    let summary = CommandSummary::Extract(ExtractSummary {
        files_extracted: report.files_extracted,
        dictionary_entries: report.dictionary_entries,
        files_written: report.files_written(),
        templates_dir: resolve_path(&common.root, &config.templates_dir),
        source_locale_file: resolve_path(&common.root, &config.source_locale_file),
    });

    Ok(finish(summary, report.issues))
}
