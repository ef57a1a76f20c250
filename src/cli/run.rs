//! Command dispatch for the transcat CLI.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use log::debug;

use super::args::{Arguments, Command, ExtractArgs};
use crate::catalogue::contextualiser::MessageContextualiser;
use crate::catalogue::message_catalogue::{MessageCatalogue, MessageStore};
use crate::catalogue::pot::PotDumper;
use crate::config::{CONFIG_FILE_NAME, ConfigLoadResult, default_config_json, load_config};
use crate::extract::source::SourceExtractor;
use crate::extract::template::TemplateExtractor;
use crate::extract::{ExtractionReport, Extractor, FileOutcome, FileSelector};

pub enum CommandSummary {
    Extract(ExtractSummary),
    Init(InitSummary),
}

#[derive(Debug, Default)]
pub struct ExtractSummary {
    pub files_extracted: usize,
    /// Files that could not be extracted, with the reason.
    pub failures: Vec<(PathBuf, String)>,
    /// Written POT files with the number of entries in each.
    pub written: Vec<(PathBuf, usize)>,
}

#[derive(Debug)]
pub struct InitSummary {
    pub path: PathBuf,
}

pub fn run(Arguments { command }: Arguments) -> Result<CommandSummary> {
    match command {
        Some(Command::Extract(args)) => extract(args).map(CommandSummary::Extract),
        Some(Command::Init) => init(&env::current_dir()?).map(CommandSummary::Init),
        None => {
            bail!("No command provided. Use --help to see available commands.")
        }
    }
}

/// Extract a single explicit file or a whole directory. A single file's
/// extraction error is returned, directory members are recorded.
fn extract_resource(extractor: &dyn Extractor, resource: &Path) -> Result<ExtractionReport> {
    if resource.is_file() {
        let mut report = ExtractionReport::default();
        if extractor.selector().accepts(resource) {
            let catalogues = extractor.extract_file(resource)?;
            report.record(resource.to_path_buf(), Ok(catalogues));
        }
        return Ok(report);
    }
    Ok(extractor.extract_batch(resource)?)
}

fn extract(args: ExtractArgs) -> Result<ExtractSummary> {
    let cwd = env::current_dir()?;
    let ConfigLoadResult {
        config,
        from_file,
        base_dir,
    } = load_config(&cwd)?;
    if from_file {
        debug!("Using config from {}", base_dir.join(CONFIG_FILE_NAME).display());
    }

    if !args.resource.exists() {
        bail!("{} does not exist", args.resource.display());
    }

    let domain = args.domain.unwrap_or(config.default_domain);
    let locale = args.locale.unwrap_or(config.locale);
    let output_dir = args
        .output
        .unwrap_or_else(|| base_dir.join(&config.output_dir));

    let templates = TemplateExtractor::default()
        .with_selector(
            FileSelector::new([config.template_extension]).with_ignores(&base_dir, &config.ignores),
        )
        .with_default_domain(domain.as_str());
    let sources = SourceExtractor::new(
        FileSelector::new(config.source_extensions).with_ignores(&base_dir, &config.ignores),
    )
    .with_default_domain(domain.as_str());

    let mut report = extract_resource(&templates, &args.resource)?;
    report.merge(extract_resource(&sources, &args.resource)?);

    let mut catalogue = MessageCatalogue::new(locale);
    catalogue.import(&report.catalogues, &MessageContextualiser::new());

    let written = PotDumper::default()
        .dump(&catalogue, &output_dir)
        .with_context(|| format!("Failed to write POT files to {}", output_dir.display()))?;

    let mut summary = ExtractSummary::default();
    for outcome in &report.outcomes {
        match outcome {
            FileOutcome::Extracted { .. } => summary.files_extracted += 1,
            FileOutcome::Failed { path, error } => {
                summary.failures.push((path.clone(), error.chain()))
            }
        }
    }
    summary.written = written
        .into_iter()
        .map(|path| {
            let domain = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let count = catalogue.all(&domain).len();
            (path, count)
        })
        .collect();
    Ok(summary)
}

fn init(dir: &Path) -> Result<InitSummary> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        bail!("{} already exists", CONFIG_FILE_NAME);
    }

    fs::write(&config_path, default_config_json()?)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(InitSummary { path: config_path })
}
