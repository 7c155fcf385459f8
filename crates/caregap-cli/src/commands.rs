use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, info_span};

use caregap_engine::{
    MergeSummary, SortOptions, SortStrategy, SortSummary, merge_sheets, sort_pdfs,
};
use caregap_ingest::{DiskPdf, PdfSource, UploadedFile, read_table};
use caregap_model::{ConfigSource, FieldMappingConfig, GapsTaxonomy};
use caregap_store::ConfigStore;

use crate::cli::{ConfigCommand, MergeArgs, SortArgs, StrategyArg, TaxonomyCommand};
use crate::summary::{print_config_list, print_taxonomy};

pub fn run_merge(args: &MergeArgs, store_dir: &Path) -> Result<MergeSummary> {
    let span = info_span!("merge", master = %args.master.display());
    let _guard = span.enter();

    let store = ConfigStore::open(store_dir).context("open configuration store")?;
    let master = UploadedFile::from_path(&args.master)
        .with_context(|| format!("read master file {}", args.master.display()))?;

    let mut sources = Vec::with_capacity(args.sources.len());
    for spec in &args.sources {
        let (path, config_id) = parse_source_spec(spec)?;
        let file = UploadedFile::from_path(&path)
            .with_context(|| format!("read source file {}", path.display()))?;
        sources.push((file, config_id));
    }

    let outcome = merge_sheets(&master, &sources, &store)?;
    fs::write(&args.out, &outcome.workbook)
        .with_context(|| format!("write merged workbook to {}", args.out.display()))?;
    Ok(outcome.summary)
}

pub fn run_sort(args: &SortArgs, store_dir: &Path) -> Result<SortSummary> {
    let span = info_span!("sort", master = %args.master.display());
    let _guard = span.enter();
    // The store is not consulted here, but an unopenable store directory
    // should fail the same way it does for merge.
    let _ = ConfigStore::open(store_dir).context("open configuration store")?;

    let master = UploadedFile::from_path(&args.master)
        .with_context(|| format!("read master file {}", args.master.display()))?;
    let pdfs = collect_pdfs(&args.pdfs)?;
    debug!(count = pdfs.len(), "pdf batch collected");

    let options = SortOptions {
        strategy: match args.strategy {
            StrategyArg::Name => SortStrategy::ByName,
            StrategyArg::MemberId => SortStrategy::ByMemberId,
        },
        max_files: args.max_files,
        batch_size: args.batch_size,
    };
    let outcome = sort_pdfs(&master, &pdfs, &options)?;
    fs::write(&args.out, &outcome.archive)
        .with_context(|| format!("write archive to {}", args.out.display()))?;
    Ok(outcome.summary)
}

pub fn run_config(command: &ConfigCommand, store_dir: &Path) -> Result<()> {
    let store = ConfigStore::open(store_dir).context("open configuration store")?;
    match command {
        ConfigCommand::Add { file, id } => {
            let contents = fs::read_to_string(file)
                .with_context(|| format!("read config file {}", file.display()))?;
            let config: FieldMappingConfig = serde_json::from_str(&contents)
                .with_context(|| format!("parse mapping config {}", file.display()))?;
            let id = store.save_mapping(&config, id.as_deref())?;
            println!("Saved mapping config '{}' as {id}", config.name);
        }
        ConfigCommand::List => {
            let mappings = store.list_mappings()?;
            print_config_list(&mappings);
        }
        ConfigCommand::Show { id } => {
            let Some(config) = store.field_mapping(id)? else {
                bail!("no mapping config stored under '{id}'");
            };
            let json = serde_json::to_string_pretty(&config).context("serialize config")?;
            println!("{json}");
        }
        ConfigCommand::Rm { id } => {
            if store.delete_mapping(id)? {
                println!("Deleted mapping config {id}");
            } else {
                bail!("no mapping config stored under '{id}'");
            }
        }
    }
    Ok(())
}

pub fn run_taxonomy(command: &TaxonomyCommand, store_dir: &Path) -> Result<()> {
    let store = ConfigStore::open(store_dir).context("open configuration store")?;
    match command {
        TaxonomyCommand::Set { file } => {
            let upload = UploadedFile::from_path(file)
                .with_context(|| format!("read taxonomy file {}", file.display()))?;
            let table = read_table(&upload)?;
            let taxonomy = GapsTaxonomy::from_table(&table);
            if taxonomy.is_empty() {
                bail!("taxonomy file {} has no columns", file.display());
            }
            store.replace_taxonomy(&taxonomy)?;
            println!(
                "Taxonomy replaced: {} care-gap categories, {} synonym rows",
                taxonomy.columns.len(),
                taxonomy.rows.len()
            );
        }
        TaxonomyCommand::Show => {
            let Some(taxonomy) = store.gaps_taxonomy()? else {
                bail!("no gaps taxonomy has been uploaded");
            };
            print_taxonomy(&taxonomy);
        }
    }
    Ok(())
}

/// Parse a `PATH=CONFIG_ID` source specification.
fn parse_source_spec(spec: &str) -> Result<(PathBuf, String)> {
    match spec.split_once('=') {
        Some((path, id)) if !path.is_empty() && !id.trim().is_empty() => {
            Ok((PathBuf::from(path), id.trim().to_string()))
        }
        _ => bail!("invalid source '{spec}': expected PATH=CONFIG_ID"),
    }
}

/// Expand the PDF arguments: files are taken as-is, directories contribute
/// the `.pdf` files directly inside them, sorted by name.
fn collect_pdfs(paths: &[PathBuf]) -> Result<Vec<Box<dyn PdfSource>>> {
    let mut files: Vec<PathBuf> = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut in_dir: Vec<PathBuf> = Vec::new();
            let entries = fs::read_dir(path)
                .with_context(|| format!("read directory {}", path.display()))?;
            for entry in entries {
                let entry = entry.with_context(|| format!("read directory {}", path.display()))?;
                let candidate = entry.path();
                let is_pdf = candidate
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
                if candidate.is_file() && is_pdf {
                    in_dir.push(candidate);
                }
            }
            in_dir.sort();
            files.extend(in_dir);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files
        .into_iter()
        .map(|path| Box::new(DiskPdf::new(path)) as Box<dyn PdfSource>)
        .collect())
}
