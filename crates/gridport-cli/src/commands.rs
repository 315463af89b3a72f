use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use comfy_table::Table;
use tracing::{info, warn};

use gridport_core::{
    DiagLevel, FileLogger, ImportLogger, Importer, MemoryLogger, TypeRegistry,
};
use gridport_ingest::read_source;
use gridport_map::{FieldSuggestion, suggest_fields};
use gridport_model::{
    DataStore, ImmutableMappingConfiguration, ImportOptions, KeyShape, MappingConfiguration,
};

use crate::cli::{ImportArgs, SuggestArgs, ValidateArgs};
use crate::summary::apply_table_style;
use crate::types::{FileOutcome, ImportReport, ValidationReport};

pub fn run_import(args: &ImportArgs) -> Result<ImportReport> {
    let config = load_immutable(&args.mapping)?;
    let options = ImportOptions {
        strict_missing_required_headers: args.strict,
        worksheets: args.worksheets.clone(),
    };
    let importer = Importer::new(&config, options);
    let mut store = DataStore::new();

    let files = match &args.diagnostics {
        Some(path) => {
            let mut logger = FileLogger::open(path, args.verbose_diagnostics)
                .with_context(|| format!("open diagnostics file {}", path.display()))?;
            import_all(&importer, &args.sources, &mut store, &mut logger)?
        }
        None => {
            let mut logger = if args.verbose_diagnostics {
                MemoryLogger::verbose()
            } else {
                MemoryLogger::new()
            };
            let outcome = import_all(&importer, &args.sources, &mut store, &mut logger);
            // Without a diagnostics file, verbose mode echoes everything to
            // stderr and quiet mode echoes only engine-level errors.
            if args.verbose_diagnostics {
                let rendered = logger.render();
                if !rendered.is_empty() {
                    eprintln!("{rendered}");
                }
            } else {
                for message in logger.messages_at(DiagLevel::Error) {
                    eprintln!("diagnostic: {message}");
                }
            }
            outcome?
        }
    };

    let registry = TypeRegistry::with_defaults();
    let store_counts: Vec<(&'static str, usize)> = registry
        .descriptions()
        .iter()
        .map(|description| {
            (
                description.name,
                store.count_for(description.name).unwrap_or(0),
            )
        })
        .collect();
    let total_records = store.total_records();

    if let Some(out) = &args.out {
        let json = serde_json::to_string_pretty(&store).context("serialize store")?;
        std::fs::write(out, json)
            .with_context(|| format!("write store to {}", out.display()))?;
        info!(path = %out.display(), records = total_records, "store written");
    }

    Ok(ImportReport {
        files,
        store_counts,
        total_records,
        out: args.out.clone(),
    })
}

pub fn run_validate(args: &ValidateArgs) -> Result<ValidationReport> {
    let mut config = MappingConfiguration::load(&args.mapping)
        .with_context(|| format!("load mapping configuration {}", args.mapping.display()))?;
    config.normalize();
    let result = config.validate();
    Ok(ValidationReport {
        mapping: args.mapping.clone(),
        entry_count: config.import_map.len(),
        result,
    })
}

pub fn run_suggest(args: &SuggestArgs) -> Result<Vec<FieldSuggestion>> {
    let registry = TypeRegistry::with_defaults();
    let fields = registry
        .field_names(&args.type_name)
        .ok_or_else(|| anyhow!("unknown record type `{}`", args.type_name))?;

    let options = ImportOptions::new().with_worksheets(args.worksheets.clone());
    let allowed = |sheet: &str| options.sheet_allowed(sheet);
    let units = read_source(&args.source, &allowed)
        .with_context(|| format!("read {}", args.source.display()))?;
    let headers = first_nonblank_row(&units);
    if headers.is_empty() {
        bail!("{} contains no header row", args.source.display());
    }
    info!(headers = headers.len(), r#type = %args.type_name, "scoring headers");
    Ok(suggest_fields(&headers, &fields, args.min_score))
}

pub fn run_types() -> Result<()> {
    let registry = TypeRegistry::with_defaults();
    let mut table = Table::new();
    table.set_header(vec!["Type", "Key", "Identifier", "Fields"]);
    apply_table_style(&mut table);
    for description in registry.descriptions() {
        let fields = description
            .fields
            .iter()
            .map(|(name, kind)| format!("{name} ({kind})"))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            description.name.to_string(),
            key_shape_label(description.key_shape).to_string(),
            description.identifier_property.to_string(),
            fields,
        ]);
    }
    println!("{table}");
    Ok(())
}

fn load_immutable(path: &Path) -> Result<ImmutableMappingConfiguration> {
    let mut config = MappingConfiguration::load(path)
        .with_context(|| format!("load mapping configuration {}", path.display()))?;
    config.normalize();
    for warning in &config.validate().warnings {
        warn!("mapping: {warning}");
    }
    config
        .to_immutable()
        .context("mapping configuration failed validation")
}

fn import_all(
    importer: &Importer<'_>,
    sources: &[PathBuf],
    store: &mut DataStore,
    logger: &mut dyn ImportLogger,
) -> Result<Vec<FileOutcome>> {
    let mut files = Vec::with_capacity(sources.len());
    for source in sources {
        let summary = importer
            .import_path(source, store, logger)
            .with_context(|| format!("import {}", source.display()))?;
        files.push(FileOutcome {
            source: source.clone(),
            summary,
        });
    }
    Ok(files)
}

fn first_nonblank_row(units: &[gridport_ingest::SourceUnit]) -> Vec<String> {
    units
        .iter()
        .flat_map(|unit| unit.rows.iter())
        .find(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|row| {
            row.iter()
                .map(|cell| cell.trim().to_string())
                .filter(|cell| !cell.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn key_shape_label(shape: KeyShape) -> &'static str {
    match shape {
        KeyShape::Single => "id",
        KeyShape::Pair => "id + scenario",
        KeyShape::Triple => "id + secondary + scenario",
    }
}
