use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::{
    builder::{HierarchyBuilder, RowOutcome},
    document_store::{load_or_default, save_document},
    error::AtlasError,
    lookup::LookupTable,
    models::{Hierarchy, HierarchySummary, SourceRow},
    source::read_rows,
};

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub lookup_path: PathBuf,
    pub source_path: PathBuf,
    pub document_path: PathBuf,
    /// Start from the existing document instead of an empty hierarchy.
    pub extend: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionReport {
    pub rows: usize,
    pub skipped: usize,
    pub summary: HierarchySummary,
}

/// Folds rows in order. Stops at the first fatal error; the hierarchy may then
/// be partially built and must not be saved.
pub fn fold_rows(
    lookup: &LookupTable,
    hierarchy: &mut Hierarchy,
    rows: &[SourceRow],
) -> Result<usize, AtlasError> {
    let mut builder = HierarchyBuilder::new(lookup, hierarchy);
    let mut skipped = 0;
    for (index, row) in rows.iter().enumerate() {
        if let RowOutcome::Skipped(level) = builder.apply_row(row)? {
            debug!(row = index + 1, level = %level, "Row dropped below unresolved name");
            skipped += 1;
        }
    }
    Ok(skipped)
}

pub async fn run_conversion(options: &ConvertOptions) -> Result<ConversionReport> {
    let lookup = LookupTable::load(&options.lookup_path).context("Failed to load lookup table")?;
    let rows = read_rows(&options.source_path).context("Failed to read source table")?;

    let mut hierarchy = initial_hierarchy(&options.document_path, options.extend).await?;
    let skipped = fold_rows(&lookup, &mut hierarchy, &rows)
        .with_context(|| format!("Conversion of {} aborted", options.source_path.display()))?;

    save_document(&options.document_path, &hierarchy).await?;

    let report = ConversionReport {
        rows: rows.len(),
        skipped,
        summary: hierarchy.summary(),
    };
    info!(
        rows = report.rows,
        skipped = report.skipped,
        countries = report.summary.countries,
        regions = report.summary.regions,
        provinces = report.summary.provinces,
        cliffs = report.summary.cliffs,
        sectors = report.summary.sectors,
        routes = report.summary.routes,
        "Document saved to {}",
        options.document_path.display()
    );
    Ok(report)
}

async fn initial_hierarchy(document_path: &Path, extend: bool) -> Result<Hierarchy> {
    if extend {
        load_or_default(document_path).await
    } else {
        Ok(Hierarchy::default())
    }
}
