use crate::adapters::command::run_cmds;
use crate::config::toml_config::ToolsConfig;
use crate::core::refdb::ReferenceDatabase;
use crate::domain::model::{GeneFamily, Humann2Outputs, PathwayAbundance, PathwayCoverage};
use crate::utils::error::{RunnerError, Result};
use std::path::{Path, PathBuf};

pub const GENE_FAMILIES: &str = "genefamilies";
pub const PATHWAY_ABUNDANCE: &str = "pathabundance";
pub const PATHWAY_COVERAGE: &str = "pathcoverage";

pub async fn run_humann2(
    tools: &ToolsConfig,
    reads: &Path,
    db: &ReferenceDatabase,
    output_dir: &Path,
    threads: usize,
) -> Result<()> {
    let mut args = vec![
        "--input".to_string(),
        reads.display().to_string(),
        "--output".to_string(),
        output_dir.display().to_string(),
        "--nucleotide-database".to_string(),
        db.nucleotide_db().display().to_string(),
        "--protein-database".to_string(),
        db.protein_db().display().to_string(),
        "--threads".to_string(),
        threads.to_string(),
    ];
    args.extend(tools.humann2_extra_args.iter().cloned());

    run_cmds(&tools.humann2, &args).await?;
    Ok(())
}

/// Reads the three HUMAnN2 tables out of `output_dir`.
pub fn collect_outputs(output_dir: &Path) -> Result<Humann2Outputs> {
    let mut gene_families: Option<PathBuf> = None;
    let mut pathway_abund: Option<PathBuf> = None;
    let mut pathway_cov: Option<PathBuf> = None;

    for entry in std::fs::read_dir(output_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        let (slot, kind) = if name.ends_with(&format!("_{}.tsv", GENE_FAMILIES)) {
            (&mut gene_families, GENE_FAMILIES)
        } else if name.ends_with(&format!("_{}.tsv", PATHWAY_ABUNDANCE)) {
            (&mut pathway_abund, PATHWAY_ABUNDANCE)
        } else if name.ends_with(&format!("_{}.tsv", PATHWAY_COVERAGE)) {
            (&mut pathway_cov, PATHWAY_COVERAGE)
        } else {
            continue;
        };

        if slot.is_some() {
            return Err(RunnerError::DuplicateOutput {
                kind: kind.to_string(),
            });
        }
        *slot = Some(path);
    }

    let require = |slot: Option<PathBuf>, kind: &str| {
        slot.ok_or_else(|| RunnerError::MissingOutput {
            kind: kind.to_string(),
        })
    };
    let gene_families = require(gene_families, GENE_FAMILIES)?;
    let pathway_abund = require(pathway_abund, PATHWAY_ABUNDANCE)?;
    let pathway_cov = require(pathway_cov, PATHWAY_COVERAGE)?;

    Ok(Humann2Outputs {
        gene_families: read_tsv(&gene_families)?
            .into_iter()
            .map(|(name, rpk)| GeneFamily { name, rpk })
            .collect(),
        pathway_abund: read_tsv(&pathway_abund)?
            .into_iter()
            .map(|(pathway, abund)| PathwayAbundance { pathway, abund })
            .collect(),
        pathway_cov: read_tsv(&pathway_cov)?
            .into_iter()
            .map(|(pathway, cov)| PathwayCoverage { pathway, cov })
            .collect(),
    })
}

/// Two-column HUMAnN2 table: `#` lines are comments, blank lines are skipped.
pub fn read_tsv(path: &Path) -> Result<Vec<(String, f64)>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .quoting(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() != 2 {
            return Err(RunnerError::MalformedTsv {
                path: path.to_path_buf(),
                line,
                message: format!("expected 2 columns, found {}", record.len()),
            });
        }

        let value = record[1]
            .trim()
            .parse::<f64>()
            .map_err(|e| RunnerError::MalformedTsv {
                path: path.to_path_buf(),
                line,
                message: format!("'{}' is not a number: {}", &record[1], e),
            })?;
        // NaN 與 inf 無法以 JSON 數字表示
        if !value.is_finite() {
            return Err(RunnerError::MalformedTsv {
                path: path.to_path_buf(),
                line,
                message: format!("'{}' is not a finite number", &record[1]),
            });
        }
        rows.push((record[0].to_string(), value));
    }

    Ok(rows)
}
