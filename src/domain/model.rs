use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneFamily {
    pub name: String,
    #[serde(rename = "RPK")]
    pub rpk: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayAbundance {
    pub pathway: String,
    pub abund: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayCoverage {
    pub pathway: String,
    pub cov: f64,
}

/// Echo of the invocation inputs for one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParameters {
    pub db: String,
    pub input: String,
    pub threads: usize,
}

/// The three tables HUMAnN2 writes for a sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Humann2Outputs {
    pub gene_families: Vec<GeneFamily>,
    pub pathway_abund: Vec<PathwayAbundance>,
    pub pathway_cov: Vec<PathwayCoverage>,
}

/// Result document written as `<prefix>.json.gz`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub gene_families: Vec<GeneFamily>,
    pub pathway_abund: Vec<PathwayAbundance>,
    pub pathway_cov: Vec<PathwayCoverage>,
    pub parameters: RunParameters,
    pub logs: Vec<String>,
}

impl ResultEnvelope {
    pub fn new(outputs: Humann2Outputs, parameters: RunParameters, logs: Vec<String>) -> Self {
        Self {
            gene_families: outputs.gene_families,
            pathway_abund: outputs.pathway_abund,
            pathway_cov: outputs.pathway_cov,
            parameters,
            logs,
        }
    }
}

/// A sample whose reads are on local disk, ready for HUMAnN2.
#[derive(Debug)]
pub struct StagedSample {
    pub input: String,
    pub prefix: String,
    pub reads: std::path::PathBuf,
    pub workdir: tempfile::TempDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleStatus {
    Written(String),
    /// The result already existed.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleOutcome {
    pub input: String,
    pub status: SampleStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub samples: Vec<SampleOutcome>,
}

impl RunSummary {
    pub fn written(&self) -> usize {
        self.samples
            .iter()
            .filter(|s| matches!(s.status, SampleStatus::Written(_)))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.samples.len() - self.written()
    }
}
