use crate::core::Pipeline;
use crate::domain::model::{RunSummary, SampleOutcome, SampleStatus};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Feeds samples through a [`Pipeline`] one after another.
pub struct BatchEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> BatchEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Stops at the first failing sample.
    pub async fn run(&self, inputs: &[String]) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for (index, input) in inputs.iter().enumerate() {
            tracing::info!(
                "Processing input argument: {} ({}/{})",
                input,
                index + 1,
                inputs.len()
            );

            // Extract
            let Some(sample) = self.pipeline.extract(input).await? else {
                summary.samples.push(SampleOutcome {
                    input: input.clone(),
                    status: SampleStatus::Skipped,
                });
                continue;
            };
            self.monitor.log_stats(input, "fetch");

            // Transform
            let envelope = self.pipeline.transform(&sample).await?;
            self.monitor.log_stats(input, "humann2");

            // Load
            let destination = self.pipeline.load(sample, envelope).await?;
            self.monitor.log_stats(input, "upload");
            tracing::info!("📁 Results saved to: {}", destination);

            summary.samples.push(SampleOutcome {
                input: input.clone(),
                status: SampleStatus::Written(destination),
            });
        }

        self.monitor.log_final_stats();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Humann2Outputs, ResultEnvelope, RunParameters, StagedSample};
    use crate::utils::error::RunnerError;
    use std::sync::Mutex;

    /// Records calls; `skip` inputs already exist, `fail` inputs break in transform.
    struct ScriptedPipeline {
        skip: Vec<&'static str>,
        fail: Vec<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedPipeline {
        fn new(skip: Vec<&'static str>, fail: Vec<&'static str>) -> Self {
            Self {
                skip,
                fail,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for ScriptedPipeline {
        async fn extract(&self, input: &str) -> Result<Option<StagedSample>> {
            self.record(format!("extract {}", input));
            if self.skip.iter().any(|s| *s == input) {
                return Ok(None);
            }
            let workdir = tempfile::TempDir::new()?;
            Ok(Some(StagedSample {
                input: input.to_string(),
                prefix: input.to_string(),
                reads: workdir.path().join("reads.fastq"),
                workdir,
            }))
        }

        async fn transform(&self, sample: &StagedSample) -> Result<ResultEnvelope> {
            self.record(format!("transform {}", sample.input));
            if self.fail.iter().any(|f| *f == sample.input) {
                return Err(RunnerError::CommandFailed {
                    command: "humann2".to_string(),
                    code: Some(1),
                });
            }
            Ok(ResultEnvelope::new(
                Humann2Outputs::default(),
                RunParameters {
                    db: "db".to_string(),
                    input: sample.input.clone(),
                    threads: 1,
                },
                vec![],
            ))
        }

        async fn load(&self, sample: StagedSample, _envelope: ResultEnvelope) -> Result<String> {
            self.record(format!("load {}", sample.input));
            Ok(format!("out/{}.json.gz", sample.prefix))
        }
    }

    fn inputs(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_run_processes_in_order_and_skips() {
        let engine = BatchEngine::new(ScriptedPipeline::new(vec!["b"], vec![]));

        let summary = engine.run(&inputs(&["a", "b", "c"])).await.unwrap();

        assert_eq!(summary.written(), 2);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(
            summary.samples[0].status,
            SampleStatus::Written("out/a.json.gz".to_string())
        );
        assert_eq!(summary.samples[1].status, SampleStatus::Skipped);

        let calls = engine.pipeline.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                "extract a",
                "transform a",
                "load a",
                "extract b",
                "extract c",
                "transform c",
                "load c"
            ]
        );
    }

    #[tokio::test]
    async fn test_run_stops_at_first_failure() {
        let engine = BatchEngine::new_with_monitoring(ScriptedPipeline::new(vec![], vec!["a"]), true);

        let result = engine.run(&inputs(&["a", "b"])).await;

        assert!(matches!(result, Err(RunnerError::CommandFailed { .. })));
        let calls = engine.pipeline.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["extract a", "transform a"]);
    }
}
