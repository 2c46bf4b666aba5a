use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use log::{debug, info};
use serde::{Serialize, Deserialize};

use crate::errors::{LlmError, LlmResult};
use crate::relay::manager::LlmManager;
use crate::providers::ProviderType;

/// One timed prompt/response pair from a benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRecord {
    pub prompt: String,
    pub response: String,
    /// Elapsed wall-clock time in seconds
    pub time: f64,
    /// Response length in characters
    pub characters: usize,
}

/// Benchmark results for a single provider over an ordered prompt set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub provider: String,
    pub tests: Vec<TestRecord>,
    /// Arithmetic mean of elapsed times; 0.0 when no prompts were run
    pub average_time: f64,
    /// Arithmetic mean of response lengths; 0.0 when no prompts were run
    pub average_characters: f64,
}

impl BenchmarkReport {
    /// Builds a report from recorded tests, computing the averages.
    pub fn from_tests(provider: String, tests: Vec<TestRecord>) -> Self {
        let (average_time, average_characters) = if tests.is_empty() {
            (0.0, 0.0)
        } else {
            let count = tests.len() as f64;
            (
                tests.iter().map(|t| t.time).sum::<f64>() / count,
                tests.iter().map(|t| t.characters as f64).sum::<f64>() / count,
            )
        };

        BenchmarkReport { provider, tests, average_time, average_characters }
    }
}

/// Summary of a multi-provider comparison.
///
/// Both fields are `None` when no providers were compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub fastest_provider: Option<String>,
    pub fastest_average_time: Option<f64>,
}

/// Results of benchmarking multiple providers over the same prompt set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub providers: HashMap<String, BenchmarkReport>,
    pub summary: ComparisonSummary,
}

impl ComparisonReport {
    /// Aggregates per-provider reports, ranking by average latency.
    ///
    /// The fastest provider is the one with the minimum `average_time`;
    /// ties keep the earliest report in the input order.
    pub fn from_reports(reports: Vec<BenchmarkReport>) -> Self {
        let mut fastest: Option<(String, f64)> = None;
        for report in &reports {
            let faster = match &fastest {
                Some((_, best)) => report.average_time < *best,
                None => true,
            };
            if faster {
                fastest = Some((report.provider.clone(), report.average_time));
            }
        }

        let (fastest_provider, fastest_average_time) = match fastest {
            Some((provider, time)) => (Some(provider), Some(time)),
            None => (None, None),
        };

        let providers = reports
            .into_iter()
            .map(|report| (report.provider.clone(), report))
            .collect();

        ComparisonReport {
            providers,
            summary: ComparisonSummary { fastest_provider, fastest_average_time },
        }
    }
}

impl LlmManager {
    /// Benchmarks the active provider over an ordered prompt sequence.
    ///
    /// Each prompt is generated strictly sequentially; elapsed wall-clock
    /// time and response length are recorded per prompt. Provider failures
    /// propagate immediately and abort the run.
    pub async fn benchmark_provider(&self, prompts: &[&str]) -> LlmResult<BenchmarkReport> {
        let system_prompt = self.system_prompt().to_string();
        self.benchmark_with_system(&system_prompt, prompts).await
    }

    /// Benchmarks the active provider with an explicit system prompt.
    pub async fn benchmark_with_system(
        &self,
        system_prompt: &str,
        prompts: &[&str],
    ) -> LlmResult<BenchmarkReport> {
        let provider = self.current_provider();
        info!("Benchmarking provider '{}' over {} prompts", provider, prompts.len());

        let mut tests = Vec::with_capacity(prompts.len());
        for prompt in prompts {
            let start = Instant::now();
            let response = self.generate_with_system(system_prompt, prompt).await?;
            let time = start.elapsed().as_secs_f64();
            let characters = response.chars().count();
            debug!(
                "Provider '{}' answered {} chars in {:.3}s",
                provider, characters, time
            );
            tests.push(TestRecord {
                prompt: prompt.to_string(),
                response,
                time,
                characters,
            });
        }

        Ok(BenchmarkReport::from_tests(provider.to_string(), tests))
    }

    /// Benchmarks each listed provider over the same prompt set.
    ///
    /// Providers are benchmarked in the given order; the manager is left
    /// with the last listed provider active. The summary names the
    /// provider with the lowest average latency, first occurrence winning
    /// ties.
    pub async fn compare_providers(
        &mut self,
        providers: &[ProviderType],
        prompts: &[&str],
    ) -> LlmResult<ComparisonReport> {
        let system_prompt = self.system_prompt().to_string();
        self.compare_with_system(&system_prompt, providers, prompts).await
    }

    /// Compares providers with an explicit system prompt.
    pub async fn compare_with_system(
        &mut self,
        system_prompt: &str,
        providers: &[ProviderType],
        prompts: &[&str],
    ) -> LlmResult<ComparisonReport> {
        let mut reports = Vec::with_capacity(providers.len());
        for provider in providers {
            self.switch_provider(*provider)?;
            let report = self.benchmark_with_system(system_prompt, prompts).await?;
            info!(
                "Provider '{}': average {:.3}s over {} prompts",
                report.provider, report.average_time, report.tests.len()
            );
            reports.push(report);
        }

        Ok(ComparisonReport::from_reports(reports))
    }
}

/// Serializes `data` as pretty-printed JSON to `path`, overwriting any
/// existing file and creating parent directories as needed.
pub fn save_benchmark_results<T: Serialize, P: AsRef<Path>>(data: &T, path: P) -> LlmResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                LlmError::ConfigError(format!(
                    "Failed to create directories for '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
    }

    let contents = serde_json::to_string_pretty(data)?;

    let mut file = File::create(path).map_err(|e| {
        LlmError::ConfigError(format!("Failed to create '{}': {}", path.display(), e))
    })?;
    file.write_all(contents.as_bytes()).map_err(|e| {
        LlmError::ConfigError(format!("Failed to write '{}': {}", path.display(), e))
    })?;

    Ok(())
}
