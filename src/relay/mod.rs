pub mod catalog;
pub mod manager;
pub mod benchmark;

pub use catalog::{ModelCatalog, ModelConfig};
pub use manager::LlmManager;
pub use benchmark::{
    save_benchmark_results, BenchmarkReport, ComparisonReport, ComparisonSummary, TestRecord,
};
