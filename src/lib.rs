//! LlmRelay is a Rust library that provides a provider-switching client for Large Language Models.
//!
//! It lets applications talk to multiple LLM backends through a single facade,
//! switch the active backend at runtime, and benchmark response latency and
//! length across backends.
//!
//! # Features
//!
//! - **Multi-provider support**: Anthropic, OpenAI, Mistral, Google, and Ollama
//!   behind one interface
//! - **Runtime switching**: Swap the active backend without rebuilding state
//! - **Streaming**: Lazy, pull-based response chunk streams
//! - **Benchmarking**: Per-prompt latency and length measurements, multi-provider
//!   comparison, and JSON result export
//! - **TOML configuration**: Model catalogs with `${VAR}` environment variable
//!   resolution
//!
//! # Example
//!
//! ```no_run
//! use llmrelay::{LlmManager, ModelCatalog, ModelConfig, ProviderType};
//!
//! async fn example() {
//!     let catalog = ModelCatalog::new()
//!         .with_model(
//!             ProviderType::Anthropic,
//!             ModelConfig::new("claude-3-5-sonnet-20241022").with_api_key("api-key"),
//!         )
//!         .with_model(
//!             ProviderType::OpenAI,
//!             ModelConfig::new("gpt-4o").with_api_key("api-key"),
//!         );
//!
//!     let mut manager = LlmManager::new(ProviderType::Anthropic, catalog)
//!         .expect("Failed to create manager");
//!
//!     let answer = manager
//!         .generate_response("Explain Rust in one paragraph")
//!         .await
//!         .expect("generation failed");
//!     println!("{}", answer);
//!
//!     // Benchmark both backends over the same prompts
//!     let report = manager
//!         .compare_providers(
//!             &[ProviderType::Anthropic, ProviderType::OpenAI],
//!             &["What is 2+2?", "Name three ferrous metals."],
//!         )
//!         .await
//!         .expect("comparison failed");
//!     println!("fastest: {:?}", report.summary.fastest_provider);
//! }
//! ```

pub mod providers;
pub mod errors;
pub mod constants;
pub mod relay;
pub mod config;

pub use providers::{
    ProviderType,
    LlmProvider,
    LlmRequest,
    LlmResponse,
    TokenUsage,
    StreamChunk,
    LlmStream,
    create_provider,
    AnthropicProvider,
    OpenAIProvider,
    MistralProvider,
    GoogleProvider,
    OllamaProvider,
};

pub use errors::{LlmError, LlmResult};

pub use relay::{
    LlmManager,
    ModelCatalog,
    ModelConfig,
    BenchmarkReport,
    ComparisonReport,
    ComparisonSummary,
    TestRecord,
    save_benchmark_results,
};

/// Initialize the logging system
///
/// This should be called at the start of your application in case
/// you want to activate the library's debug and info logging.
pub fn use_logging() {
    env_logger::init();
}
