//! Benchmarks every provider configured through environment variables over a
//! small prompt set, prints the ranking, and saves the full comparison to
//! `benchmark_results.json`.
//!
//! ```bash
//! OPENAI_API_KEY=... ANTHROPIC_API_KEY=... cargo run --example compare
//! ```

use llmrelay::{save_benchmark_results, LlmManager, ModelCatalog, ProviderType};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    llmrelay::use_logging();

    let catalog = ModelCatalog::from_env();
    let providers: Vec<ProviderType> = catalog.providers().collect();
    println!(
        "Configured providers: {}",
        providers.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(", ")
    );

    let initial = providers[0];
    let mut manager = LlmManager::new(initial, catalog)?;

    let prompts = [
        "What is 2+2?",
        "Explain the difference between TCP and UDP in two sentences.",
        "Name three ferrous metals.",
    ];

    let comparison = manager.compare_providers(&providers, &prompts).await?;

    for (name, report) in &comparison.providers {
        println!(
            "{}: {:.3}s average, {:.0} chars average over {} prompts",
            name,
            report.average_time,
            report.average_characters,
            report.tests.len()
        );
    }
    if let Some(fastest) = &comparison.summary.fastest_provider {
        println!("Fastest provider: {}", fastest);
    }

    save_benchmark_results(&comparison, "benchmark_results.json")?;
    println!("Saved full results to benchmark_results.json");

    Ok(())
}
