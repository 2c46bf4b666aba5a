//! Streams a response from a local Ollama instance chunk by chunk.
//!
//! ```bash
//! cargo run --example streaming
//! ```

use std::io::Write;

use futures::StreamExt;
use llmrelay::{LlmManager, ModelCatalog, ProviderType};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    llmrelay::use_logging();

    let manager = LlmManager::new(ProviderType::Ollama, ModelCatalog::from_env())?;

    let mut stream = manager
        .stream_response("Write a haiku about borrowed values.")
        .await?;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        print!("{}", chunk.content);
        std::io::stdout().flush()?;
        if chunk.is_final {
            break;
        }
    }
    println!();

    Ok(())
}
