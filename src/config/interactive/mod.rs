#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input};

use super::{Config, ConfigError, LlmConfig, OllamaConfig, get_config_dir};
use crate::embeddings::OllamaClient;

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!("{}", style("🔧 docqa Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config()?;

    eprintln!("{}", style("Embedding Server Configuration").bold().yellow());
    eprintln!("Configure your local Ollama instance for embedding generation.");
    eprintln!();

    configure_ollama(&mut config.ollama)?;

    eprintln!();
    eprintln!("{}", style("Answer Generation Configuration").bold().yellow());
    eprintln!("Configure the chat-completion endpoint used by the `ask` command.");
    eprintln!();

    configure_llm(&mut config.llm)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());

    if test_ollama_connection(&config.ollama)? {
        eprintln!("{}", style("✓ Embedding server connection successful!").green());
    } else {
        eprintln!(
            "{}",
            style("⚠ Warning: Could not connect to the embedding server").yellow()
        );
        eprintln!("You can continue, but make sure Ollama is running before ingesting.");
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());

        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load_default().context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Embedding Server:").bold().yellow());
    eprintln!("  Host: {}", style(&config.ollama.host).cyan());
    eprintln!("  Port: {}", style(config.ollama.port).cyan());
    eprintln!("  Model: {}", style(&config.ollama.model).cyan());
    eprintln!("  Batch Size: {}", style(config.ollama.batch_size).cyan());
    eprintln!(
        "  Embedding Dimension: {}",
        style(config.ollama.embedding_dimension).cyan()
    );
    match config.ollama_url() {
        Ok(url) => eprintln!("  URL: {}", style(url).cyan()),
        Err(e) => eprintln!("  URL: {} ({})", style("Invalid").red(), e),
    }

    eprintln!();
    eprintln!("{}", style("Answer Generation:").bold().yellow());
    eprintln!("  API URL: {}", style(&config.llm.api_url).cyan());
    eprintln!("  Model: {}", style(&config.llm.model).cyan());
    eprintln!("  API Key Env: {}", style(&config.llm.api_key_env).cyan());
    eprintln!("  Temperature: {}", style(config.llm.temperature).cyan());
    eprintln!("  Max Tokens: {}", style(config.llm.max_tokens).cyan());

    eprintln!();
    eprintln!("{}", style("Chunking:").bold().yellow());
    eprintln!("  Max Characters: {}", style(config.chunking.max_chars).cyan());
    eprintln!(
        "  Overlap Sentences: {}",
        style(config.chunking.overlap_sentences).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Search:").bold().yellow());
    eprintln!("  Top K: {}", style(config.search.top_k).cyan());
    eprintln!(
        "  Oversample Factor: {}",
        style(config.search.oversample_factor).cyan()
    );

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );
    eprintln!("Store: {}", style(config.store_dir().display()).dim());

    Ok(())
}

fn load_existing_config() -> Result<Config> {
    let config_dir = get_config_dir()?;
    Config::load(config_dir)
}

fn configure_ollama(config: &mut OllamaConfig) -> Result<()> {
    let host: String = Input::new()
        .with_prompt("Ollama host")
        .default(config.host.clone())
        .interact_text()?;
    config
        .set_host(host)
        .map_err(|e: ConfigError| anyhow::anyhow!(e))?;

    let port: u16 = Input::new()
        .with_prompt("Ollama port")
        .default(config.port)
        .interact_text()?;
    config.set_port(port).map_err(|e| anyhow::anyhow!(e))?;

    let model: String = Input::new()
        .with_prompt("Embedding model")
        .default(config.model.clone())
        .interact_text()?;
    config.set_model(model).map_err(|e| anyhow::anyhow!(e))?;

    let batch_size: u32 = Input::new()
        .with_prompt("Batch size")
        .default(config.batch_size)
        .interact_text()?;
    config
        .set_batch_size(batch_size)
        .map_err(|e| anyhow::anyhow!(e))?;

    let dimension: u32 = Input::new()
        .with_prompt("Embedding dimension")
        .default(config.embedding_dimension)
        .interact_text()?;
    config
        .set_embedding_dimension(dimension)
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}

fn configure_llm(config: &mut LlmConfig) -> Result<()> {
    config.api_url = Input::new()
        .with_prompt("Chat completions API URL")
        .default(config.api_url.clone())
        .interact_text()?;

    config.model = Input::new()
        .with_prompt("Chat model")
        .default(config.model.clone())
        .interact_text()?;

    config.api_key_env = Input::new()
        .with_prompt("API key environment variable")
        .default(config.api_key_env.clone())
        .interact_text()?;

    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}

fn test_ollama_connection(config: &OllamaConfig) -> Result<bool> {
    let client = OllamaClient::new(config)
        .context("Failed to create embedding client from configuration")?
        .with_retry_attempts(1);

    Ok(client.ping().is_ok())
}
