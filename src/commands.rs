use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::embeddings::OllamaClient;
use crate::llm::ChatClient;
use crate::retrieval::RetrievalService;
use crate::store::IndexStore;

/// Load configuration and assemble the retrieval service around the
/// persistent store and the configured embedding client
fn load_service() -> Result<(Config, RetrievalService)> {
    let config = Config::load_default().context("Failed to load configuration")?;

    let client = OllamaClient::new(&config.ollama)
        .context("Failed to create embedding client from configuration")?;

    let store = IndexStore::open(
        config.store_dir(),
        config.ollama.embedding_dimension as usize,
    )
    .context("Failed to open index store")?;

    let service = RetrievalService::new(
        Arc::new(store),
        Arc::new(client),
        config.chunking.clone(),
        &config.search,
    );

    Ok((config, service))
}

fn spinner(message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Ingest a pre-extracted text document into the store.
///
/// The file must already be plain text; extracting text from PDFs or other
/// binary formats happens upstream. A UUID document id is issued when none
/// is supplied.
#[inline]
pub async fn ingest_document(file: &Path, document_id: Option<String>) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read document text from {}", file.display()))?;

    if text.trim().is_empty() {
        return Err(anyhow::anyhow!(
            "No extractable text found in {}",
            file.display()
        ));
    }

    let document_id = document_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    info!("Ingesting {} as document {}", file.display(), document_id);

    let (_config, service) = load_service()?;

    let bar = spinner("Embedding and indexing document...");
    let count = service.ingest(&document_id, &text).await;
    bar.finish_and_clear();
    let count = count?;

    if count == 0 {
        println!(
            "{}",
            style("Document produced no chunks; nothing was indexed.").yellow()
        );
        return Ok(());
    }

    println!("{}", style("Document indexed successfully").green());
    println!("  Document ID: {}", style(&document_id).cyan());
    println!("  Chunks indexed: {}", style(count).cyan());

    Ok(())
}

/// Run a document-scoped semantic search and print the matching chunks
#[inline]
pub async fn search_document(
    document_id: &str,
    query: &str,
    top_k: Option<usize>,
) -> Result<()> {
    let (config, service) = load_service()?;
    let top_k = top_k.unwrap_or(config.search.top_k);

    let results = service.search(document_id, query, top_k).await?;

    if results.is_empty() {
        println!("No matching chunks found in document {}.", document_id);
        return Ok(());
    }

    println!(
        "Top {} chunks for {} in document {}:",
        results.len(),
        style(query).cyan(),
        style(document_id).cyan()
    );
    println!();

    for (i, result) in results.iter().enumerate() {
        println!(
            "{} {}",
            style(format!("{}.", i + 1)).bold(),
            style(format!("(distance {:.4})", result.distance)).dim()
        );
        println!("   {}", result.text);
        println!();
    }

    Ok(())
}

/// Answer a question about one document: retrieve the most relevant chunks,
/// then generate a grounded answer from them
#[inline]
pub async fn ask_document(
    document_id: &str,
    question: &str,
    top_k: Option<usize>,
) -> Result<()> {
    let (config, service) = load_service()?;
    let top_k = top_k.unwrap_or(config.search.top_k);

    let results = service.search(document_id, question, top_k).await?;

    if results.is_empty() {
        println!("No relevant information found in the document.");
        return Ok(());
    }

    let chat = ChatClient::new(&config.llm)
        .context("Failed to create answer generation client")?;
    let contexts: Vec<String> = results.into_iter().map(|r| r.text).collect();

    let bar = spinner("Generating answer...");
    let answer = chat.generate_answer(question, &contexts);
    bar.finish_and_clear();
    let answer = answer?;

    println!("{} {}", style("Question:").bold(), question);
    println!();
    println!("{} {}", style("Answer:").bold().green(), answer);

    Ok(())
}

/// Show store location, record counts, per-document chunk counts, and
/// embedding server health
#[inline]
pub async fn show_status() -> Result<()> {
    let (config, service) = load_service()?;
    let store = service.store();

    println!("{}", style("📊 docqa Status").bold().cyan());
    println!();

    println!("{}", style("Index Store:").bold().yellow());
    println!("  Location: {}", style(config.store_dir().display()).cyan());
    println!(
        "  Records: {}",
        style(store.len().context("Failed to read store length")?).cyan()
    );
    println!(
        "  Dimension: {}",
        style(config.ollama.embedding_dimension).cyan()
    );

    let metadata_path = store.metadata_path();
    if let Ok(modified) = std::fs::metadata(&metadata_path).and_then(|m| m.modified()) {
        let modified: chrono::DateTime<chrono::Local> = modified.into();
        println!(
            "  Last Persisted: {}",
            style(modified.format("%Y-%m-%d %H:%M:%S")).cyan()
        );
    }

    let counts = store
        .document_counts()
        .context("Failed to read document counts")?;
    if counts.is_empty() {
        println!();
        println!("No documents have been ingested yet.");
        println!("Use 'docqa ingest <file>' to index a document.");
    } else {
        println!();
        println!("{}", style("Documents:").bold().yellow());
        for (document_id, count) in counts {
            println!("  📄 {} ({} chunks)", style(document_id).cyan(), count);
        }
    }

    println!();
    println!("{}", style("Embedding Server:").bold().yellow());
    match config.ollama_url() {
        Ok(url) => println!("  URL: {}", style(url).cyan()),
        Err(e) => println!("  URL: {} ({})", style("Invalid").red(), e),
    }
    let client = OllamaClient::new(&config.ollama)?.with_retry_attempts(1);
    if client.ping().is_ok() {
        println!("  Status: {}", style("Reachable").green());
    } else {
        println!("  Status: {}", style("Unreachable").red());
    }

    Ok(())
}
