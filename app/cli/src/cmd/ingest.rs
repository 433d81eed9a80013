//! Ingestion commands against the backend.

use anyhow::{Result, bail};
use client::{ALLOWED_EXTENSIONS, BackendClient, FileSelection};
use std::path::PathBuf;

/// Upload the supported files among `files`, optionally processing them.
pub async fn upload(backend: &BackendClient, files: Vec<PathBuf>, process: bool) -> Result<()> {
    let total = files.len();
    let mut selection = FileSelection::default();
    let accepted = selection.select(files);
    if accepted < total {
        eprintln!(
            "skipped {} file(s); supported types: {}",
            total - accepted,
            ALLOWED_EXTENSIONS.join(", ")
        );
    }
    if selection.is_empty() {
        bail!("no supported files to upload");
    }

    let stored = backend.upload_files(selection.pending()).await?;
    for name in &stored {
        println!("uploaded {name}");
    }
    selection.reset();

    if process {
        println!("{}", backend.process_files().await?);
    }
    Ok(())
}

/// Process previously uploaded files.
pub async fn process(backend: &BackendClient) -> Result<()> {
    println!("{}", backend.process_files().await?);
    Ok(())
}

/// Ingest web pages.
pub async fn urls(backend: &BackendClient, urls: Vec<String>) -> Result<()> {
    println!("{}", backend.process_urls(urls).await?);
    Ok(())
}

/// Ingest a YouTube transcript.
pub async fn youtube(backend: &BackendClient, url: &str) -> Result<()> {
    println!("{}", backend.process_youtube(url).await?);
    Ok(())
}

/// Ingest a Git repository.
pub async fn git(backend: &BackendClient, url: &str) -> Result<()> {
    println!("{}", backend.process_git(url).await?);
    Ok(())
}

/// Clear the vector store.
pub async fn delete(backend: &BackendClient) -> Result<()> {
    println!("{}", backend.delete_context().await?);
    Ok(())
}
