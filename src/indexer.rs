//! Document indexing pipeline for `guide index`.
//!
//! Scans the docs directory, splits each file into a header and a body,
//! chunks the body, embeds every chunk and uploads the results to the
//! search index in batches:
//!
//! ```text
//! docs/*.txt → parse header → chunk body → embed (batched) → upload (batched)
//! ```
//!
//! A document file looks like:
//!
//! ```text
//! TITLE: Louvre visitor rules
//! SOURCE: louvre.fr/rules
//! CITY: Paris
//!
//! Bags larger than 55 × 35 × 20 cm are not allowed...
//! ```

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use sha1::{Digest, Sha1};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::chunk::chunk_text;
use crate::config::Config;
use crate::document::{AzureSearchClient, IndexDocument};
use crate::embedding::EmbeddingClient;

/// Only the first lines are scanned for header fields.
const HEADER_LINES: usize = 20;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DocHeader {
    pub title: Option<String>,
    pub source: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexChunk {
    pub source: String,
    pub title: String,
    pub page: i64,
    pub chunk_id: i64,
    pub content: String,
}

pub fn parse_header(text: &str) -> DocHeader {
    let mut header = DocHeader::default();
    for line in text.lines().take(HEADER_LINES) {
        let value = |prefix: &str| {
            line.strip_prefix(prefix)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        if let Some(v) = value("TITLE:") {
            header.title = Some(v);
        } else if let Some(v) = value("SOURCE:") {
            header.source = Some(v);
        } else if let Some(v) = value("CITY:") {
            header.city = Some(v);
        }
    }
    header
}

/// Hex SHA-1 of `"{source}:{chunk_id}"`, stable across re-indexing and
/// identical to the keys already present in existing indexes.
pub fn document_key(source: &str, chunk_id: i64) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("{}:{}", source, chunk_id).as_bytes());
    hex::encode(hasher.finalize())
}

/// Builds the chunks of one file. `file_name` stands in for a missing
/// title or source. The body starts after the first blank line.
pub fn build_chunks(file_name: &str, raw: &str, chunk_size: usize, overlap: usize) -> Vec<IndexChunk> {
    let header = parse_header(raw);
    let source = header.source.unwrap_or_else(|| file_name.to_string());
    let title = header.title.unwrap_or_else(|| file_name.to_string());

    let body = raw.split_once("\n\n").map(|(_, b)| b).unwrap_or(raw);

    chunk_text(body, chunk_size, overlap)
        .into_iter()
        .enumerate()
        .map(|(idx, content)| IndexChunk {
            source: source.clone(),
            title: title.clone(),
            page: 0,
            chunk_id: idx as i64,
            content,
        })
        .collect()
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Lists document files under `root` matching `include_globs`, sorted.
pub fn scan_docs(root: &Path, include_globs: &[String]) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        bail!("docs directory does not exist: {}", root.display());
    }
    let include = build_globset(include_globs)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if include.is_match(relative) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

pub fn collect_chunks(config: &Config) -> Result<Vec<IndexChunk>> {
    let idx = &config.indexing;
    let files = scan_docs(&idx.docs_dir, &idx.include_globs)?;
    if files.is_empty() {
        bail!(
            "No docs found. Put .txt files in {}",
            idx.docs_dir.display()
        );
    }

    let mut chunks = Vec::new();
    for path in &files {
        let raw = std::fs::read_to_string(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let file_chunks = build_chunks(&file_name, &raw, idx.chunk_size, idx.overlap);
        tracing::debug!(file = %path.display(), chunks = file_chunks.len(), "chunked");
        chunks.extend(file_chunks);
    }
    Ok(chunks)
}

pub async fn run_index(config: &Config, dry_run: bool) -> Result<()> {
    let chunks = collect_chunks(config)?;

    if dry_run {
        println!("Index plan (dry-run):");
        println!("  chunks: {}", chunks.len());
        println!("  upload batches: {}", chunks.len().div_ceil(config.indexing.upload_batch_size));
        return Ok(());
    }

    let embedder = EmbeddingClient::new(&config.embedding)?;
    let search = AzureSearchClient::new(&config.search)?;

    let contents: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let vectors = embedder.embed_texts(&contents).await?;
    tracing::info!(vectors = vectors.len(), dims = embedder.dims(), "embedded chunks");

    let docs: Vec<IndexDocument> = chunks
        .into_iter()
        .zip(vectors)
        .map(|(c, v)| IndexDocument {
            action: "mergeOrUpload",
            id: document_key(&c.source, c.chunk_id),
            content: c.content,
            source: c.source,
            page: c.page,
            chunk_id: c.chunk_id,
            title: c.title,
            content_vector: v,
        })
        .collect();

    let mut total_failed = 0usize;
    for batch in docs.chunks(config.indexing.upload_batch_size) {
        let report = search.upload(batch).await?;
        println!("Uploaded {} docs. Failed: {}", batch.len(), report.failed.len());
        if let Some(first) = report.failed.first() {
            println!("Example failure: {}", first);
        }
        total_failed += report.failed.len();
    }

    println!("Done. {} documents, {} failed.", docs.len(), total_failed);
    Ok(())
}
