//! Fixed-window character chunker with overlap.
//!
//! Text is cut into windows of `chunk_size` characters; each window starts
//! `chunk_size - overlap` characters after the previous one. Windows are
//! trimmed and whitespace-only windows are skipped. Indices are computed in
//! chars, never bytes, so multi-byte text cannot split a code point.

/// Splits `text` into overlapping chunks. Requires `overlap < chunk_size`.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.trim().chars().collect();
    let mut chunks = Vec::new();
    if chunk_size == 0 || overlap >= chunk_size {
        return chunks;
    }

    let mut start = 0usize;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        let window: String = chars[start..end].iter().collect();
        let trimmed = window.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
        if end == chars.len() {
            break;
        }
        start = end - overlap;
    }

    chunks
}
