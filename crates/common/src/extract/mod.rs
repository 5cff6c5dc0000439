//! Text extraction for uploaded documents
//!
//! Plain text is decoded as UTF-8 (lossy). PDFs are parsed in memory with
//! lopdf: each page's content stream is scanned for text-showing operators,
//! falling back to lopdf's own font-aware extraction when the scan finds nothing.

use crate::errors::{AppError, Result};
use crate::models::DocumentKind;
use tracing::{debug, warn};

/// Extract normalised text from a document payload
pub fn extract_text(name: &str, kind: DocumentKind, bytes: &[u8]) -> Result<String> {
    let raw = match kind {
        DocumentKind::Text => String::from_utf8_lossy(bytes).into_owned(),
        DocumentKind::Pdf => extract_pdf_text(name, bytes)?,
    };

    let cleaned = clean_text(&raw);

    debug!(
        file = name,
        kind = kind.as_str(),
        original_len = raw.len(),
        cleaned_len = cleaned.len(),
        "Text extraction complete"
    );

    if cleaned.is_empty() {
        return Err(AppError::Extraction {
            name: name.to_string(),
            message: "No text content extracted".to_string(),
        });
    }

    Ok(cleaned)
}

fn extract_pdf_text(name: &str, bytes: &[u8]) -> Result<String> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| AppError::Extraction {
        name: name.to_string(),
        message: format!("Failed to load PDF: {}", e),
    })?;

    let pages = doc.get_pages();
    debug!(file = name, page_count = pages.len(), "Extracting text from PDF");

    let mut text = String::new();
    for (page_num, page_id) in pages.iter() {
        let page_text = match doc.get_page_content(*page_id) {
            Ok(content) => extract_text_from_content(&content),
            Err(e) => {
                warn!(file = name, page = page_num, error = %e, "Failed to read page content, skipping");
                continue;
            }
        };

        let page_text = if page_text.trim().is_empty() {
            doc.extract_text(&[*page_num]).unwrap_or_else(|e| {
                warn!(file = name, page = page_num, error = %e, "Failed to extract text from page, skipping");
                String::new()
            })
        } else {
            page_text
        };

        text.push_str(&page_text);
        text.push('\n');
    }

    Ok(text)
}

/// Extract text from a PDF content stream, looking at BT ... ET blocks
fn extract_text_from_content(content: &[u8]) -> String {
    let content_str = String::from_utf8_lossy(content);
    let mut text = String::new();
    let mut in_text_block = false;
    let mut current_text = String::new();

    for line in content_str.lines() {
        let trimmed = line.trim();

        if trimmed == "BT" {
            in_text_block = true;
            continue;
        }

        if trimmed == "ET" {
            in_text_block = false;
            if !current_text.is_empty() {
                text.push_str(&current_text);
                text.push(' ');
                current_text.clear();
            }
            continue;
        }

        if in_text_block {
            if let Some(shown) = extract_text_from_operator(trimmed) {
                current_text.push_str(&shown);
            }
        }
    }

    text
}

/// Text shown by a single Tj, TJ, ' or " operator line
fn extract_text_from_operator(line: &str) -> Option<String> {
    if line.ends_with("TJ") {
        let mut result = String::new();
        let mut depth = 0usize;
        let mut current = String::new();
        let mut escaped = false;

        for ch in line.chars() {
            if depth > 0 && escaped {
                current.push('\\');
                current.push(ch);
                escaped = false;
                continue;
            }
            match ch {
                '\\' if depth > 0 => escaped = true,
                '(' => {
                    if depth > 0 {
                        current.push(ch);
                    }
                    depth += 1;
                }
                ')' if depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        result.push_str(&decode_pdf_string(&current));
                        current.clear();
                    } else {
                        current.push(ch);
                    }
                }
                _ if depth > 0 => current.push(ch),
                _ => {}
            }
        }

        return (!result.is_empty()).then_some(result);
    }

    if line.ends_with("Tj") || line.ends_with('\'') || line.ends_with('"') {
        let start = line.find('(')?;
        let end = line.rfind(')')?;
        if end > start {
            return Some(decode_pdf_string(&line[start + 1..end]));
        }
    }

    None
}

/// Decode PDF string escapes
fn decode_pdf_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('b') | Some('f') => {}
            Some(d) if d.is_digit(8) => {
                let mut code = d.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(v) => {
                            code = code * 8 + v;
                            chars.next();
                        }
                        None => break,
                    }
                }
                if let Some(c) = char::from_u32(code) {
                    result.push(c);
                }
            }
            Some(c) => result.push(c),
            None => {}
        }
    }

    result
}

/// Collapse whitespace and strip common artifacts
fn clean_text(text: &str) -> String {
    text.replace('\u{FEFF}', "")
        .replace('\u{0}', "")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
