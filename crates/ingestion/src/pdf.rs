//! PDF text extraction
//!
//! Walks page content streams and collects text-showing operators.
//! Embedded images, form fields, and other non-textual objects never
//! appear in the walk, so they are stripped by construction. Pages that
//! fail to parse are skipped so one bad page does not sink a document.

use crate::errors::IngestionError;
use tracing::{debug, warn};

/// Extract text from in-memory PDF bytes
pub fn extract_text(name: &str, bytes: &[u8]) -> Result<String, IngestionError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| IngestionError::PdfParse {
        name: name.to_string(),
        message: format!("failed to load PDF: {}", e),
    })?;

    let mut text = String::new();
    let mut page_count = 0_usize;

    for (index, page_id) in doc.page_iter().enumerate() {
        page_count += 1;
        match doc.get_page_content(page_id) {
            Ok(content) => {
                let page_text = content_stream_text(&content);
                if !page_text.trim().is_empty() {
                    text.push_str(&page_text);
                    text.push_str("\n\n");
                }
            }
            Err(e) => {
                warn!(
                    document = name,
                    page = index + 1,
                    error = %e,
                    "Failed to read page content, skipping"
                );
            }
        }
    }

    debug!(
        document = name,
        page_count,
        extracted_len = text.len(),
        "PDF text extraction complete"
    );

    if text.trim().is_empty() {
        return Err(IngestionError::PdfParse {
            name: name.to_string(),
            message: "no text content extracted".to_string(),
        });
    }

    Ok(text)
}

/// Collect text from one page's content stream
///
/// Text lives between BT and ET operators, shown via Tj, TJ and the
/// quote operators.
fn content_stream_text(content: &[u8]) -> String {
    let content_str = String::from_utf8_lossy(content);
    let mut text = String::new();
    let mut in_text_block = false;

    for line in content_str.lines() {
        let trimmed = line.trim();

        match trimmed {
            "BT" => in_text_block = true,
            "ET" => {
                in_text_block = false;
                // Text blocks usually correspond to lines or runs
                if !text.ends_with('\n') && !text.is_empty() {
                    text.push('\n');
                }
            }
            _ if in_text_block => {
                if let Some(run) = operator_text(trimmed) {
                    text.push_str(&run);
                    text.push(' ');
                }
            }
            _ => {}
        }
    }

    text
}

/// Extract the string argument of a text-showing operator
fn operator_text(line: &str) -> Option<String> {
    // (text) Tj, (text) ' and (text) "
    if line.ends_with("Tj") || line.ends_with('\'') || line.ends_with('"') {
        let start = line.find('(')?;
        let end = line.rfind(')')?;
        if start < end {
            return Some(unescape_pdf_string(&line[start + 1..end]));
        }
        return None;
    }

    // [(text) kern (text) ...] TJ
    if line.ends_with("TJ") {
        let mut result = String::new();
        let mut in_paren = false;
        let mut current = String::new();

        for ch in line.chars() {
            match ch {
                '(' if !in_paren => in_paren = true,
                ')' if in_paren => {
                    in_paren = false;
                    result.push_str(&unescape_pdf_string(&current));
                    current.clear();
                }
                _ if in_paren => current.push(ch),
                _ => {}
            }
        }

        if !result.is_empty() {
            return Some(result);
        }
    }

    None
}

/// Decode PDF literal-string escapes
fn unescape_pdf_string(s: &str) -> String {
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
            Some(d @ '0'..='7') => {
                // Octal escape, up to three digits
                let mut code = d.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
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
