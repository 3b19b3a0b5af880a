//! Plain-text helpers for chapter content.
//!
//! Chapter content is plain text with paragraphs separated by one blank line.

/// Separator between paragraphs of chapter content.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Normalize `\r\n` and lone `\r` line endings to `\n`.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Split text into trimmed, non-empty paragraphs on runs of blank lines.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let normalized = normalize_newlines(text);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut pending_newlines = 0;

    for c in normalized.chars() {
        if c == '\n' {
            pending_newlines += 1;
            continue;
        }
        if pending_newlines >= 2 {
            push_trimmed(&mut paragraphs, &current);
            current.clear();
        } else if pending_newlines == 1 {
            current.push('\n');
        }
        pending_newlines = 0;
        current.push(c);
    }
    push_trimmed(&mut paragraphs, &current);
    paragraphs
}

fn push_trimmed(paragraphs: &mut Vec<String>, paragraph: &str) {
    let trimmed = paragraph.trim();
    if !trimmed.is_empty() {
        paragraphs.push(trimmed.to_string());
    }
}

/// Canonical form of chapter text: normalized line endings, trimmed
/// paragraphs, exactly one blank line between paragraphs.
pub fn canonicalize(text: &str) -> String {
    split_paragraphs(text).join(PARAGRAPH_SEPARATOR)
}

/// FNV-1a 32-bit hash over the UTF-16 code units of `text`, as lowercase hex.
pub fn fnv1a32_hex(text: &str) -> String {
    let mut hash: u32 = 0x811c_9dc5;
    for unit in text.encode_utf16() {
        hash ^= u32::from(unit);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    format!("{hash:08x}")
}

/// Stable content fingerprint, e.g. `fnv1a32:4f9f2cab`.
pub fn content_hash(text: &str) -> String {
    format!("fnv1a32:{}", fnv1a32_hex(text))
}
