//! Byte-level helpers shared by the package and content layers.

use std::borrow::Cow;

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding (from `<?xml encoding="..."?>`)
/// 3. Falls back to Windows-1252 (common in old ebooks)
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Decode a content document, honouring the encoding named in its XML declaration.
pub fn decode_document(bytes: &[u8]) -> Cow<'_, str> {
    decode_text(bytes, extract_xml_encoding(bytes))
}

/// Extract encoding from XML declaration.
///
/// Parses `<?xml ... encoding="..." ?>` within the first 100 bytes.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let check_len = bytes.len().min(100);
    let prefix = &bytes[..check_len];

    let xml_start = prefix.windows(5).position(|w| w == b"<?xml")?;
    let after_xml = &prefix[xml_start..];

    let enc_pos = after_xml
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let after_enc = &after_xml[enc_pos + 9..];

    let quote = *after_enc.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }

    let value_end = after_enc[1..].iter().position(|&b| b == quote)? + 1;
    std::str::from_utf8(&after_enc[1..value_end]).ok()
}

/// Strip UTF-8 BOM if present.
pub fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data)
}

/// Guess an image MIME type from a path's extension, then from magic bytes.
///
/// Used when a manifest item does not declare its media type.
pub fn guess_image_mime(path: &str, data: &[u8]) -> &'static str {
    let path_lower = path.to_lowercase();

    if path_lower.ends_with(".png") {
        return "image/png";
    }
    if path_lower.ends_with(".jpg") || path_lower.ends_with(".jpeg") {
        return "image/jpeg";
    }
    if path_lower.ends_with(".gif") {
        return "image/gif";
    }
    if path_lower.ends_with(".webp") {
        return "image/webp";
    }
    if path_lower.ends_with(".svg") {
        return "image/svg+xml";
    }

    if data.starts_with(&[0xFF, 0xD8]) {
        return "image/jpeg";
    }
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        return "image/png";
    }
    if data.starts_with(b"GIF") {
        return "image/gif";
    }
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return "image/webp";
    }

    "application/octet-stream"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_text("Capítulo".as_bytes(), None), "Capítulo");
    }

    #[test]
    fn test_decode_windows_1252_fallback() {
        // 0xE9 is "é" in Windows-1252 and invalid as a lone UTF-8 byte
        let bytes = [b'c', b'a', b'f', 0xE9];
        assert_eq!(decode_text(&bytes, None), "café");
    }

    #[test]
    fn test_decode_document_uses_declared_encoding() {
        let mut bytes = br#"<?xml version="1.0" encoding="ISO-8859-1"?><p>"#.to_vec();
        bytes.push(0xE9);
        let decoded = decode_document(&bytes);
        assert!(decoded.ends_with("<p>é"));
    }

    #[test]
    fn test_extract_xml_encoding() {
        assert_eq!(
            extract_xml_encoding(br#"<?xml version="1.0" encoding="UTF-8"?>"#),
            Some("UTF-8")
        );
        assert_eq!(
            extract_xml_encoding(b"<?xml version='1.0' encoding='windows-1252'?>"),
            Some("windows-1252")
        );
        assert_eq!(extract_xml_encoding(b"<html><body></body></html>"), None);
        assert_eq!(extract_xml_encoding(b"<?xml version=\"1.0\" encoding="), None);
    }

    #[test]
    fn test_strip_bom() {
        assert_eq!(strip_bom(&[0xEF, 0xBB, 0xBF, b'h', b'i']), b"hi");
        assert_eq!(strip_bom(b"hello"), b"hello");
        assert_eq!(strip_bom(&[]), &[] as &[u8]);

        let partial = [0xEF, 0xBB, b'x'];
        assert_eq!(strip_bom(&partial), &partial);
    }

    #[test]
    fn test_guess_image_mime_by_extension() {
        assert_eq!(guess_image_mime("images/cover.PNG", &[]), "image/png");
        assert_eq!(guess_image_mime("cover.jpeg", &[]), "image/jpeg");
        assert_eq!(guess_image_mime("cover.svg", &[]), "image/svg+xml");
        assert_eq!(guess_image_mime("cover", &[]), "application/octet-stream");
    }

    #[test]
    fn test_guess_image_mime_by_magic_bytes() {
        assert_eq!(guess_image_mime("cover", &[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
        assert_eq!(
            guess_image_mime("cover", &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]),
            "image/png"
        );
        assert_eq!(guess_image_mime("cover", b"GIF89a"), "image/gif");
    }
}
