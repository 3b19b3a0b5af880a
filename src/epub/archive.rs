//! Byte lookup inside a package archive.

use std::collections::HashMap;
use std::io::{Read, Seek};

use percent_encoding::percent_decode_str;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{Error, Result};

/// Read-only access to archive entries by path.
pub trait Archive {
    /// Bytes of the entry at `path`. Missing entries are an error.
    fn read_bytes(&mut self, path: &str) -> Result<Vec<u8>>;
}

impl<R: Read + Seek> Archive for ZipArchive<R> {
    fn read_bytes(&mut self, path: &str) -> Result<Vec<u8>> {
        // Try direct lookup first
        match read_entry(self, path) {
            Err(Error::Zip(ZipError::FileNotFound)) => {}
            result => return result,
        }

        // Fallback: try percent-decoded path (handles malformed EPUBs)
        let decoded = percent_decode_str(path)
            .decode_utf8()
            .map_err(|_| Error::InvalidEpub(format!("Invalid UTF-8 in path: {path}")))?;
        if decoded == path {
            return Err(Error::Zip(ZipError::FileNotFound));
        }
        read_entry(self, &decoded)
    }
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<Vec<u8>> {
    let mut file = archive.by_name(path)?;
    let mut contents = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut contents)?;
    Ok(contents)
}

/// In-memory archive keyed by entry path.
impl Archive for HashMap<String, Vec<u8>> {
    fn read_bytes(&mut self, path: &str) -> Result<Vec<u8>> {
        self.get(path)
            .cloned()
            .ok_or(Error::Zip(ZipError::FileNotFound))
    }
}

/// Directory of the package document, with a trailing `/` (empty at the root).
pub fn package_dir(opf_path: &str) -> &str {
    match opf_path.rfind('/') {
        Some(i) => &opf_path[..=i],
        None => "",
    }
}

/// Resolve a manifest href against the package directory into an archive path.
///
/// The fragment and any leading `/` are removed, percent escapes decoded
/// (kept as written when they do not decode to UTF-8), backslashes turned
/// into `/`, and `.` / `..` segments applied. `..` never climbs above the
/// archive root.
pub fn resolve_zip_path(opf_dir: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or_default();
    let relative = href.trim_start_matches('/');
    let decoded = percent_decode_str(relative)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| relative.to_string());

    let joined = format!("{opf_dir}{decoded}").replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    segments.join("/")
}

/// Read an entry and decode it as text, honouring an XML encoding declaration.
pub fn read_text(archive: &mut dyn Archive, path: &str) -> Result<String> {
    let bytes = archive.read_bytes(path)?;
    Ok(crate::util::decode_document(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use zip::CompressionMethod;
    use zip::write::{SimpleFileOptions, ZipWriter};

    use super::*;

    fn zip_with(entries: &[(&str, &[u8])]) -> ZipArchive<Cursor<Vec<u8>>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        ZipArchive::new(Cursor::new(writer.finish().unwrap().into_inner())).unwrap()
    }

    #[test]
    fn test_package_dir() {
        assert_eq!(package_dir("OEBPS/content.opf"), "OEBPS/");
        assert_eq!(package_dir("a/b/package.opf"), "a/b/");
        assert_eq!(package_dir("content.opf"), "");
    }

    #[test]
    fn test_resolve_zip_path() {
        assert_eq!(resolve_zip_path("OEBPS/", "text/ch1.xhtml"), "OEBPS/text/ch1.xhtml");
        assert_eq!(resolve_zip_path("OEBPS/", "text/ch1.xhtml#part2"), "OEBPS/text/ch1.xhtml");
        assert_eq!(resolve_zip_path("OEBPS/", "/images/cover.jpg"), "OEBPS/images/cover.jpg");
        assert_eq!(resolve_zip_path("OEBPS/text/", "../images/a.png"), "OEBPS/images/a.png");
        assert_eq!(resolve_zip_path("OEBPS/", "./ch%201.xhtml"), "OEBPS/ch 1.xhtml");
        assert_eq!(resolve_zip_path("OEBPS\\", "text\\ch1.xhtml"), "OEBPS/text/ch1.xhtml");
        assert_eq!(resolve_zip_path("", "../../ch1.xhtml"), "ch1.xhtml");
        assert_eq!(resolve_zip_path("", "bad%FF.xhtml"), "bad%FF.xhtml");
    }

    #[test]
    fn test_zip_lookup() {
        let mut archive = zip_with(&[("OEBPS/ch 1.xhtml", b"<p>hi</p>")]);
        assert_eq!(archive.read_bytes("OEBPS/ch 1.xhtml").unwrap(), b"<p>hi</p>");
        // Percent-encoded lookups fall back to the decoded name
        assert_eq!(archive.read_bytes("OEBPS/ch%201.xhtml").unwrap(), b"<p>hi</p>");
        assert!(matches!(
            archive.read_bytes("OEBPS/missing.xhtml"),
            Err(Error::Zip(ZipError::FileNotFound))
        ));
    }

    #[test]
    fn test_read_text_decodes_declared_encoding() {
        let mut data = b"<?xml version=\"1.0\" encoding=\"windows-1252\"?><p>caf".to_vec();
        data.push(0xE9);
        data.extend_from_slice(b"</p>");
        let mut archive: HashMap<String, Vec<u8>> = HashMap::new();
        archive.insert("a.xhtml".into(), data);
        assert!(read_text(&mut archive, "a.xhtml").unwrap().contains("café"));
    }
}
