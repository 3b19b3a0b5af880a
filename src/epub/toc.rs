//! Table of contents discovery: the EPUB 3 nav document, then the EPUB 2 NCX.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use super::archive::{Archive, package_dir, read_text, resolve_zip_path};
use super::parser::{ManifestItem, Package, attr_value, local_name, resolve_entity};
use crate::chapters::TocTarget;
use crate::dom::Document;
use crate::error::{Error, Result};

const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// Where the table of contents was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TocKind {
    Nav,
    Ncx,
}

/// A labelled link of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TocEntry {
    pub title: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toc {
    pub kind: TocKind,
    /// Entries in reading order, nested entries after their parent.
    pub entries: Vec<TocEntry>,
    /// Directory of the table of contents file, which entry hrefs are relative to.
    pub base_dir: String,
}

impl Toc {
    /// Entries resolved to archive paths and fragments.
    pub fn targets(&self) -> Vec<TocTarget> {
        self.entries
            .iter()
            .map(|entry| {
                let (file, fragment) = match entry.href.split_once('#') {
                    Some((file, fragment)) => (file, Some(fragment)),
                    None => (entry.href.as_str(), None),
                };
                TocTarget {
                    title: entry.title.trim().to_string(),
                    href: entry.href.clone(),
                    path: resolve_zip_path(&self.base_dir, file),
                    fragment: fragment.filter(|f| !f.is_empty()).map(str::to_string),
                }
            })
            .collect()
    }
}

/// The nav document: the item with the `nav` property, else an XHTML item named like one.
pub fn find_nav_item(package: &Package) -> Option<&ManifestItem> {
    package
        .manifest
        .iter()
        .find(|item| item.has_property("nav"))
        .or_else(|| {
            package.manifest.iter().find(|item| {
                item.media_type == "application/xhtml+xml" && item.href.to_lowercase().contains("nav")
            })
        })
}

/// The NCX: the item named by the spine's `toc` attribute, else the first NCX item.
pub fn find_ncx_item(package: &Package) -> Option<&ManifestItem> {
    package
        .toc_id
        .as_deref()
        .and_then(|id| package.item(id))
        .or_else(|| package.manifest.iter().find(|item| item.media_type == NCX_MEDIA_TYPE))
}

/// Links of the table of contents `<nav>` of a nav document.
///
/// The nav typed `toc` (`epub:type`, then `type`) is preferred, else the first
/// nav of the document. Links without an href are left out.
pub fn parse_nav_document(doc: &Document) -> Vec<TocEntry> {
    let dom = doc.dom();
    let navs: Vec<_> = dom
        .descendant_elements(dom.document())
        .filter(|&id| dom.tag(id) == Some("nav"))
        .collect();
    let typed_toc = |attr: &str| {
        navs.iter()
            .copied()
            .find(|&id| dom.get_attr(id, attr).is_some_and(|v| v.trim() == "toc"))
    };

    let Some(nav) = typed_toc("epub:type")
        .or_else(|| typed_toc("type"))
        .or_else(|| navs.first().copied())
    else {
        return Vec::new();
    };

    dom.descendant_elements(nav)
        .filter(|&id| dom.tag(id) == Some("a"))
        .filter_map(|id| {
            let href = dom.get_attr(id, "href").filter(|href| !href.is_empty())?;
            Some(TocEntry {
                title: dom.trimmed_text(id),
                href: href.to_string(),
            })
        })
        .collect()
}

/// Parse the `navMap` of an NCX document, depth first.
pub fn parse_ncx(content: &str) -> Result<Vec<TocEntry>> {
    let mut reader = Reader::from_str(content);

    let mut entries: Vec<TocEntry> = Vec::new();
    // Slot in `entries` of every open navPoint
    let mut open: Vec<usize> = Vec::new();
    let mut in_nav_map = false;
    let mut in_label = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"navMap" => in_nav_map = true,
                    b"navPoint" if in_nav_map => {
                        open.push(entries.len());
                        entries.push(TocEntry::default());
                    }
                    b"navLabel" if !open.is_empty() => in_label = true,
                    b"text" if in_label => in_text = true,
                    b"content" => set_content_src(&mut entries, &open, &e)?,
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                if local_name(e.name().as_ref()) == b"content" {
                    set_content_src(&mut entries, &open, &e)?;
                }
            }
            Ok(Event::Text(e)) if in_text => {
                if let Some(entry) = open.last().and_then(|&slot| entries.get_mut(slot)) {
                    entry.title.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::CData(e)) if in_text => {
                if let Some(entry) = open.last().and_then(|&slot| entries.get_mut(slot)) {
                    entry.title.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::GeneralRef(e)) if in_text => {
                let entity = String::from_utf8_lossy(e.as_ref());
                if let Some(resolved) = resolve_entity(&entity)
                    && let Some(entry) = open.last().and_then(|&slot| entries.get_mut(slot))
                {
                    entry.title.push_str(&resolved);
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"navMap" => in_nav_map = false,
                    b"navPoint" => {
                        open.pop();
                    }
                    b"navLabel" => in_label = false,
                    b"text" => in_text = false,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    entries.retain(|entry| !entry.href.is_empty());
    for entry in &mut entries {
        entry.title = entry.title.trim().to_string();
    }
    Ok(entries)
}

fn set_content_src(entries: &mut [TocEntry], open: &[usize], e: &BytesStart<'_>) -> Result<()> {
    if let Some(entry) = open.last().and_then(|&slot| entries.get_mut(slot))
        && entry.href.is_empty()
        && let Some(src) = attr_value(e, b"src")?
    {
        entry.href = src;
    }
    Ok(())
}

/// Read the table of contents of a package.
///
/// Returns `None` when neither a nav document nor an NCX yields an entry.
/// Unreadable or malformed files are logged and passed over.
pub fn read_toc(archive: &mut dyn Archive, package: &Package, opf_dir: &str) -> Option<Toc> {
    if let Some(item) = find_nav_item(package) {
        let path = resolve_zip_path(opf_dir, &item.href);
        match archive.read_bytes(&path) {
            Ok(bytes) => {
                let entries = parse_nav_document(&Document::from_bytes(&bytes));
                if !entries.is_empty() {
                    return Some(Toc {
                        kind: TocKind::Nav,
                        entries,
                        base_dir: package_dir(&path).to_string(),
                    });
                }
                debug!(%path, "nav document lists no entries");
            }
            Err(e) => debug!(%path, error = %e, "nav document not readable"),
        }
    }

    if let Some(item) = find_ncx_item(package) {
        let path = resolve_zip_path(opf_dir, &item.href);
        match read_text(archive, &path).and_then(|text| parse_ncx(&text)) {
            Ok(entries) if !entries.is_empty() => {
                return Some(Toc {
                    kind: TocKind::Ncx,
                    entries,
                    base_dir: package_dir(&path).to_string(),
                });
            }
            Ok(_) => debug!(%path, "NCX lists no entries"),
            Err(e) => debug!(%path, error = %e, "NCX not readable"),
        }
    }

    None
}
