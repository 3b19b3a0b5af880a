//! EPUB package parsing (container.xml, OPF)

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};
use crate::util::strip_bom;

/// A manifest entry of the package document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManifestItem {
    pub id: String,
    pub href: String,
    pub media_type: String,
    /// Whitespace separated EPUB 3 properties, empty when absent.
    pub properties: String,
}

impl ManifestItem {
    /// True if `name` is one of the item's properties.
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.split_ascii_whitespace().any(|p| p == name)
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// The parts of an OPF package document used to read a book.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Package {
    /// First `dc:title`, untrimmed. Empty when the metadata has none.
    pub title: String,
    /// Manifest items in document order.
    pub manifest: Vec<ManifestItem>,
    /// `idref`s of the spine in reading order.
    pub spine: Vec<String>,
    /// Id named by `<meta name="cover" content=".."/>`.
    pub cover_meta: Option<String>,
    /// Id of the NCX named by `<spine toc="..">`.
    pub toc_id: Option<String>,
}

impl Package {
    /// Look up a manifest item by id.
    pub fn item(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.iter().find(|item| item.id == id)
    }
}

/// Parse META-INF/container.xml to find the OPF path.
pub fn parse_container_xml(bytes: &[u8]) -> Result<String> {
    let content = String::from_utf8(strip_bom(bytes).to_vec())?;

    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if local_name(e.name().as_ref()) == b"rootfile" => {
                if let Some(path) = attr_value(&e, b"full-path")?
                    && !path.is_empty()
                {
                    return Ok(path);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Err(Error::InvalidEpub("OPF path not found".into()))
}

/// Parse OPF package document.
pub fn parse_opf(content: &str) -> Result<Package> {
    // Text is only collected inside the title, where inner spaces matter
    let mut reader = Reader::from_str(content);

    let mut package = Package::default();
    let mut seen_package = false;
    let mut in_metadata = false;
    let mut in_title = false;
    let mut title_done = false;
    let mut buf_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"package" => seen_package = true,
                    b"metadata" => in_metadata = true,
                    b"title" if in_metadata && !title_done => {
                        in_title = true;
                        buf_text.clear();
                    }
                    b"spine" => read_spine_toc(&mut package, &e)?,
                    b"item" => push_manifest_item(&mut package, &e)?,
                    b"itemref" => push_itemref(&mut package, &e)?,
                    b"meta" => read_cover_meta(&mut package, &e)?,
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"spine" => read_spine_toc(&mut package, &e)?,
                    b"item" => push_manifest_item(&mut package, &e)?,
                    b"itemref" => push_itemref(&mut package, &e)?,
                    b"meta" => read_cover_meta(&mut package, &e)?,
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if in_title {
                    buf_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::CData(e)) => {
                if in_title {
                    buf_text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if in_title {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        buf_text.push_str(&resolved);
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"metadata" => in_metadata = false,
                    b"title" if in_title => {
                        package.title = std::mem::take(&mut buf_text);
                        in_title = false;
                        title_done = true;
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    if !seen_package {
        return Err(Error::MissingElement("package".into()));
    }

    Ok(package)
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

fn push_manifest_item(package: &mut Package, e: &BytesStart<'_>) -> Result<()> {
    let id = attr_value(e, b"id")?.unwrap_or_default();
    let href = attr_value(e, b"href")?.unwrap_or_default();
    if id.is_empty() || href.is_empty() {
        return Ok(());
    }
    package.manifest.push(ManifestItem {
        id,
        href,
        media_type: attr_value(e, b"media-type")?.unwrap_or_default(),
        properties: attr_value(e, b"properties")?.unwrap_or_default(),
    });
    Ok(())
}

fn push_itemref(package: &mut Package, e: &BytesStart<'_>) -> Result<()> {
    if let Some(idref) = attr_value(e, b"idref")?
        && !idref.is_empty()
    {
        package.spine.push(idref);
    }
    Ok(())
}

fn read_spine_toc(package: &mut Package, e: &BytesStart<'_>) -> Result<()> {
    package.toc_id = attr_value(e, b"toc")?.filter(|id| !id.is_empty());
    Ok(())
}

fn read_cover_meta(package: &mut Package, e: &BytesStart<'_>) -> Result<()> {
    if package.cover_meta.is_some() {
        return Ok(());
    }
    if attr_value(e, b"name")?.as_deref() == Some("cover")
        && let Some(content) = attr_value(e, b"content")?
        && !content.is_empty()
    {
        package.cover_meta = Some(content);
    }
    Ok(())
}

/// Value of the attribute whose local name is `key`, with entities unescaped.
pub(super) fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes().flatten() {
        if local_name(attr.key.as_ref()) == key {
            let raw = String::from_utf8(attr.value.to_vec())?;
            return Ok(Some(unescape_attr(&raw)));
        }
    }
    Ok(None)
}

/// Resolve entity references in an attribute value, leaving unknown ones as written.
fn unescape_attr(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail.find(';') {
            Some(end) => match resolve_entity(&tail[1..end]) {
                Some(resolved) => {
                    out.push_str(&resolved);
                    rest = &tail[end + 1..];
                }
                None => {
                    out.push('&');
                    rest = &tail[1..];
                }
            },
            None => {
                out.push_str(tail);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Extract local name from namespaced XML name (e.g., "dc:title" -> "title").
pub(super) fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

/// Resolve XML entity references.
pub(super) fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        None
    };

    code.and_then(char::from_u32).map(|c| c.to_string())
}
