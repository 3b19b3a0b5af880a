//! In-memory EPUB packages for integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

/// A manifest item written into the package.
pub struct Item {
    pub id: String,
    pub href: String,
    pub media_type: String,
    pub properties: Option<String>,
    pub data: Vec<u8>,
    pub in_spine: bool,
    /// Archive path below `OEBPS/`, `None` to leave the file out.
    pub entry: Option<String>,
}

/// Builds an EPUB archive rooted at `OEBPS/content.opf`.
#[derive(Default)]
pub struct EpubBuilder {
    title: Option<String>,
    cover_meta: Option<String>,
    items: Vec<Item>,
    extra_spine: Vec<String>,
    container: Option<String>,
    skip_opf: bool,
}

impl EpubBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Add an XHTML content document to the manifest and spine.
    pub fn chapter(self, id: &str, href: &str, body: &str) -> Self {
        self.chapter_at(id, href, href, body)
    }

    /// Like [`chapter`](Self::chapter), stored under an archive path other than its href.
    pub fn chapter_at(mut self, id: &str, href: &str, entry: &str, body: &str) -> Self {
        self.items.push(Item {
            id: id.to_string(),
            href: href.to_string(),
            media_type: "application/xhtml+xml".to_string(),
            properties: None,
            data: xhtml(body).into_bytes(),
            in_spine: true,
            entry: Some(entry.to_string()),
        });
        self
    }

    /// Add a spine entry whose manifest item has no file in the archive.
    pub fn missing_chapter(mut self, id: &str, href: &str) -> Self {
        self.items.push(Item {
            id: id.to_string(),
            href: href.to_string(),
            media_type: "application/xhtml+xml".to_string(),
            properties: None,
            data: Vec::new(),
            in_spine: true,
            entry: None,
        });
        self
    }

    /// Add a spine `itemref` with no manifest item.
    pub fn dangling_itemref(mut self, idref: &str) -> Self {
        self.extra_spine.push(idref.to_string());
        self
    }

    pub fn image(mut self, id: &str, href: &str, media_type: &str, properties: Option<&str>, data: &[u8]) -> Self {
        self.items.push(Item {
            id: id.to_string(),
            href: href.to_string(),
            media_type: media_type.to_string(),
            properties: properties.map(str::to_string),
            data: data.to_vec(),
            in_spine: false,
            entry: Some(href.to_string()),
        });
        self
    }

    /// Add a manifest image whose file is not in the archive.
    pub fn missing_image(mut self, id: &str, href: &str, media_type: &str, properties: Option<&str>) -> Self {
        self.items.push(Item {
            id: id.to_string(),
            href: href.to_string(),
            media_type: media_type.to_string(),
            properties: properties.map(str::to_string),
            data: Vec::new(),
            in_spine: false,
            entry: None,
        });
        self
    }

    /// Add an EPUB 3 navigation document linking `(label, href)` pairs.
    pub fn nav(mut self, href: &str, links: &[(&str, &str)]) -> Self {
        let items: String = links
            .iter()
            .map(|(label, target)| format!(r#"<li><a href="{target}">{label}</a></li>"#))
            .collect();
        let body = format!(r#"<nav epub:type="toc" xmlns:epub="http://www.idpf.org/2007/ops"><ol>{items}</ol></nav>"#);
        self.items.push(Item {
            id: "nav".to_string(),
            href: href.to_string(),
            media_type: "application/xhtml+xml".to_string(),
            properties: Some("nav".to_string()),
            data: xhtml(&body).into_bytes(),
            in_spine: false,
            entry: Some(href.to_string()),
        });
        self
    }

    pub fn cover_meta(mut self, id: &str) -> Self {
        self.cover_meta = Some(id.to_string());
        self
    }

    pub fn container(mut self, xml: &str) -> Self {
        self.container = Some(xml.to_string());
        self
    }

    pub fn without_opf(mut self) -> Self {
        self.skip_opf = true;
        self
    }

    pub fn opf(&self) -> String {
        let mut metadata = String::new();
        if let Some(title) = &self.title {
            metadata.push_str(&format!("<dc:title>{title}</dc:title>"));
        }
        if let Some(id) = &self.cover_meta {
            metadata.push_str(&format!(r#"<meta name="cover" content="{id}"/>"#));
        }

        let manifest: String = self
            .items
            .iter()
            .map(|item| {
                let properties = item
                    .properties
                    .as_ref()
                    .map(|p| format!(r#" properties="{p}""#))
                    .unwrap_or_default();
                format!(
                    r#"<item id="{}" href="{}" media-type="{}"{properties}/>"#,
                    item.id, item.href, item.media_type
                )
            })
            .collect::<Vec<_>>()
            .join("\n    ");

        let spine: String = self
            .items
            .iter()
            .filter(|item| item.in_spine)
            .map(|item| item.id.clone())
            .chain(self.extra_spine.iter().cloned())
            .map(|id| format!(r#"<itemref idref="{id}"/>"#))
            .collect::<Vec<_>>()
            .join("\n    ");

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">{metadata}</metadata>
  <manifest>
    {manifest}
  </manifest>
  <spine>
    {spine}
  </spine>
</package>"#
        )
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        let deflate = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        zip.start_file("mimetype", stored).unwrap();
        zip.write_all(b"application/epub+zip").unwrap();

        let container = self.container.clone().unwrap_or_else(|| CONTAINER_XML.to_string());
        zip.start_file("META-INF/container.xml", deflate).unwrap();
        zip.write_all(container.as_bytes()).unwrap();

        if !self.skip_opf {
            zip.start_file("OEBPS/content.opf", deflate).unwrap();
            zip.write_all(self.opf().as_bytes()).unwrap();
        }

        for item in &self.items {
            let Some(entry) = &item.entry else {
                continue;
            };
            zip.start_file(format!("OEBPS/{entry}"), deflate).unwrap();
            zip.write_all(&item.data).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }
}

/// Wrap body markup in an XHTML document.
pub fn xhtml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Test</title></head>
<body>
{body}
</body>
</html>"#
    )
}
