use std::io::{Read, Seek};
use std::path::Path;

use tracing::{debug, info};
use zip::ZipArchive;
use zip::result::ZipError;

use super::archive::{Archive, package_dir, read_text, resolve_zip_path};
use super::cover::resolve_cover;
use super::parser::{parse_container_xml, parse_opf};
use super::toc::read_toc;
use crate::book::{Book, SpineItem};
use crate::chapters::{
    ChapterAssembler, Diagnostic, Diagnostics, HeadingClassifier, TracingDiagnostics, assemble_toc,
};
use crate::dom::Document;
use crate::error::{Error, Result};

const CONTAINER_PATH: &str = "META-INF/container.xml";

/// How a book is split into chapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChapterStrategy {
    /// Split every spine item at its chapter headings.
    #[default]
    Headings,
    /// Split at the table of contents entries, falling back to
    /// [`Headings`](Self::Headings) when that yields no chapter.
    TableOfContents,
}

/// Options for reading a book.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Decides which headings start a chapter.
    pub classifier: HeadingClassifier,
    pub strategy: ChapterStrategy,
    /// Load the cover image into [`Book::cover`].
    pub extract_cover: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            classifier: HeadingClassifier::default(),
            strategy: ChapterStrategy::default(),
            extract_cover: true,
        }
    }
}

impl ReadOptions {
    pub fn with_classifier(mut self, classifier: HeadingClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_strategy(mut self, strategy: ChapterStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn without_cover(mut self) -> Self {
        self.extract_cover = false;
        self
    }
}

/// Read an EPUB file from disk into a [`Book`].
///
/// The file name without its `.epub` extension is the title of books whose
/// metadata has none.
///
/// # Example
///
/// ```no_run
/// let book = shiori::open_book("path/to/book.epub")?;
/// for chapter in &book.chapters {
///     println!("{}: {}", chapter.id, chapter.title);
/// }
/// # Ok::<(), shiori::Error>(())
/// ```
pub fn open_book<P: AsRef<Path>>(path: P) -> Result<Book> {
    open_book_with(path, &ReadOptions::default())
}

/// [`open_book`] with explicit options.
pub fn open_book_with<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<Book> {
    let path = path.as_ref();
    info!(path = %path.display(), "opening book");
    let file = std::fs::File::open(path)?;
    read_book_with(file, &file_title(path), options)
}

/// Read an EPUB from any [`Read`] + [`Seek`] source.
///
/// `fallback_title` is used when the package metadata has no title.
pub fn read_book<R: Read + Seek>(reader: R, fallback_title: &str) -> Result<Book> {
    read_book_with(reader, fallback_title, &ReadOptions::default())
}

/// [`read_book`] with explicit options.
pub fn read_book_with<R: Read + Seek>(
    reader: R,
    fallback_title: &str,
    options: &ReadOptions,
) -> Result<Book> {
    let mut archive = ZipArchive::new(reader)?;
    read_archive(&mut archive, fallback_title, options, &mut TracingDiagnostics)
}

/// Read a book from an already opened archive, reporting assembly diagnostics to `diagnostics`.
pub fn read_archive(
    archive: &mut dyn Archive,
    fallback_title: &str,
    options: &ReadOptions,
    diagnostics: &mut dyn Diagnostics,
) -> Result<Book> {
    // 1. Find the OPF file path from container.xml
    let container = archive.read_bytes(CONTAINER_PATH).map_err(|e| match e {
        Error::Zip(ZipError::FileNotFound) => Error::InvalidEpub("container.xml not found".into()),
        other => other,
    })?;
    let opf_path = parse_container_xml(&container)?;
    let opf_dir = package_dir(&opf_path);

    // 2. Parse the OPF file
    let opf_content = read_text(archive, &opf_path).map_err(|e| match e {
        Error::Zip(ZipError::FileNotFound) => Error::InvalidEpub("OPF file not found".into()),
        other => other,
    })?;
    let package = parse_opf(&opf_content)?;

    let title = match package.title.trim() {
        "" => fallback_title.to_string(),
        title => title.to_string(),
    };

    // 3. Resolve the reading order
    let mut spine = Vec::with_capacity(package.spine.len());
    for idref in &package.spine {
        match package.item(idref) {
            Some(item) => spine.push(SpineItem::new(
                &item.id,
                &item.href,
                resolve_zip_path(opf_dir, &item.href),
            )),
            None => diagnostics.report(Diagnostic::UnknownItemref {
                idref: idref.clone(),
            }),
        }
    }
    debug!(
        %opf_path,
        manifest = package.manifest.len(),
        spine = spine.len(),
        "parsed package"
    );

    // 4. Assemble chapters
    let toc = match options.strategy {
        ChapterStrategy::TableOfContents => read_toc(archive, &package, opf_dir),
        ChapterStrategy::Headings => None,
    };
    let mut source = |path: &str| -> Result<Document> {
        let bytes = archive.read_bytes(path)?;
        Ok(Document::from_bytes(&bytes))
    };

    let mut chapters = Vec::new();
    if let Some(toc) = &toc {
        chapters = assemble_toc(&toc.targets(), &mut source, diagnostics);
        info!(
            kind = ?toc.kind,
            entries = toc.entries.len(),
            chapters = chapters.len(),
            "split by table of contents"
        );
    }
    if chapters.is_empty() {
        let assembler = ChapterAssembler::new(options.classifier.clone());
        chapters = assembler.assemble(&spine, &mut source, diagnostics)?;
    }

    // 5. Cover
    let cover = if options.extract_cover {
        resolve_cover(&package, opf_dir, archive)
    } else {
        None
    };

    info!(%title, chapters = chapters.len(), cover = cover.is_some(), "read book");

    Ok(Book {
        title,
        chapters,
        cover,
    })
}

/// File name of `path` with a trailing `.epub` removed.
fn file_title(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.strip_suffix(".epub") {
        Some(stem) => stem.to_string(),
        None => name,
    }
}
