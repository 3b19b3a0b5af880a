//! EPUB packages: container, package document, archive access, cover and table of contents.

pub mod archive;
pub mod cover;
pub mod parser;
mod reader;
pub mod toc;

pub use archive::{Archive, package_dir, resolve_zip_path};
pub use cover::{find_cover_item, resolve_cover};
pub use parser::{ManifestItem, Package, parse_container_xml, parse_opf};
pub use reader::{
    ChapterStrategy, ReadOptions, open_book, open_book_with, read_archive, read_book, read_book_with,
};
pub use toc::{Toc, TocEntry, TocKind, read_toc};
