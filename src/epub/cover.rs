//! Cover image lookup.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use super::archive::{Archive, resolve_zip_path};
use super::parser::{ManifestItem, Package};
use crate::util::guess_image_mime;

/// Find the cover item of a package.
///
/// Tried in order, the first strategy naming a manifest item wins:
/// the `<meta name="cover">` id, an item with the `cover-image` property,
/// then an image item whose id or href mentions "cover".
pub fn find_cover_item(package: &Package) -> Option<&ManifestItem> {
    if let Some(item) = package.cover_meta.as_deref().and_then(|id| package.item(id)) {
        return Some(item);
    }

    if let Some(item) = package.manifest.iter().find(|item| item.has_property("cover-image")) {
        return Some(item);
    }

    package.manifest.iter().find(|item| {
        item.is_image()
            && (item.id.to_lowercase().contains("cover") || item.href.to_lowercase().contains("cover"))
    })
}

/// Load the cover image as a `data:` URL.
///
/// Returns `None` when the package has no cover or its bytes cannot be read.
pub fn resolve_cover(package: &Package, opf_dir: &str, archive: &mut dyn Archive) -> Option<String> {
    let item = find_cover_item(package)?;

    let path = resolve_zip_path(opf_dir, &item.href);
    let data = match archive.read_bytes(&path) {
        Ok(data) => data,
        Err(first) => match archive.read_bytes(&item.href) {
            Ok(data) => data,
            Err(e) => {
                debug!(id = %item.id, %path, error = %first, fallback_error = %e, "cover image not readable");
                return None;
            }
        },
    };

    let media_type = if item.media_type.trim().is_empty() {
        guess_image_mime(&item.href, &data)
    } else {
        item.media_type.trim()
    };

    Some(format!("data:{media_type};base64,{}", STANDARD.encode(&data)))
}
