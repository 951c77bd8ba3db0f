//! Image reference normalization.
//!
//! An image-bearing field in the authoring state can hold an inline data-URI,
//! a remote URL, or an already-canonical store path. Normalization turns each
//! of these into one of three outcomes:
//!
//! - [`Normalized::AlreadyStored`] — the reference is a store path already;
//!   returned unchanged so re-serializing a saved document is a no-op
//! - [`Normalized::Asset`] — canonical bytes, MIME and digest, ready for
//!   [`AssetStore::put`](crate::AssetStore::put)
//! - [`Normalized::Missing`] — nothing to store (empty field, failed fetch,
//!   undecodable payload); never a hard error, so one broken reference
//!   cannot abort a save
//!
//! Non-PNG rasters are re-encoded to PNG opportunistically; any decode or
//! encode failure keeps the original bytes unmodified. Vector payloads (SVG)
//! are never re-encoded.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::{debug, warn};

use fabula_types::AssetDigest;

use crate::path::is_store_path;

/// Classification of a raw image reference string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource<'a> {
    /// Empty field: nothing to store.
    Empty,
    /// Already a canonical or legacy store path.
    StorePath(&'a str),
    /// Inline `data:<mime>;base64,<payload>` reference.
    DataUri { mime: &'a str, payload: &'a str },
    /// Remote `http(s)://` URL to fetch.
    Remote(&'a str),
    /// Unrecognized text; treated as missing.
    Opaque(&'a str),
}

impl<'a> ImageSource<'a> {
    /// Classify a raw reference string.
    pub fn classify(value: &'a str) -> Self {
        let value = value.trim();
        if value.is_empty() {
            return Self::Empty;
        }
        if is_store_path(value) {
            return Self::StorePath(value);
        }
        if let Some(rest) = value.strip_prefix("data:") {
            if let Some((mime, payload)) = rest.split_once(";base64,") {
                return Self::DataUri { mime, payload };
            }
            return Self::Opaque(value);
        }
        if value.starts_with("http://") || value.starts_with("https://") {
            return Self::Remote(value);
        }
        Self::Opaque(value)
    }
}

/// Canonical bytes for a single asset, ready to be written to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedAsset {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub ext: &'static str,
    pub digest: AssetDigest,
}

impl NormalizedAsset {
    /// Build from raw bytes and a declared MIME, applying the opportunistic
    /// PNG re-encode and computing the content digest over the final bytes.
    pub fn from_bytes(bytes: Vec<u8>, mime: &str) -> Self {
        let (bytes, mime) = match reencode_to_png(&bytes, mime) {
            Some(png) => (png, "image/png".to_string()),
            None => (bytes, mime.to_string()),
        };
        let digest = AssetDigest::from_bytes(&bytes);
        let ext = mime_to_ext(&mime);
        Self {
            bytes,
            mime,
            ext,
            digest,
        }
    }

    /// Byte length of the canonical payload.
    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Re-encode the canonical bytes as a displayable data URI.
    pub fn to_data_uri(&self) -> String {
        encode_data_uri(&self.mime, &self.bytes)
    }
}

/// Outcome of normalizing one image reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Normalized {
    /// The reference was already a store path; returned verbatim.
    AlreadyStored(String),
    /// Canonical bytes ready to store.
    Asset(NormalizedAsset),
    /// No asset (empty, unfetchable, or undecodable).
    Missing,
}

/// A fetched remote image: payload plus the MIME the server declared, if any.
#[derive(Clone, Debug)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

/// Fetches remote image URLs during a save.
///
/// Returns `None` on any failure; a broken remote reference degrades the one
/// field, never the save.
pub trait RemoteFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Option<FetchedImage>;
}

/// HTTP fetcher over a blocking reqwest client.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Option<FetchedImage> {
        let response = match self.client.get(url).send() {
            Ok(r) => r,
            Err(e) => {
                warn!(url, error = %e, "remote image fetch failed");
                return None;
            }
        };
        if !response.status().is_success() {
            warn!(url, status = %response.status(), "remote image fetch rejected");
            return None;
        }
        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());
        let bytes = match response.bytes() {
            Ok(b) => b.to_vec(),
            Err(e) => {
                warn!(url, error = %e, "remote image body read failed");
                return None;
            }
        };
        Some(FetchedImage { bytes, mime })
    }
}

/// Fetcher that never resolves anything. Used when the environment has no
/// network access and in tests.
pub struct OfflineFetcher;

impl RemoteFetcher for OfflineFetcher {
    fn fetch(&self, url: &str) -> Option<FetchedImage> {
        debug!(url, "offline fetcher: treating remote image as missing");
        None
    }
}

/// Normalize one image reference string.
pub fn normalize(value: &str, fetcher: &dyn RemoteFetcher) -> Normalized {
    match ImageSource::classify(value) {
        ImageSource::Empty => Normalized::Missing,
        ImageSource::StorePath(path) => Normalized::AlreadyStored(path.to_string()),
        ImageSource::DataUri { mime, payload } => match BASE64.decode(payload.trim()) {
            Ok(bytes) => Normalized::Asset(NormalizedAsset::from_bytes(bytes, mime)),
            Err(e) => {
                warn!(mime, error = %e, "undecodable data URI, treating as missing");
                Normalized::Missing
            }
        },
        ImageSource::Remote(url) => match fetcher.fetch(url) {
            Some(fetched) => {
                let mime = fetched
                    .mime
                    .unwrap_or_else(|| guess_mime(&fetched.bytes).to_string());
                Normalized::Asset(NormalizedAsset::from_bytes(fetched.bytes, &mime))
            }
            None => Normalized::Missing,
        },
        ImageSource::Opaque(text) => {
            debug!(value = text, "unrecognized image reference, treating as missing");
            Normalized::Missing
        }
    }
}

/// Encode bytes as a `data:<mime>;base64,` URI.
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

/// File extension for a MIME type.
pub fn mime_to_ext(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        _ => "bin",
    }
}

/// MIME type for a stored file extension.
pub fn ext_to_mime(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn guess_mime(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Png) => "image/png",
        Ok(image::ImageFormat::Jpeg) => "image/jpeg",
        Ok(image::ImageFormat::Gif) => "image/gif",
        Ok(image::ImageFormat::WebP) => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Re-encode a non-PNG raster to PNG. Returns `None` when the input is
/// already PNG, is vector, or cannot be decoded (keep the original bytes).
fn reencode_to_png(bytes: &[u8], mime: &str) -> Option<Vec<u8>> {
    if mime == "image/png" || mime == "image/svg+xml" {
        return None;
    }
    let decoded = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(e) => {
            debug!(mime, error = %e, "raster decode failed, keeping original bytes");
            return None;
        }
    };
    let mut out = Cursor::new(Vec::new());
    match decoded.write_to(&mut out, image::ImageFormat::Png) {
        Ok(()) => Some(out.into_inner()),
        Err(e) => {
            debug!(mime, error = %e, "png re-encode failed, keeping original bytes");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Smallest valid 1x1 PNG.
    const PNG_1X1: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x62, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    #[test]
    fn classify_variants() {
        assert_eq!(ImageSource::classify("  "), ImageSource::Empty);
        assert_eq!(
            ImageSource::classify("Assets/Personajes/ab.png"),
            ImageSource::StorePath("Assets/Personajes/ab.png")
        );
        assert_eq!(
            ImageSource::classify("data:image/png;base64,AAAA"),
            ImageSource::DataUri {
                mime: "image/png",
                payload: "AAAA"
            }
        );
        assert_eq!(
            ImageSource::classify("https://example.com/a.png"),
            ImageSource::Remote("https://example.com/a.png")
        );
        assert_eq!(
            ImageSource::classify("not an image"),
            ImageSource::Opaque("not an image")
        );
    }

    #[test]
    fn store_paths_pass_through_unchanged() {
        let path = "Assets/Momentos/abcd.png";
        assert_eq!(
            normalize(path, &OfflineFetcher),
            Normalized::AlreadyStored(path.to_string())
        );
    }

    #[test]
    fn png_data_uri_decodes_without_reencoding() {
        let uri = encode_data_uri("image/png", PNG_1X1);
        let Normalized::Asset(asset) = normalize(&uri, &OfflineFetcher) else {
            panic!("expected asset");
        };
        assert_eq!(asset.bytes, PNG_1X1);
        assert_eq!(asset.mime, "image/png");
        assert_eq!(asset.ext, "png");
        assert_eq!(asset.digest, AssetDigest::from_bytes(PNG_1X1));
    }

    #[test]
    fn bad_base64_degrades_to_missing() {
        assert_eq!(
            normalize("data:image/png;base64,!!!not-base64!!!", &OfflineFetcher),
            Normalized::Missing
        );
    }

    #[test]
    fn failed_fetch_degrades_to_missing() {
        assert_eq!(
            normalize("https://example.invalid/gone.png", &OfflineFetcher),
            Normalized::Missing
        );
    }

    #[test]
    fn undecodable_raster_keeps_original_bytes() {
        // Declared JPEG but not decodable: normalization falls back to
        // storing the bytes as-is under the declared MIME.
        let uri = encode_data_uri("image/jpeg", b"definitely not a jpeg");
        let Normalized::Asset(asset) = normalize(&uri, &OfflineFetcher) else {
            panic!("expected asset");
        };
        assert_eq!(asset.bytes, b"definitely not a jpeg");
        assert_eq!(asset.mime, "image/jpeg");
        assert_eq!(asset.ext, "jpg");
    }

    #[test]
    fn svg_is_never_reencoded() {
        let svg = b"<svg xmlns='http://www.w3.org/2000/svg'/>";
        let uri = encode_data_uri("image/svg+xml", svg);
        let Normalized::Asset(asset) = normalize(&uri, &OfflineFetcher) else {
            panic!("expected asset");
        };
        assert_eq!(asset.bytes, svg);
        assert_eq!(asset.ext, "svg");
    }

    #[test]
    fn data_uri_roundtrip() {
        let uri = encode_data_uri("image/png", PNG_1X1);
        let Normalized::Asset(asset) = normalize(&uri, &OfflineFetcher) else {
            panic!("expected asset");
        };
        assert_eq!(asset.to_data_uri(), uri);
    }
}
