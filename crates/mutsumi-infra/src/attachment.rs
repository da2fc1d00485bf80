//! Image files to data URIs.
//!
//! Stands in for the platform image picker: a path goes in, a
//! `data:image/jpeg;base64,<payload>` string comes out. Every image is
//! scaled down and re-encoded as JPEG first, so stored sessions and
//! avatars stay well inside the storage quota.

use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

/// Longest side of a chat attachment after scaling.
pub const ATTACHMENT_MAX_DIMENSION: u32 = 800;

/// Longest side of an avatar after scaling.
pub const AVATAR_MAX_DIMENSION: u32 = 300;

/// JPEG quality used for re-encoding (0-100).
pub const JPEG_QUALITY: u8 = 70;

/// Largest source file read from disk.
pub const MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("unsupported image type '{0}' (use png, jpg, gif or webp)")]
    UnsupportedType(String),

    #[error("image is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },

    #[error("could not process image: {0}")]
    Decode(String),
}

/// MIME type for an image file extension.
pub fn mime_for_path(path: &Path) -> Result<&'static str, AttachmentError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        _ => Err(AttachmentError::UnsupportedType(ext)),
    }
}

/// Encode raw bytes as a data URI.
pub fn encode_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// Decode `bytes`, fit the longest side into `max_dimension` and re-encode
/// as JPEG. Smaller images keep their size.
pub fn compress_image(bytes: &[u8], max_dimension: u32) -> Result<Vec<u8>, AttachmentError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| AttachmentError::Decode(e.to_string()))?;

    let scaled = if decoded.width() > max_dimension || decoded.height() > max_dimension {
        decoded.resize(max_dimension, max_dimension, FilterType::Triangle)
    } else {
        decoded
    };
    // JPEG has no alpha channel
    let rgb = scaled.to_rgb8();

    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| AttachmentError::Decode(e.to_string()))?;
    Ok(out.into_inner())
}

/// Read an image file, shrink it to `max_dimension` and return it as a
/// JPEG data URI.
pub async fn load_image(path: &Path, max_dimension: u32) -> Result<String, AttachmentError> {
    mime_for_path(path)?;
    let read_err = |source| AttachmentError::Read {
        path: path.display().to_string(),
        source,
    };

    let size = tokio::fs::metadata(path).await.map_err(read_err)?.len();
    if size > MAX_IMAGE_BYTES {
        return Err(AttachmentError::TooLarge {
            size,
            limit: MAX_IMAGE_BYTES,
        });
    }

    let bytes = tokio::fs::read(path).await.map_err(read_err)?;
    let compressed = tokio::task::spawn_blocking(move || compress_image(&bytes, max_dimension))
        .await
        .map_err(|e| AttachmentError::Decode(e.to_string()))??;

    tracing::debug!(
        path = %path.display(),
        original = size,
        compressed = compressed.len(),
        max_dimension,
        "image loaded"
    );
    Ok(encode_data_uri("image/jpeg", &compressed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use mutsumi_core::dispatch::attachment::parse_data_uri;

    /// A noisy PNG that does not compress well.
    fn noisy_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            let v = x.wrapping_mul(7919) ^ y.wrapping_mul(104_729);
            image::Rgb([v as u8, (v >> 8) as u8, (v >> 16) as u8])
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("a.PNG")).unwrap(), "image/png");
        assert_eq!(mime_for_path(Path::new("b.jpeg")).unwrap(), "image/jpeg");
        assert!(matches!(
            mime_for_path(Path::new("c.txt")),
            Err(AttachmentError::UnsupportedType(_))
        ));
        assert!(mime_for_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_compress_scales_longest_side() {
        let jpeg = compress_image(&noisy_png(1600, 1000), ATTACHMENT_MAX_DIMENSION).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.width(), 800);
        assert_eq!(decoded.height(), 500);
    }

    #[test]
    fn test_compress_keeps_small_images_size() {
        let jpeg = compress_image(&noisy_png(120, 90), AVATAR_MAX_DIMENSION).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (120, 90));
    }

    #[test]
    fn test_compress_rejects_non_images() {
        assert!(matches!(
            compress_image(b"hello", ATTACHMENT_MAX_DIMENSION),
            Err(AttachmentError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_load_image_shrinks_and_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        let png = noisy_png(1600, 1200);
        tokio::fs::write(&path, &png).await.unwrap();

        let uri = load_image(&path, ATTACHMENT_MAX_DIMENSION).await.unwrap();
        let parsed = parse_data_uri(&uri).unwrap();
        assert_eq!(parsed.mime_type, "image/jpeg");

        let payload = STANDARD.decode(&parsed.data).unwrap();
        assert!(payload.len() < png.len());
        let decoded = image::load_from_memory(&payload).unwrap();
        assert_eq!(decoded.width().max(decoded.height()), ATTACHMENT_MAX_DIMENSION);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = load_image(Path::new("/definitely/not/here.png"), ATTACHMENT_MAX_DIMENSION)
            .await
            .unwrap_err();
        assert!(matches!(err, AttachmentError::Read { .. }));
    }
}
