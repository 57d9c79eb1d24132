//! Client-side validation of user uploads, run before any bytes go over the
//! wire. Each rejection carries its own user-facing reason.

use image::ImageFormat;

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("this file is {size_mb} MB; photos can be at most 10 MB")]
    TooLarge { size_mb: u32 },
    #[error("\".{0}\" files are not supported; use JPEG, PNG or WebP")]
    UnsupportedExtension(String),
    #[error("this file does not look like a JPEG, PNG or WebP image")]
    UnsupportedContent,
}

/// Validate size, extension and actual content (magic bytes) of an upload.
/// Returns the sniffed format so callers can skip a second detection pass.
pub fn validate_upload(file_name: &str, bytes: &[u8]) -> Result<ImageFormat, UploadError> {
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge {
            size_mb: (bytes.len() / (1024 * 1024)) as u32,
        });
    }

    let extension = file_name
        .rsplit('.')
        .next()
        .filter(|ext| *ext != file_name)
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(UploadError::UnsupportedExtension(extension));
    }

    // The extension is user-controlled; trust the magic bytes instead.
    match image::guess_format(bytes) {
        Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP)) => Ok(format),
        _ => Err(UploadError::UnsupportedContent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];
    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn bytes_with_magic(magic: &[u8], len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        bytes[..magic.len()].copy_from_slice(magic);
        bytes
    }

    #[test]
    fn oversized_png_is_rejected_for_size() {
        let bytes = bytes_with_magic(PNG_MAGIC, 15 * 1024 * 1024);
        let err = validate_upload("photo.png", &bytes).unwrap_err();
        assert_eq!(err, UploadError::TooLarge { size_mb: 15 });
        assert!(err.to_string().contains("10 MB"));
    }

    #[test]
    fn bmp_is_rejected_for_its_extension() {
        let err = validate_upload("scan.bmp", &[0u8; 128]).unwrap_err();
        assert_eq!(err, UploadError::UnsupportedExtension("bmp".into()));
        assert!(err.to_string().contains("bmp"));
    }

    #[test]
    fn reasonable_jpeg_passes() {
        let bytes = bytes_with_magic(JPEG_MAGIC, 2 * 1024 * 1024);
        assert_eq!(
            validate_upload("Photo.JPG", &bytes),
            Ok(ImageFormat::Jpeg)
        );
    }

    #[test]
    fn renamed_text_file_is_rejected_by_content() {
        let err = validate_upload("notes.png", b"hello world").unwrap_err();
        assert_eq!(err, UploadError::UnsupportedContent);
    }

    #[test]
    fn extensionless_name_is_rejected() {
        let bytes = bytes_with_magic(JPEG_MAGIC, 64);
        assert!(matches!(
            validate_upload("photo", &bytes),
            Err(UploadError::UnsupportedExtension(_))
        ));
    }
}
