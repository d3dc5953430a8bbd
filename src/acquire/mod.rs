//! Image acquisition
//!
//! Loads the user-supplied payload and sniffs its content format. Anything
//! that is not an image is rejected here, before the pipeline ever starts.

use std::path::Path;

use thiserror::Error;

/// A raw image payload plus its sniffed MIME type. Owned by a single
/// pipeline invocation and discarded when it completes.
#[derive(Debug)]
pub struct RawImage {
    /// Encoded image bytes as read from the source.
    pub data: Vec<u8>,
    /// MIME type, e.g. `image/png`.
    pub mime: String,
}

impl RawImage {
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// Errors raised at the acquisition boundary.
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("payload is not an image")]
    NotAnImage,
}

/// Read an image file and sniff its format from the content.
///
/// Returns [`AcquireError::NotAnImage`] for payloads the image decoder does
/// not recognize, so the caller can report an invalid input type without
/// entering the recognition phase.
pub fn load_image(path: &Path) -> Result<RawImage, AcquireError> {
    let data = std::fs::read(path).map_err(|source| AcquireError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let format = image::guess_format(&data).map_err(|_| AcquireError::NotAnImage)?;
    let mime = format.to_mime_type().to_string();

    let image = RawImage { data, mime };
    if !image.is_image() {
        return Err(AcquireError::NotAnImage);
    }

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 255, 255, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_load_png() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&png_bytes()).unwrap();

        let image = load_image(file.path()).unwrap();
        assert_eq!(image.mime, "image/png");
        assert!(image.is_image());
        assert!(!image.data.is_empty());
    }

    #[test]
    fn test_rejects_non_image_payload() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"this is definitely not an image").unwrap();

        let result = load_image(file.path());
        assert!(matches!(result, Err(AcquireError::NotAnImage)));
    }

    #[test]
    fn test_missing_file() {
        let result = load_image(Path::new("/nonexistent/equation.png"));
        assert!(matches!(result, Err(AcquireError::Io { .. })));
    }
}
