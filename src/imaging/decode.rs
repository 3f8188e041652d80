//! Image decoding using the `image` crate.

use crate::error::{Error, Result};
use image::{DynamicImage, ImageError, ImageReader};
use std::path::Path;

/// Decode an image file.
///
/// The format is sniffed from the file contents, so camera exports with
/// misleading extensions still decode. Supports JPEG and PNG.
pub fn decode_image(path: &Path) -> Result<DynamicImage> {
    let to_error = |source: ImageError| Error::ImageDecode {
        path: path.to_path_buf(),
        source,
    };

    ImageReader::open(path)
        .and_then(ImageReader::with_guessed_format)
        .map_err(|e| to_error(ImageError::IoError(e)))?
        .decode()
        .map_err(to_error)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    #[test]
    fn test_decode_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("frame.png");
        RgbImage::from_pixel(4, 3, Rgb([10, 20, 30])).save(&path).unwrap();

        let decoded = decode_image(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }

    #[test]
    fn test_decode_sniffs_format_despite_extension() {
        let dir = TempDir::new().unwrap();
        let png = dir.path().join("frame.png");
        RgbImage::from_pixel(2, 2, Rgb([1, 2, 3])).save(&png).unwrap();
        let mislabeled = dir.path().join("frame.dat");
        std::fs::rename(&png, &mislabeled).unwrap();

        assert!(decode_image(&mislabeled).is_ok());
    }

    #[test]
    fn test_decode_missing_file() {
        let result = decode_image(Path::new("/nonexistent/IMG_0001.JPG"));
        assert!(matches!(result, Err(Error::ImageDecode { .. })));
    }

    #[test]
    fn test_decode_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        assert!(matches!(decode_image(&path), Err(Error::ImageDecode { .. })));
    }
}
