//! PNG output for `--screenshot`.

use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ScreenshotError {
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("failed to encode PNG: {0}")]
    Encode(#[from] png::EncodingError),

    #[error("failed to write screenshot: {0}")]
    Io(#[from] std::io::Error),
}

/// Encode tightly packed RGBA8 rows as a PNG.
pub fn encode_png(rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ScreenshotError> {
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(ScreenshotError::SizeMismatch {
            expected,
            actual: rgba.len(),
        });
    }

    let mut png_buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(std::io::Cursor::new(&mut png_buf), width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba)?;
        writer.finish()?;
    }
    Ok(png_buf)
}

/// Encode and write to `path`, creating its parent directory.
pub fn save_png(path: &Path, rgba: &[u8], width: u32, height: u32) -> Result<(), ScreenshotError> {
    let png_buf = encode_png(rgba, width, height)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, png_buf)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    #[test]
    fn test_encode_writes_png_signature() {
        let pixels = vec![255u8; 2 * 2 * 4];
        let png = encode_png(&pixels, 2, 2).unwrap();
        assert_eq!(png[..8], PNG_SIGNATURE);
    }

    #[test]
    fn test_encode_rejects_short_buffer() {
        let err = encode_png(&[0; 12], 2, 2).unwrap_err();
        assert!(matches!(
            err,
            ScreenshotError::SizeMismatch {
                expected: 16,
                actual: 12
            }
        ));
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("shots").join("sun.png");
        save_png(&path, &[0, 0, 0, 255], 1, 1).unwrap();
        let written = std::fs::read(&path).unwrap();
        assert_eq!(written[..8], PNG_SIGNATURE);
    }
}
