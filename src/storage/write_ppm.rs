use std::io::Write;
use std::path::Path;

use crate::core::data::frame_buffer::{FrameBuffer, BYTES_PER_PIXEL};

/// Writes an RGBA frame buffer as a binary PPM, dropping the alpha channel.
pub fn write_ppm(image: &FrameBuffer, filepath: impl AsRef<Path>) -> std::io::Result<()> {
    let filepath = filepath.as_ref();

    if let Some(parent) = filepath.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(filepath)?;

    // PPM header: P6 means binary RGB, then width height max_colour
    writeln!(file, "P6")?;
    writeln!(file, "{} {}", image.width(), image.height())?;
    writeln!(file, "255")?;

    let mut rgb = Vec::with_capacity(image.total_pixels() * 3);
    for pixel in image.data().chunks_exact(BYTES_PER_PIXEL) {
        rgb.extend_from_slice(&pixel[..3]);
    }
    file.write_all(&rgb)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_ppm_drops_alpha_and_keeps_header() {
        let mut image = FrameBuffer::new(2, 1);
        image
            .write_range(0..2, &[10, 20, 30, 255, 40, 50, 60, 255])
            .unwrap();

        let dir = std::env::temp_dir().join("fractal_renderer_ppm_test");
        let path = dir.join("two_pixels.ppm");
        write_ppm(&image, &path).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(&written[..11], b"P6\n2 1\n255\n");
        assert_eq!(&written[11..], &[10, 20, 30, 40, 50, 60]);

        std::fs::remove_file(&path).unwrap();
    }
}
