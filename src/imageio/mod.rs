use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    #[cfg(test)]
    #[error("Images have different dimensions")]
    DimensionMismatch,
    #[error("Pixel buffer holds {actual} values, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encoding error: {0}")]
    Encode(#[from] image::ImageError),
}

/// An 8-bit grayscale frame, row-major, one luma byte per pixel.
#[derive(Debug, PartialEq, Clone)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Image {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self { width, height, data }
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        self.data[(y * self.width + x) as usize]
    }

    /// Compares two frames pixel by pixel.
    ///
    /// Returns the number of differing pixels together with an absolute
    /// difference image.
    #[cfg(test)]
    pub fn compare(img1: &Image, img2: &Image) -> Result<(usize, Image), ImageError> {
        if img1.height != img2.height || img1.width != img2.width {
            return Err(ImageError::DimensionMismatch);
        }
        let diff_pixels: Vec<u8> = img1
            .data
            .iter()
            .zip(&img2.data)
            .map(|(p1, p2)| p1.abs_diff(*p2))
            .collect();
        let differing = diff_pixels.iter().filter(|d| **d != 0).count();
        Ok((differing, Image::new(img1.width, img1.height, diff_pixels)))
    }
}

/// Loads any image `image` can decode and converts it to 8-bit luma.
#[cfg(test)]
pub fn file_to_image(path: &Path) -> Result<Image, ImageError> {
    let img = image::open(path)?.into_luma8();
    let (width, height) = img.dimensions();
    Ok(Image::new(width, height, img.into_raw()))
}

/// Writes `img` as a grayscale PNG, creating missing parent directories.
pub fn save_image(img: &Image, path: &Path) -> Result<(), ImageError> {
    let expected = (img.width * img.height) as usize;
    if img.data.len() != expected {
        return Err(ImageError::BufferSize {
            expected,
            actual: img.data.len(),
        });
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let buffer = image::GrayImage::from_raw(img.width, img.height, img.data.clone()).ok_or(
        ImageError::BufferSize {
            expected,
            actual: img.data.len(),
        },
    )?;
    buffer.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_identical_images() {
        let data = vec![0, 128, 255];
        let img1 = Image::new(3, 1, data.clone());
        let img2 = Image::new(3, 1, data);

        let (differing, diff_img) = Image::compare(&img1, &img2).unwrap();

        assert_eq!(differing, 0);
        assert_eq!(diff_img.data, vec![0, 0, 0]);
        assert_eq!(diff_img.width, 3);
    }

    #[test]
    fn test_compare_dimension_mismatch() {
        let img1 = Image::new(2, 2, vec![0; 4]);
        let img2 = Image::new(3, 3, vec![0; 9]);

        let result = Image::compare(&img1, &img2);

        assert!(matches!(result, Err(ImageError::DimensionMismatch)));
    }

    #[test]
    fn test_compare_calculates_difference_correctly() {
        let img1 = Image::new(2, 1, vec![200, 10]);
        let img2 = Image::new(2, 1, vec![50, 40]);

        let (differing, diff_img) = Image::compare(&img1, &img2).unwrap();

        assert_eq!(differing, 2);
        assert_eq!(diff_img.data, vec![150, 30]);
    }

    #[test]
    fn test_save_rejects_short_buffer() {
        let img = Image::new(4, 4, vec![0; 3]);
        let path = std::env::temp_dir().join("shapeset_short_buffer.png");
        assert!(matches!(
            save_image(&img, &path),
            Err(ImageError::BufferSize { expected: 16, actual: 3 })
        ));
    }

    #[test]
    fn test_save_then_load_grayscale_png() {
        let dir = std::env::temp_dir().join(format!("shapeset_imageio_{}", std::process::id()));
        let path = dir.join("nested").join("frame.png");
        let img = Image::new(2, 2, vec![0, 64, 128, 255]);

        save_image(&img, &path).unwrap();
        let loaded = file_to_image(&path).unwrap();

        assert_eq!(loaded, img);
        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.color(), image::ColorType::L8);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
