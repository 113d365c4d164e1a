//! Image uploads: format sniffing, pixel size and fit geometry.

use super::placeholder::Extent;
use crate::error::{Error, Result};
use image::{ImageFormat, ImageReader};
use std::io::Cursor;

/// A decoded image header plus the original bytes.
#[derive(Debug, Clone)]
pub struct ImageData {
    bytes: Vec<u8>,
    format: ImageFormat,
    width: u32,
    height: u32,
    filename: String,
}

impl ImageData {
    /// Sniff the format from the bytes and read the pixel dimensions.
    ///
    /// The upload's extension is not trusted for the format.
    pub fn decode(filename: &str, bytes: Vec<u8>) -> Result<Self> {
        let reader = ImageReader::new(Cursor::new(bytes.as_slice()))
            .with_guessed_format()
            .map_err(|e| Error::Image(e.to_string()))?;
        let format = reader
            .format()
            .ok_or_else(|| Error::Image("unrecognized image data".to_string()))?;
        let (width, height) = reader.into_dimensions()?;
        if width == 0 || height == 0 {
            return Err(Error::Image(format!("image has no pixels ({}x{})", width, height)));
        }

        Ok(Self {
            bytes,
            format,
            width,
            height,
            filename: filename.to_string(),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Pixel size as `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Extension for the media part, from the detected format.
    pub fn extension(&self) -> &'static str {
        match self.format {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
            other => other.extensions_str().first().copied().unwrap_or("bin"),
        }
    }

    /// MIME type registered for the media part.
    pub fn content_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// Text for the picture's `descr` attribute.
    pub fn description(&self) -> String {
        let name = self
            .filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default();
        if name.is_empty() {
            format!("image.{}", self.extension())
        } else {
            name.to_string()
        }
    }

    /// Cropping that makes the image fill `view` without distortion.
    pub fn fill_crop(&self, view: &Extent) -> Crop {
        Crop::fill(
            (f64::from(self.width), f64::from(self.height)),
            (view.cx as f64, view.cy as f64),
        )
    }

    /// Width in EMU when scaled to `height` EMU, keeping the aspect ratio.
    pub fn scaled_width(&self, height: i64) -> i64 {
        (height as f64 * f64::from(self.width) / f64::from(self.height)).round() as i64
    }
}

/// Fractions cut from each edge of an image (`a:srcRect`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crop {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Crop {
    /// Centered crop of an image of `image` size to the aspect of `view`.
    pub fn fill(image: (f64, f64), view: (f64, f64)) -> Self {
        let none = Self {
            left: 0.0,
            top: 0.0,
            right: 0.0,
            bottom: 0.0,
        };
        if image.1 <= 0.0 || view.1 <= 0.0 || view.0 <= 0.0 {
            return none;
        }

        let image_aspect = image.0 / image.1;
        let view_aspect = view.0 / view.1;

        if view_aspect < image_aspect {
            // Too wide.
            let crop = (1.0 - view_aspect / image_aspect) / 2.0;
            Self {
                left: crop,
                right: crop,
                ..none
            }
        } else if view_aspect > image_aspect {
            let crop = (1.0 - image_aspect / view_aspect) / 2.0;
            Self {
                top: crop,
                bottom: crop,
                ..none
            }
        } else {
            none
        }
    }

    /// `a:srcRect` attributes in 1/1000ths of a percent; zero edges are omitted.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        [
            ("l", self.left),
            ("t", self.top),
            ("r", self.right),
            ("b", self.bottom),
        ]
        .into_iter()
        .map(|(name, value)| (name, (value * 100_000.0).round() as i64))
        .filter(|(_, value)| *value != 0)
        .map(|(name, value)| (name, value.to_string()))
        .collect()
    }
}
