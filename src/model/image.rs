//! Embedded raster images.

use std::borrow::Cow;
use std::fmt;
use std::io::Read;
use std::path::Path;

use flate2::read::ZlibDecoder;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::{DecodeError, Error, Result};
use crate::parser::RawImage;

/// Pixel layout of a reconstructed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum PixelFormat {
    /// 8-bit RGB
    Rgb8,
    /// 1-bit gray, expanded to 8-bit black and white on decode
    Luma1,
    /// 8-bit gray
    Luma8,
}

impl PixelFormat {
    /// Infer the pixel format from `/ColorSpace` and `/BitsPerComponent`.
    ///
    /// A missing color space is read as `DeviceGray` and missing bits per
    /// component as 8. Color spaces other than the two device spaces fall
    /// back to 8-bit gray.
    pub fn infer(color_space: Option<&str>, bits_per_component: Option<i64>) -> Self {
        let bits = bits_per_component.unwrap_or(8);
        match color_space.unwrap_or("DeviceGray") {
            "DeviceRGB" => PixelFormat::Rgb8,
            "DeviceGray" if bits == 1 => PixelFormat::Luma1,
            _ => PixelFormat::Luma8,
        }
    }

    /// Bytes one row of `width` pixels occupies in the stream.
    fn row_bytes(self, width: usize) -> Option<usize> {
        match self {
            PixelFormat::Rgb8 => width.checked_mul(3),
            PixelFormat::Luma1 => Some(width.div_ceil(8)),
            PixelFormat::Luma8 => Some(width),
        }
    }

    /// Convert an already decoded image into this format.
    fn convert(self, image: DynamicImage) -> DynamicImage {
        match self {
            PixelFormat::Rgb8 => DynamicImage::ImageRgb8(image.to_rgb8()),
            PixelFormat::Luma1 | PixelFormat::Luma8 => DynamicImage::ImageLuma8(image.to_luma8()),
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::Rgb8 => "RGB",
            PixelFormat::Luma1 => "1",
            PixelFormat::Luma8 => "L",
        };
        f.write_str(name)
    }
}

/// An image embedded in a page.
///
/// Decoding happens once, on construction. If it fails the pixel buffer is
/// absent and the reason is kept in [`PdfImage::decode_error`].
#[derive(Debug, Clone)]
pub struct PdfImage {
    index: u32,
    page_number: u32,
    name: String,
    format: PixelFormat,
    width: Option<u32>,
    height: Option<u32>,
    image: Option<DynamicImage>,
    decode_error: Option<DecodeError>,
}

impl PdfImage {
    /// Reconstruct an image node. `index` is 0-based and stored 1-based.
    pub fn from_raw(raw: &RawImage, index: usize, page_number: u32) -> Self {
        let index = index as u32 + 1;
        let format = PixelFormat::infer(raw.color_space.as_deref(), raw.bits_per_component);

        let (image, decode_error) = match decode(raw, format) {
            Ok(image) => (Some(image), None),
            Err(e) => {
                log::warn!(
                    "Could not decode image {} (/{}) on page {}: {}",
                    index,
                    raw.name,
                    page_number,
                    e
                );
                (None, Some(e))
            }
        };

        Self {
            index,
            page_number,
            name: raw.name.clone(),
            format,
            width: raw.width.and_then(|w| u32::try_from(w).ok()),
            height: raw.height.and_then(|h| u32::try_from(h).ok()),
            image,
            decode_error,
        }
    }

    /// 1-based position within the page.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// 1-based number of the owning page.
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// XObject resource name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Declared width in pixels.
    pub fn width(&self) -> Option<u32> {
        self.width
    }

    /// Declared height in pixels.
    pub fn height(&self) -> Option<u32> {
        self.height
    }

    /// The decoded pixel buffer, if decoding succeeded.
    pub fn image(&self) -> Option<&DynamicImage> {
        self.image.as_ref()
    }

    pub fn is_decoded(&self) -> bool {
        self.image.is_some()
    }

    /// Why decoding failed, if it did.
    pub fn decode_error(&self) -> Option<&DecodeError> {
        self.decode_error.as_ref()
    }

    /// Write the image to `path`, in the format implied by its extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let image = self.image.as_ref().ok_or(Error::ImageUnavailable {
            page: self.page_number,
            index: self.index,
        })?;
        image.save(path.as_ref())?;
        log::debug!("Saved {} to {}", self, path.as_ref().display());
        Ok(())
    }
}

impl fmt::Display for PdfImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PDF image {} on page {}", self.index, self.page_number)
    }
}

impl Serialize for PdfImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PdfImage", 7)?;
        state.serialize_field("index", &self.index)?;
        state.serialize_field("page", &self.page_number)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("format", &self.format)?;
        state.serialize_field("width", &self.width)?;
        state.serialize_field("height", &self.height)?;
        state.serialize_field("decoded", &self.is_decoded())?;
        state.end()
    }
}

/// Decode a raw stream and lay its bytes out as an image of `format`.
fn decode(raw: &RawImage, format: PixelFormat) -> std::result::Result<DynamicImage, DecodeError> {
    let (width, height) = dimensions(raw)?;
    let mut data = Cow::Borrowed(raw.data.as_slice());

    for (position, filter) in raw.filters.iter().enumerate() {
        match filter.as_str() {
            "FlateDecode" | "Fl" => {
                if let Some(predictor) = raw.predictor.filter(|&p| p > 1) {
                    return Err(DecodeError::UnsupportedPredictor(predictor));
                }
                data = Cow::Owned(inflate(&data)?);
            }
            "DCTDecode" | "DCT" => {
                if let Some(next) = raw.filters.get(position + 1) {
                    return Err(DecodeError::UnsupportedFilter(format!("{} after {}", next, filter)));
                }
                let jpeg = image::load_from_memory_with_format(&data, ImageFormat::Jpeg).map_err(
                    |e| DecodeError::Corrupt {
                        filter: filter.clone(),
                        reason: e.to_string(),
                    },
                )?;
                return Ok(format.convert(jpeg));
            }
            other => return Err(DecodeError::UnsupportedFilter(other.to_string())),
        }
    }

    reconstruct(&data, width, height, format)
}

/// Declared dimensions, checked to be positive and to fit a pixel buffer.
fn dimensions(raw: &RawImage) -> std::result::Result<(u32, u32), DecodeError> {
    let invalid = || DecodeError::InvalidDimensions {
        width: raw.width.unwrap_or(0),
        height: raw.height.unwrap_or(0),
    };
    let width = raw.width.and_then(|w| u32::try_from(w).ok()).filter(|&w| w > 0);
    let height = raw.height.and_then(|h| u32::try_from(h).ok()).filter(|&h| h > 0);
    match (width, height) {
        (Some(width), Some(height)) => Ok((width, height)),
        _ => Err(invalid()),
    }
}

fn inflate(data: &[u8]) -> std::result::Result<Vec<u8>, DecodeError> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| DecodeError::Corrupt {
            filter: "FlateDecode".to_string(),
            reason: e.to_string(),
        })?;
    Ok(out)
}

/// Build a pixel buffer from unfiltered sample data.
///
/// Surplus bytes after the last row are ignored.
fn reconstruct(
    data: &[u8],
    width: u32,
    height: u32,
    format: PixelFormat,
) -> std::result::Result<DynamicImage, DecodeError> {
    let too_large = || DecodeError::InvalidDimensions {
        width: width.into(),
        height: height.into(),
    };
    let row = format.row_bytes(width as usize).ok_or_else(too_large)?;
    let expected = row.checked_mul(height as usize).ok_or_else(too_large)?;
    if data.len() < expected {
        return Err(DecodeError::Truncated {
            expected,
            actual: data.len(),
        });
    }
    let samples = &data[..expected];
    let truncated = || DecodeError::Truncated {
        expected,
        actual: data.len(),
    };

    match format {
        PixelFormat::Rgb8 => RgbImage::from_raw(width, height, samples.to_vec())
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(truncated),
        PixelFormat::Luma8 => GrayImage::from_raw(width, height, samples.to_vec())
            .map(DynamicImage::ImageLuma8)
            .ok_or_else(truncated),
        PixelFormat::Luma1 => {
            let pixels = samples
                .chunks_exact(row)
                .flat_map(|line| {
                    (0..width as usize).map(move |x| {
                        if line[x / 8] & (0x80 >> (x % 8)) != 0 {
                            255
                        } else {
                            0
                        }
                    })
                })
                .collect();
            GrayImage::from_raw(width, height, pixels)
                .map(DynamicImage::ImageLuma8)
                .ok_or_else(truncated)
        }
    }
}
