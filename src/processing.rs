use crate::constants::{
    DEFAULT_JPEG_QUALITY, DEFAULT_MAX_WIDTH, DEFAULT_WEBP_QUALITY, MAX_JPEG_DIMENSION,
    MAX_QUALITY, MIN_QUALITY,
};
use crate::error::{ProcessingError, Result};
use crate::verbose;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageDecoder, ImageReader, Rgb, RgbImage};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizeOptions {
    pub jpeg_quality: u8,
    pub webp_quality: u8,
    pub max_width: u32,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            webp_quality: DEFAULT_WEBP_QUALITY,
            max_width: DEFAULT_MAX_WIDTH,
        }
    }
}

impl OptimizeOptions {
    pub fn new(
        jpeg_quality: Option<u8>,
        webp_quality: Option<u8>,
        max_width: Option<u32>,
    ) -> Result<Self> {
        let jpeg_quality = validate_quality(jpeg_quality.unwrap_or(DEFAULT_JPEG_QUALITY))?;
        let webp_quality = validate_quality(webp_quality.unwrap_or(DEFAULT_WEBP_QUALITY))?;
        let max_width = max_width.unwrap_or(DEFAULT_MAX_WIDTH);
        if max_width == 0 {
            return Err(ProcessingError::InvalidMaxWidth(max_width));
        }

        Ok(Self {
            jpeg_quality,
            webp_quality,
            max_width,
        })
    }
}

fn validate_quality(quality: u8) -> Result<u8> {
    if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
        return Err(ProcessingError::InvalidQuality(quality));
    }
    Ok(quality)
}

/// Decodes an image and applies its EXIF orientation, so the pixel buffer
/// matches how the image is meant to be displayed.
///
/// Only the first frame of animated inputs is decoded.
pub fn load_oriented(input_path: &Path) -> Result<DynamicImage> {
    let mut decoder = ImageReader::open(input_path)?
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);
    verbose!("orientation {:?} applied to {:?}", orientation, input_path);
    Ok(img)
}

/// Target size when the image is wider than `max_width`, `None` otherwise.
pub fn scaled_dimensions(width: u32, height: u32, max_width: u32) -> Option<(u32, u32)> {
    if width <= max_width {
        return None;
    }
    let new_height = ((height as f64 * max_width as f64 / width as f64).round() as u32).max(1);
    Some((max_width, new_height))
}

/// Downscales with Lanczos3 when wider than `max_width`, keeping the aspect
/// ratio. Returns whether the image was resized.
pub fn resize_to_max_width(img: &mut DynamicImage, max_width: u32) -> bool {
    let (width, height) = img.dimensions();
    match scaled_dimensions(width, height, max_width) {
        Some((new_width, new_height)) => {
            *img = img.resize_exact(new_width, new_height, FilterType::Lanczos3);
            verbose!(
                "resized {}x{} -> {}x{}",
                width,
                height,
                new_width,
                new_height
            );
            true
        }
        None => false,
    }
}

/// Composites any transparency onto opaque white. Opaque images are only
/// converted to 8-bit RGB.
pub fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    verbose!("flattening alpha channel onto white");
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut flat = RgbImage::new(width, height);
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        flat.put_pixel(x, y, Rgb([blend(r, a), blend(g, a), blend(b, a)]));
    }
    flat
}

fn blend(channel: u8, alpha: u8) -> u8 {
    let alpha = alpha as u32;
    ((channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8
}

/// Encodes RGB pixels as a progressive JPEG with optimized Huffman tables.
pub fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let (width, height) = img.dimensions();
    if width > MAX_JPEG_DIMENSION || height > MAX_JPEG_DIMENSION {
        return Err(ProcessingError::InvalidDimensions(
            width,
            height,
            MAX_JPEG_DIMENSION,
        ));
    }

    let mut buffer = Vec::new();
    let mut encoder = jpeg_encoder::Encoder::new(&mut buffer, quality);
    encoder.set_progressive(true);
    encoder.set_optimized_huffman_tables(true);
    encoder.encode(
        img.as_raw(),
        width as u16,
        height as u16,
        jpeg_encoder::ColorType::Rgb,
    )?;
    Ok(buffer)
}

/// Encodes a lossy WebP. Alpha is kept when the source has it.
pub fn encode_webp(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let normalized = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };

    let encoder = webp::Encoder::from_image(&normalized)
        .map_err(|e| ProcessingError::WebPEncoding(e.to_string()))?;
    let memory = encoder
        .encode_simple(false, quality as f32)
        .map_err(|e| ProcessingError::WebPEncoding(format!("{:?}", e)))?;
    Ok(memory.to_vec())
}

/// Writes encoded bytes, creating parent directories. Nothing is written
/// unless encoding already succeeded.
fn write_output(output_path: &Path, bytes: &[u8]) -> Result<u64> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|_| ProcessingError::DirectoryCreationFailed(parent.to_path_buf()))?;
    }
    fs::write(output_path, bytes)?;
    Ok(bytes.len() as u64)
}

/// Orient, resize, flatten and re-encode as JPEG.
///
/// Returns the size of the written file in bytes.
pub fn optimize_image(
    input_path: &Path,
    output_path: &Path,
    quality: u8,
    max_width: u32,
) -> Result<u64> {
    let mut img = load_oriented(input_path)?;
    resize_to_max_width(&mut img, max_width);
    let flat = flatten_on_white(&img);
    let bytes = encode_jpeg(&flat, quality)?;
    write_output(output_path, &bytes)
}

/// Orient and encode as WebP. No resize and no flattening: WebP keeps alpha.
pub fn convert_to_modern(input_path: &Path, output_path: &Path, quality: u8) -> Result<u64> {
    let img = load_oriented(input_path)?;
    let bytes = encode_webp(&img, quality)?;
    write_output(output_path, &bytes)
}

/// Startup precondition: both encoders must be able to produce output.
pub fn check_codecs() -> Result<()> {
    let probe = RgbImage::from_pixel(1, 1, Rgb([255, 255, 255]));
    encode_jpeg(&probe, DEFAULT_JPEG_QUALITY)
        .map_err(|e| ProcessingError::CodecUnavailable(format!("JPEG: {}", e)))?;
    encode_webp(&DynamicImage::ImageRgb8(probe), DEFAULT_WEBP_QUALITY)
        .map_err(|e| ProcessingError::CodecUnavailable(format!("WebP: {}", e)))?;
    Ok(())
}
