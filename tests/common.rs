#![allow(dead_code)]

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Frame, Rgb, RgbImage, Rgba, RgbaImage};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A noisy gradient so encoders have real content to compress.
pub fn photo(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let noise = ((x.wrapping_mul(7919) ^ y.wrapping_mul(104729)) % 32) as u8;
        Rgb([
            ((x * 255 / width.max(1)) as u8).saturating_add(noise),
            ((y * 255 / height.max(1)) as u8).saturating_add(noise),
            128u8.saturating_add(noise),
        ])
    })
}

/// Camera-like JPEG: high quality, so re-encoding it always saves space.
pub fn write_jpeg(path: &Path, width: u32, height: u32) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let writer = BufWriter::new(File::create(path).unwrap());
    JpegEncoder::new_with_quality(writer, 98)
        .encode_image(&photo(width, height))
        .unwrap();
    path.to_path_buf()
}

pub fn write_transparent_png(path: &Path, width: u32, height: u32) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let img = RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 0])
        }
    });
    DynamicImage::ImageRgba8(img).save(path).unwrap();
    path.to_path_buf()
}

/// Two-frame GIF. The first frame is opaque red on the left and transparent
/// on the right; the second frame is solid blue.
pub fn write_animated_gif(path: &Path, width: u32, height: u32) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let first = RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    let second = RgbaImage::from_pixel(width, height, Rgba([0, 0, 255, 255]));

    let mut encoder = GifEncoder::new(BufWriter::new(File::create(path).unwrap()));
    encoder
        .encode_frames(vec![Frame::new(first), Frame::new(second)])
        .unwrap();
    path.to_path_buf()
}

/// Indexed PNG whose tRNS chunk makes palette entry 1 fully transparent.
/// The left half uses the opaque green entry 0, the right half entry 1.
pub fn write_palette_png(path: &Path, width: u32, height: u32) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut encoder = png::Encoder::new(BufWriter::new(File::create(path).unwrap()), width, height);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(vec![0, 160, 0, 0, 0, 0]);
    encoder.set_trns(vec![255, 0]);

    let indices: Vec<u8> = (0..height)
        .flat_map(|_| (0..width).map(|x| if x < width / 2 { 0 } else { 1 }))
        .collect();
    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(&indices).unwrap();
    writer.finish().unwrap();
    path.to_path_buf()
}

pub fn write_garbage(path: &Path) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"this is not an image").unwrap();
    path.to_path_buf()
}

/// Temp workspace with an `images/` source folder.
pub fn create_site() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let images = temp_dir.path().join("images");
    fs::create_dir_all(&images).unwrap();
    (temp_dir, images)
}
