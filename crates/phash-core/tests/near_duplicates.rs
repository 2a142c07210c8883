//! End-to-end checks on encoded files: re-encoding and resizing keep hashes
//! close, structural edits move them apart.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use phash_core::{group_near_duplicates, hash_bytes, Config, HashProcessor};
use std::io::Cursor;

fn landscape(width: u32, height: u32) -> DynamicImage {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        let u = (x as f64 + 0.5) / width as f64;
        let v = (y as f64 + 0.5) / height as f64;
        let sky = if v < 0.4 { 60.0 } else { 0.0 };
        let hill = 40.0 * (-((u - 0.7).powi(2) + (v - 0.5).powi(2)) * 12.0).exp();
        let value = 30.0 + 120.0 * u + 50.0 * v + sky + hill;
        Rgb([value as u8, (value * 0.9) as u8, (value * 0.6) as u8])
    });
    DynamicImage::ImageRgb8(img)
}

fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Vec<u8> {
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    image.to_rgb8().write_with_encoder(encoder).unwrap();
    bytes
}

#[test]
fn recompression_keeps_hash_close() {
    let img = landscape(200, 150);
    let png = hash_bytes(&encode(&img, ImageFormat::Png)).unwrap();
    let jpeg = hash_bytes(&encode_jpeg(&img, 60)).unwrap();
    assert!(png.distance(jpeg) <= 10, "{png} vs {jpeg}");
}

#[test]
fn resolution_and_format_changes_keep_hash_close() {
    let small = hash_bytes(&encode(&landscape(64, 64), ImageFormat::Png)).unwrap();
    let large = hash_bytes(&encode(&landscape(256, 256), ImageFormat::Bmp)).unwrap();
    assert!(small.distance(large) <= 10, "{small} vs {large}");
}

#[test]
fn structural_edit_moves_hash_away() {
    let img = landscape(128, 128);
    let original = hash_bytes(&encode(&img, ImageFormat::Png)).unwrap();
    let rotated = hash_bytes(&encode(&img.rotate180(), ImageFormat::Png)).unwrap();
    assert!(original.distance(rotated) > 10, "{original} vs {rotated}");
}

#[test]
fn uniform_gray_file_hashes_to_zero() {
    let gray = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(32, 32, Rgb([128, 128, 128])));
    let hash = hash_bytes(&encode(&gray, ImageFormat::Png)).unwrap();
    assert_eq!(hash.to_string(), "0000000000000000");
}

#[tokio::test]
async fn processor_groups_copies_of_the_same_picture() {
    let dir = tempfile::tempdir().unwrap();
    let img = landscape(160, 120);
    std::fs::write(dir.path().join("a_original.png"), encode(&img, ImageFormat::Png)).unwrap();
    std::fs::write(dir.path().join("b_copy.jpg"), encode_jpeg(&img, 75)).unwrap();
    std::fs::write(
        dir.path().join("c_thumb.png"),
        encode(&landscape(80, 60), ImageFormat::Png),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("d_other.png"),
        encode(&img.rotate180(), ImageFormat::Png),
    )
    .unwrap();

    let config = Config::default();
    let processor = HashProcessor::new(&config);
    let files = processor.discover(dir.path());
    assert_eq!(files.len(), 4);

    let mut records = Vec::new();
    for file in &files {
        records.push(processor.process(&file.path).await.unwrap());
    }

    let groups = group_near_duplicates(&records, config.hash.similarity_threshold);
    assert_eq!(groups.len(), 1);
    let names: Vec<_> = groups[0]
        .files
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["a_original.png", "b_copy.jpg", "c_thumb.png"]);
}
