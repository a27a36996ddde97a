/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! End-to-end save/load round trips through real files

use std::path::PathBuf;

use envmap_core::image::byte_size;
use envmap_image::codecs::{load, save};
use envmap_image::convert;
use envmap_image::{Image, ImageFileType, TextureFormat};

fn temp_stem(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("envmap-{}-{name}", std::process::id()))
}

#[test]
fn dds_cubemap_roundtrip() {
    // 4x4 six-face RGBA8 cubemap with one solid color per face
    let colors: [[u8; 4]; 6] = [
        [255, 0, 0, 255],   // red
        [0, 255, 0, 255],   // green
        [0, 0, 255, 255],   // blue
        [255, 255, 0, 255], // yellow
        [0, 255, 255, 255], // cyan
        [255, 0, 255, 255], // magenta
    ];
    let mut data = Vec::new();
    for color in colors {
        for _ in 0..16 {
            data.extend_from_slice(&color);
        }
    }
    let cube = Image::from_parts(data, 4, 4, TextureFormat::RGBA8, 1, 6).unwrap();

    // RGBA8 is not DDS-admissible, route through BGRA8 and back
    let path = save(&cube, temp_stem("cube"), ImageFileType::DDS, Some(TextureFormat::BGRA8))
        .unwrap();
    assert_eq!(path.extension().unwrap(), "dds");

    let loaded = load(&path, None).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.format(), TextureFormat::BGRA8);
    assert_eq!(loaded.num_faces(), 6);
    assert_eq!(loaded.num_mips(), 1);
    assert_eq!(loaded.dimensions(), (4, 4));

    let back = convert::convert(&loaded, TextureFormat::RGBA8).unwrap();
    assert_eq!(back.data(), cube.data());
}

#[test]
fn ktx_save_then_load_is_bit_identical() {
    let len = byte_size(8, 8, TextureFormat::RGBA16F, 4, 6);
    let data: Vec<u8> = (0..len).map(|i| (i % 253) as u8).collect();
    let cube = Image::from_parts(data, 8, 8, TextureFormat::RGBA16F, 4, 6).unwrap();

    let path = save(&cube, temp_stem("chain"), ImageFileType::KTX, None).unwrap();
    let loaded = load(&path, None).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.format(), TextureFormat::RGBA16F);
    assert_eq!(loaded.num_faces(), 6);
    assert_eq!(loaded.num_mips(), 4);
    assert_eq!(loaded.data(), cube.data());
}

#[test]
fn hdr_save_then_load_preserves_rgbe_bytes() {
    let data: Vec<u8> = (0..16 * 8 * 4).map(|i| (i * 3 % 256) as u8).collect();
    let image = Image::from_parts(data.clone(), 16, 8, TextureFormat::RGBE, 1, 1).unwrap();

    let path = save(&image, temp_stem("probe"), ImageFileType::HDR, None).unwrap();
    let loaded = load(&path, None).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.format(), TextureFormat::RGBE);
    assert_eq!(loaded.dimensions(), (16, 8));
    assert_eq!(loaded.data(), data.as_slice());
}

#[test]
fn tga_save_then_load_reproduces_pixels() {
    // three red pixels and a green one, BGR order
    let data = vec![
        0, 0, 255, 0, 0, 255, 0, 0, 255, 0, 255, 0, //
    ];
    let image = Image::from_parts(data.clone(), 4, 1, TextureFormat::BGR8, 1, 1).unwrap();

    let path = save(&image, temp_stem("rle"), ImageFileType::TGA, None).unwrap();
    let loaded = load(&path, None).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.format(), TextureFormat::BGR8);
    assert_eq!(loaded.data(), data.as_slice());
}

#[test]
fn load_converts_on_request() {
    let data = vec![10_u8, 20, 30, 40];
    let image = Image::from_parts(data, 1, 1, TextureFormat::BGRA8, 1, 1).unwrap();

    let path = save(&image, temp_stem("convert"), ImageFileType::TGA, None).unwrap();
    let loaded = load(&path, Some(TextureFormat::RGBA8)).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.format(), TextureFormat::RGBA8);
    assert_eq!(loaded.data(), &[30, 20, 10, 40]);
}

#[test]
fn unknown_files_are_rejected() {
    let path = temp_stem("unknown").with_extension("bin");
    std::fs::write(&path, b"not an image at all").unwrap();

    let result = load(&path, None);
    std::fs::remove_file(&path).unwrap();
    assert!(result.is_err());
}
