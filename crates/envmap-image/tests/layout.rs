/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Cubemap layout transform round trips

use envmap_core::image::byte_size;
use envmap_image::convert::{image_from_f32, rgba32f_pixels};
use envmap_image::cubemap::{
    cross_from_cubemap, cubemap_from_cross, cubemap_from_face_list, cubemap_from_hstrip,
    cubemap_from_latlong, face_list_from_cubemap, hstrip_from_cubemap, is_cube_cross,
    latlong_from_cubemap
};
use envmap_image::{Image, TextureFormat};

/// A cubemap whose pixel bytes form one long distinct sequence
fn gradient_cube(size: u32, num_mips: u8, format: TextureFormat) -> Image {
    let len = byte_size(size, size, format, num_mips, 6);
    let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    Image::from_parts(data, size, size, format, num_mips, 6).unwrap()
}

#[test]
fn cross_roundtrip_vertical_and_horizontal() {
    let cube = gradient_cube(8, 1, TextureFormat::RGBA8);

    for vertical in [true, false] {
        let cross = cross_from_cubemap(&cube, vertical).unwrap();
        assert_eq!(cross.num_faces(), 1);
        if vertical {
            assert_eq!(cross.dimensions(), (24, 32));
        } else {
            assert_eq!(cross.dimensions(), (32, 24));
        }

        let back = cubemap_from_cross(&cross).unwrap();
        assert_eq!(back.dimensions(), (8, 8));
        assert_eq!(back.num_faces(), 6);
        assert_eq!(back.data(), cube.data());
    }
}

#[test]
fn cross_detection() {
    let cube = gradient_cube(16, 1, TextureFormat::RGBA8);
    let cross = cross_from_cubemap(&cube, false).unwrap();

    assert_eq!(cross.dimensions(), (64, 48));
    assert!(is_cube_cross(&cross));

    let folded = cubemap_from_cross(&cross).unwrap();
    assert_eq!(folded.dimensions(), (16, 16));
    assert_eq!(folded.num_faces(), 6);

    // a plain 4:3 image with bright corners is not a cross
    let bright = Image::from_parts(vec![200_u8; 64 * 48 * 4], 64, 48, TextureFormat::RGBA8, 1, 1)
        .unwrap();
    assert!(!is_cube_cross(&bright));

    // and a cubemap is never one
    assert!(!is_cube_cross(&cube));
}

#[test]
fn cross_background_is_opaque_black() {
    let cube = gradient_cube(4, 1, TextureFormat::RGBA8);
    let cross = cross_from_cubemap(&cube, true).unwrap();

    // top-left cell of the vertical cross is empty
    let texel = &cross.data()[..4];
    assert_eq!(texel, &[0, 0, 0, 255]);
}

#[test]
fn cross_keeps_the_mip_chain() {
    let cube = gradient_cube(8, 3, TextureFormat::BGRA8);
    let cross = cross_from_cubemap(&cube, false).unwrap();
    assert_eq!(cross.num_mips(), 3);
    assert_eq!(
        cross.data_size(),
        byte_size(32, 24, TextureFormat::BGRA8, 3, 1)
    );
}

#[test]
fn hstrip_roundtrip() {
    let cube = gradient_cube(8, 4, TextureFormat::RGB16);

    let strip = hstrip_from_cubemap(&cube).unwrap();
    assert_eq!(strip.dimensions(), (48, 8));
    assert_eq!(strip.num_faces(), 1);
    assert_eq!(strip.num_mips(), 4);
    assert!(strip.is_hstrip());

    let back = cubemap_from_hstrip(&strip).unwrap();
    assert_eq!(back.dimensions(), (8, 8));
    assert_eq!(back.num_faces(), 6);
    assert_eq!(back.data(), cube.data());
}

#[test]
fn face_list_roundtrip() {
    let cube = gradient_cube(8, 2, TextureFormat::RGBA16F);

    let faces = face_list_from_cubemap(&cube).unwrap();
    assert_eq!(faces.len(), 6);
    for face in &faces {
        assert_eq!(face.num_faces(), 1);
        assert_eq!(face.num_mips(), 2);
        assert_eq!(face.dimensions(), (8, 8));
    }

    let back = cubemap_from_face_list(&faces).unwrap();
    assert_eq!(back.data(), cube.data());
}

#[test]
fn face_list_join_validates_shapes() {
    let cube = gradient_cube(8, 1, TextureFormat::RGBA8);
    let mut faces = face_list_from_cubemap(&cube).unwrap();

    faces[3] = Image::from_parts(vec![0; 4 * 4 * 4], 4, 4, TextureFormat::RGBA8, 1, 1).unwrap();
    assert!(cubemap_from_face_list(&faces).is_err());
}

#[test]
fn latlong_cubemap_latlong_roundtrip_error_bound() {
    // synthesize a 512x256 lat-long map holding its own (u, v) in R and G
    let width = 512_usize;
    let height = 256_usize;
    let mut pixels = vec![0.0_f32; width * height * 4];
    for y in 0..height {
        for x in 0..width {
            let texel = (y * width + x) * 4;
            pixels[texel] = x as f32 / (width - 1) as f32;
            pixels[texel + 1] = y as f32 / (height - 1) as f32;
            pixels[texel + 3] = 1.0;
        }
    }
    let latlong = image_from_f32(&pixels, width as u32, height as u32, 1, 1).unwrap();

    let cube = cubemap_from_latlong(&latlong, true).unwrap();
    assert_eq!(cube.dimensions(), (128, 128));
    assert_eq!(cube.num_faces(), 6);

    let back = latlong_from_cubemap(&cube, true).unwrap();
    assert_eq!(back.dimensions(), (512, 256));
    assert_eq!(back.num_faces(), 1);

    let result = rgba32f_pixels(&back);
    let mut error_sum = 0.0_f64;
    let mut samples = 0_u64;
    for (texel, original) in result.chunks_exact(4).zip(pixels.chunks_exact(4)) {
        // R carries longitude, which wraps; compare on the circle
        let du = (texel[0] - original[0]).abs();
        error_sum += f64::from(du.min(1.0 - du));
        error_sum += f64::from((texel[1] - original[1]).abs());
        samples += 2;
    }

    let average_error = error_sum / samples as f64;
    assert!(
        average_error < 2e-2,
        "average per-channel error {average_error} too large"
    );
}

#[test]
fn latlong_rejects_wrong_aspect() {
    let square =
        Image::from_parts(vec![0; 16 * 16 * 4], 16, 16, TextureFormat::RGBA8, 1, 1).unwrap();
    assert!(cubemap_from_latlong(&square, false).is_err());

    let flat = Image::from_parts(vec![0; 8 * 4 * 4], 8, 4, TextureFormat::RGBA8, 1, 1).unwrap();
    assert!(latlong_from_cubemap(&flat, false).is_err());
}
