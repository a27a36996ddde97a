/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Gamma and clamp sweeps
//!
//! Both run in RGBA32F; an image stored in another format is converted,
//! swept, and converted back.

use envmap_core::format::TextureFormat;
use envmap_core::image::Image;

use crate::convert;
use crate::errors::ImageErrors;

/// Apply `op` to every RGBA32F texel of the image, converting through
/// RGBA32F when the image is stored in another format
fn for_each_texel(
    image: &mut Image, op: impl Fn(&mut [f32; 4])
) -> Result<(), ImageErrors> {
    let source_format = image.format();
    convert::convert_in_place(image, TextureFormat::RGBA32F)?;

    for texel in image.data_mut().chunks_exact_mut(16) {
        let mut rgba = [0.0_f32; 4];
        for (channel, chunk) in texel.chunks_exact(4).enumerate() {
            rgba[channel] = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        op(&mut rgba);

        for (channel, chunk) in texel.chunks_exact_mut(4).enumerate() {
            chunk.copy_from_slice(&rgba[channel].to_le_bytes());
        }
    }

    convert::convert_in_place(image, source_format)
}

/// Raise each RGB channel to `gamma`, leaving alpha untouched
///
/// A gamma within `1e-4` of 1.0 is a no-op.
pub fn apply_gamma(image: &mut Image, gamma: f32) -> Result<(), ImageErrors> {
    if (gamma - 1.0).abs() < 0.0001 {
        return Ok(());
    }

    for_each_texel(image, |rgba| {
        rgba[0] = rgba[0].powf(gamma);
        rgba[1] = rgba[1].powf(gamma);
        rgba[2] = rgba[2].powf(gamma);
        // alpha channel stays as is
    })
}

/// Clamp all four channels to `[0, 1]`
pub fn clamp(image: &mut Image) -> Result<(), ImageErrors> {
    for_each_texel(image, |rgba| {
        for channel in rgba {
            *channel = channel.clamp(0.0, 1.0);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{image_from_f32, rgba32f_pixels};

    #[test]
    fn gamma_of_one_is_a_noop() {
        let mut image = image_from_f32(&[0.25, 0.5, 0.75, 0.5], 1, 1, 1, 1).unwrap();
        let before = image.data().to_vec();
        apply_gamma(&mut image, 1.00005).unwrap();
        assert_eq!(image.data(), before.as_slice());
    }

    #[test]
    fn gamma_squares_channels() {
        let mut image = image_from_f32(&[0.5, 0.25, 1.0, 0.5], 1, 1, 1, 1).unwrap();
        apply_gamma(&mut image, 2.0).unwrap();

        let pixels = rgba32f_pixels(&image);
        assert_eq!(&pixels[..3], &[0.25, 0.0625, 1.0]);
        // alpha untouched
        assert_eq!(pixels[3], 0.5);
    }

    #[test]
    fn clamp_is_idempotent() {
        let mut image = image_from_f32(&[-1.0, 0.5, 3.0, 2.0], 1, 1, 1, 1).unwrap();
        clamp(&mut image).unwrap();

        let once = image.data().to_vec();
        assert_eq!(rgba32f_pixels(&image), [0.0, 0.5, 1.0, 1.0]);

        clamp(&mut image).unwrap();
        assert_eq!(image.data(), once.as_slice());
    }

    #[test]
    fn non_float_images_convert_back() {
        let mut image =
            Image::from_parts(vec![128, 128, 128, 255], 1, 1, TextureFormat::RGBA8, 1, 1).unwrap();
        apply_gamma(&mut image, 2.0).unwrap();

        assert_eq!(image.format(), TextureFormat::RGBA8);
        // (128/255)^2 * 255, truncated
        assert_eq!(image.data()[0], 64);
        assert_eq!(image.data()[3], 255);
    }
}
