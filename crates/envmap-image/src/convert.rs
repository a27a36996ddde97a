/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Whole-image format conversion
//!
//! Every cross-format path routes through canonical linear RGBA32F: a
//! conversion between two packed formats unpacks each texel to four
//! floats and re-packs it. Callers already holding RGBA32F data get
//! zero-copy passthroughs via [`ref_or_convert`].

use std::borrow::Cow;

use envmap_core::format::TextureFormat;
use envmap_core::image::Image;
use envmap_core::pixel;

use crate::errors::ImageErrors;

/// Convert an image into canonical RGBA32F
pub fn to_rgba32f(src: &Image) -> Result<Image, ImageErrors> {
    if src.format() == TextureFormat::Unknown {
        return Err(ImageErrors::UnknownFormat);
    }
    if src.format() == TextureFormat::RGBA32F {
        return Ok(src.clone());
    }

    let src_bpp = src.format().bytes_per_pixel();
    let dst_bpp = TextureFormat::RGBA32F.bytes_per_pixel();
    let mut data = vec![0_u8; src.num_pixels() * dst_bpp];

    let mut rgba = [0.0_f32; 4];
    for (texel, out) in src
        .data()
        .chunks_exact(src_bpp)
        .zip(data.chunks_exact_mut(dst_bpp))
    {
        pixel::to_rgba32f(&mut rgba, src.format(), texel);
        pixel::from_rgba32f(out, TextureFormat::RGBA32F, &rgba);
    }

    Image::from_parts(
        data,
        src.width(),
        src.height(),
        TextureFormat::RGBA32F,
        src.num_mips(),
        src.num_faces()
    )
    .map_err(ImageErrors::Generic)
}

/// Pack an RGBA32F image into `format`
pub fn from_rgba32f(src: &Image, format: TextureFormat) -> Result<Image, ImageErrors> {
    debug_assert_eq!(src.format(), TextureFormat::RGBA32F, "source must be RGBA32F");
    if src.format() != TextureFormat::RGBA32F {
        return Err(ImageErrors::Generic("source image is not in RGBA32F format"));
    }
    if format == TextureFormat::Unknown {
        return Err(ImageErrors::UnknownFormat);
    }

    let src_bpp = TextureFormat::RGBA32F.bytes_per_pixel();
    let dst_bpp = format.bytes_per_pixel();
    let mut data = vec![0_u8; src.num_pixels() * dst_bpp];

    let mut rgba = [0.0_f32; 4];
    for (texel, out) in src
        .data()
        .chunks_exact(src_bpp)
        .zip(data.chunks_exact_mut(dst_bpp))
    {
        pixel::to_rgba32f(&mut rgba, TextureFormat::RGBA32F, texel);
        pixel::from_rgba32f(out, format, &rgba);
    }

    Image::from_parts(
        data,
        src.width(),
        src.height(),
        format,
        src.num_mips(),
        src.num_faces()
    )
    .map_err(ImageErrors::Generic)
}

/// Convert an image into `format`
///
/// Matching formats copy through; everything else goes over RGBA32F,
/// with the already-RGBA32F endpoints as single-hop cases.
pub fn convert(src: &Image, format: TextureFormat) -> Result<Image, ImageErrors> {
    if src.format() == format {
        Ok(src.clone())
    } else if src.format() == TextureFormat::RGBA32F {
        from_rgba32f(src, format)
    } else if format == TextureFormat::RGBA32F {
        to_rgba32f(src)
    } else {
        from_rgba32f(&to_rgba32f(src)?, format)
    }
}

/// Convert in place, doing nothing when the format already matches
pub fn convert_in_place(image: &mut Image, format: TextureFormat) -> Result<(), ImageErrors> {
    if image.format() != format {
        *image = convert(image, format)?;
    }
    Ok(())
}

/// Borrow the image when it is already in `format`, otherwise convert
///
/// This is the idiom every higher transform uses to avoid a redundant
/// copy of data that already has the right shape.
pub fn ref_or_convert(src: &Image, format: TextureFormat) -> Result<Cow<'_, Image>, ImageErrors> {
    if src.format() == format {
        Ok(Cow::Borrowed(src))
    } else {
        Ok(Cow::Owned(convert(src, format)?))
    }
}

/// Read an RGBA32F image's pixel bytes into a float vector
pub fn rgba32f_pixels(image: &Image) -> Vec<f32> {
    debug_assert_eq!(image.format(), TextureFormat::RGBA32F);
    image
        .data()
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Assemble an RGBA32F image from a float vector
pub fn image_from_f32(
    pixels: &[f32], width: u32, height: u32, num_mips: u8, num_faces: u8
) -> Result<Image, ImageErrors> {
    let mut data = Vec::with_capacity(pixels.len() * 4);
    for value in pixels {
        data.extend_from_slice(&value.to_le_bytes());
    }
    Image::from_parts(data, width, height, TextureFormat::RGBA32F, num_mips, num_faces)
        .map_err(ImageErrors::Generic)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba8_image() -> Image {
        let data: Vec<u8> = (0..4 * 2 * 2).map(|i| (i * 11) as u8).collect();
        Image::from_parts(data, 2, 2, TextureFormat::RGBA8, 1, 1).unwrap()
    }

    #[test]
    fn convert_to_same_format_is_identity() {
        let image = rgba8_image();
        let converted = convert(&image, TextureFormat::RGBA8).unwrap();
        assert_eq!(converted.data(), image.data());
    }

    #[test]
    fn rgba8_roundtrip_through_rgba32f_is_exact() {
        let image = rgba8_image();
        let wide = convert(&image, TextureFormat::RGBA32F).unwrap();
        let back = convert(&wide, TextureFormat::RGBA8).unwrap();
        assert_eq!(back.data(), image.data());
    }

    #[test]
    fn rgba8_to_bgra8_swaps_channels() {
        let image = Image::from_parts(vec![1, 2, 3, 4], 1, 1, TextureFormat::RGBA8, 1, 1).unwrap();
        let swapped = convert(&image, TextureFormat::BGRA8).unwrap();
        assert_eq!(swapped.data(), &[3, 2, 1, 4]);
    }

    #[test]
    fn ref_or_convert_borrows_matching_format() {
        let image = rgba8_image();
        assert!(matches!(
            ref_or_convert(&image, TextureFormat::RGBA8).unwrap(),
            Cow::Borrowed(_)
        ));
        assert!(matches!(
            ref_or_convert(&image, TextureFormat::RGBA32F).unwrap(),
            Cow::Owned(_)
        ));
    }

    #[test]
    fn float_view_roundtrip() {
        let image = convert(&rgba8_image(), TextureFormat::RGBA32F).unwrap();
        let floats = rgba32f_pixels(&image);
        assert_eq!(floats.len(), 16);

        let rebuilt = image_from_f32(&floats, 2, 2, 1, 1).unwrap();
        assert_eq!(rebuilt.data(), image.data());
    }
}
