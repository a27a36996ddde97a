/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Image resizing
//!
//! Works in RGBA32F. For each destination texel the source box anchored
//! at the truncated source coordinate is averaged, with a step of
//! `max(1, floor(src/dst))` per axis, so downsampling box-filters and
//! upsampling repeats the nearest source texel. Only the RGB channels are
//! averaged; alpha is forced to 1.0.
//!
//! Faces are resized independently from their base level; the result
//! carries a single mip level and is converted back to the source format.

use envmap_core::image::Image;

use crate::convert::{self, ref_or_convert};
use crate::errors::ImageErrors;
use envmap_core::format::TextureFormat;

/// Resize an image to `new_width` x `new_height`
pub fn resize(src: &Image, new_width: u32, new_height: u32) -> Result<Image, ImageErrors> {
    if new_width == 0 || new_height == 0 {
        return Err(ImageErrors::Generic("cannot resize to a zero dimension"));
    }

    let rgba32f = ref_or_convert(src, TextureFormat::RGBA32F)?;
    let pixels = convert::rgba32f_pixels(&rgba32f);

    let src_width = rgba32f.width() as usize;
    let src_height = rgba32f.height() as usize;
    let dst_width = new_width as usize;
    let dst_height = new_height as usize;
    let num_faces = usize::from(rgba32f.num_faces());

    let dst_face_len = dst_width * dst_height * 4;
    let mut out = vec![0.0_f32; dst_face_len * num_faces];

    let ratio_x = src_width as f32 / dst_width as f32;
    let ratio_y = src_height as f32 / dst_height as f32;
    let step_x = 1.max(ratio_x as usize);
    let step_y = 1.max(ratio_y as usize);

    let face_offsets = rgba32f.face_offsets();

    for face in 0..num_faces {
        // face offsets are in bytes, the float view divides by four
        let src_face = &pixels[face_offsets[face] / 4..];
        let dst_face = &mut out[face * dst_face_len..(face + 1) * dst_face_len];

        for y_dst in 0..dst_height {
            let y_src = (y_dst as f32 * ratio_y) as usize;

            for x_dst in 0..dst_width {
                let x_src = (x_dst as f32 * ratio_x) as usize;

                let mut color = [0.0_f32; 3];
                let mut weight = 0_usize;

                for y in y_src..(y_src + step_y).min(src_height) {
                    for x in x_src..(x_src + step_x).min(src_width) {
                        let texel = &src_face[(y * src_width + x) * 4..];
                        color[0] += texel[0];
                        color[1] += texel[1];
                        color[2] += texel[2];
                        weight += 1;
                    }
                }

                let inv_weight = 1.0 / 1.max(weight) as f32;
                let dst = &mut dst_face[(y_dst * dst_width + x_dst) * 4..];
                dst[0] = color[0] * inv_weight;
                dst[1] = color[1] * inv_weight;
                dst[2] = color[2] * inv_weight;
                dst[3] = 1.0;
            }
        }
    }

    let result =
        convert::image_from_f32(&out, new_width, new_height, 1, rgba32f.num_faces())?;

    convert::convert(&result, src.format())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{image_from_f32, rgba32f_pixels};

    fn flat_rgba32f(pixels: &[[f32; 4]], width: u32, height: u32) -> Image {
        let flat: Vec<f32> = pixels.iter().flatten().copied().collect();
        image_from_f32(&flat, width, height, 1, 1).unwrap()
    }

    #[test]
    fn downsample_to_single_pixel_averages() {
        let image = flat_rgba32f(
            &[
                [0.0, 0.0, 0.0, 1.0],
                [1.0, 0.0, 0.5, 1.0],
                [0.0, 1.0, 0.5, 1.0],
                [1.0, 1.0, 1.0, 1.0]
            ],
            2,
            2
        );

        let small = resize(&image, 1, 1).unwrap();
        assert_eq!(small.dimensions(), (1, 1));
        assert_eq!(small.num_mips(), 1);

        let result = rgba32f_pixels(&small);
        assert_eq!(&result[..3], &[0.5, 0.5, 0.5]);
        assert_eq!(result[3], 1.0);
    }

    #[test]
    fn upsample_repeats_nearest() {
        let image = flat_rgba32f(&[[0.25, 0.5, 0.75, 1.0]], 1, 1);
        let big = resize(&image, 2, 2).unwrap();

        let result = rgba32f_pixels(&big);
        for texel in result.chunks_exact(4) {
            assert_eq!(texel, &[0.25, 0.5, 0.75, 1.0]);
        }
    }

    #[test]
    fn converts_back_to_source_format() {
        let data: Vec<u8> = (0..4 * 4 * 4).map(|i| i as u8).collect();
        let image =
            Image::from_parts(data, 4, 4, TextureFormat::RGBA8, 1, 1).unwrap();

        let resized = resize(&image, 2, 2).unwrap();
        assert_eq!(resized.format(), TextureFormat::RGBA8);
        assert_eq!(resized.dimensions(), (2, 2));
    }

    #[test]
    fn faces_are_resized_independently() {
        // 2x2 cube with distinct per-face values
        let mut pixels = Vec::new();
        for face in 0..6 {
            for _ in 0..4 {
                pixels.extend_from_slice(&[face as f32, 0.0, 0.0, 1.0]);
            }
        }
        let cube = image_from_f32(&pixels, 2, 2, 1, 6).unwrap();

        let resized = resize(&cube, 1, 1).unwrap();
        let result = rgba32f_pixels(&resized);
        for face in 0..6 {
            assert_eq!(result[face * 4], face as f32);
        }
    }
}
