/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Mip chain construction
//!
//! Levels are produced in RGBA32F by averaging the 2x2 parent box in all
//! four channels. Levels the input already carries are copied verbatim,
//! only the missing tail of the chain is synthesized. The chain stops at
//! `max_mips`, the container limit of 16, or once either dimension has
//! reached one pixel.

use envmap_core::format::TextureFormat;
use envmap_core::image::{Image, CUBE_FACE_COUNT, MAX_MIP_COUNT};

use crate::convert::{self, ref_or_convert};
use crate::errors::ImageErrors;

/// Extend an image's mip chain up to `max_mips` levels
pub fn generate_mip_chain(src: &Image, max_mips: u8) -> Result<Image, ImageErrors> {
    let rgba32f = ref_or_convert(src, TextureFormat::RGBA32F)?;
    let pixels = convert::rgba32f_pixels(&rgba32f);

    let width = rgba32f.width();
    let height = rgba32f.height();
    let num_faces = usize::from(rgba32f.num_faces());
    let max_mips = usize::from(max_mips).min(MAX_MIP_COUNT);

    // count the chain and lay out destination offsets, face-major;
    // the loop looks at the previous level's dimensions, so a 1x1 input
    // still yields one level
    let mut offsets = [[0_usize; MAX_MIP_COUNT]; CUBE_FACE_COUNT];
    let mut total_len = 0_usize;
    let mut mip_count = 0_usize;
    for face in 0..num_faces {
        let mut mip_width = 0_u32;
        let mut mip_height = 0_u32;

        mip_count = 0;
        while mip_count < max_mips && mip_width != 1 && mip_height != 1 {
            offsets[face][mip_count] = total_len;
            mip_width = 1.max(width >> mip_count);
            mip_height = 1.max(height >> mip_count);

            total_len += mip_width as usize * mip_height as usize * 4;
            mip_count += 1;
        }
    }

    let mut out = vec![0.0_f32; total_len];

    let src_offsets = rgba32f.mip_offsets();

    for face in 0..num_faces {
        for mip in 0..mip_count {
            let mip_width = 1.max(width >> mip) as usize;
            let mip_height = 1.max(height >> mip) as usize;
            let mip_len = mip_width * mip_height * 4;

            if mip < usize::from(rgba32f.num_mips()) {
                // level already present, copy it over
                let src_start = src_offsets[face][mip] / 4;
                out[offsets[face][mip]..offsets[face][mip] + mip_len]
                    .copy_from_slice(&pixels[src_start..src_start + mip_len]);
                continue;
            }

            // synthesize from the parent level already written to `out`
            let parent_width = 1.max(width >> (mip - 1)) as usize;
            let parent_start = offsets[face][mip - 1];
            let dst_start = offsets[face][mip];

            for y in 0..mip_height {
                for x in 0..mip_width {
                    let mut color = [0.0_f32; 4];
                    for parent_y in (y * 2)..(y * 2 + 2) {
                        for parent_x in (x * 2)..(x * 2 + 2) {
                            let texel =
                                parent_start + (parent_y * parent_width + parent_x) * 4;
                            color[0] += out[texel];
                            color[1] += out[texel + 1];
                            color[2] += out[texel + 2];
                            color[3] += out[texel + 3];
                        }
                    }

                    let dst = dst_start + (y * mip_width + x) * 4;
                    out[dst] = color[0] * 0.25;
                    out[dst + 1] = color[1] * 0.25;
                    out[dst + 2] = color[2] * 0.25;
                    out[dst + 3] = color[3] * 0.25;
                }
            }
        }
    }

    let result = convert::image_from_f32(
        &out,
        width,
        height,
        mip_count as u8,
        rgba32f.num_faces()
    )?;

    convert::convert(&result, src.format())
}
