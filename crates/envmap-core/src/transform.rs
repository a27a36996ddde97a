/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! In-place face rotations and flips
//!
//! Each operation is a 32-bit word: bits `0..16` carry the operation mask,
//! bits `16..19` the face index. Several mask bits may be combined in one
//! word; they apply in mask-bit order. A sequence of words applies left to
//! right.
//!
//! Rotations are in-place square-swap patterns and therefore require
//! `width == height`; a rotation requested on a non-square image is
//! skipped with a warning. Flips carry no such requirement.

use log::warn;

use crate::image::Image;

/// Reflect the face across its anti-diagonal
pub const OP_ROT_90: u32 = 0x1;
/// Rotate the face by 180 degrees
pub const OP_ROT_180: u32 = 0x2;
/// Reflect the face across its main diagonal
pub const OP_ROT_270: u32 = 0x4;
/// Reverse the row order (swap whole rows)
pub const OP_FLIP_X: u32 = 0x8;
/// Reverse the columns within each row
pub const OP_FLIP_Y: u32 = 0x10;

/// Bits of an op word holding the operation mask
pub const OP_MASK: u32 = 0xFFFF;
/// Shift of the face index inside an op word
pub const FACE_SHIFT: u32 = 16;
/// Bits of an op word holding the face index
pub const FACE_MASK: u32 = 0x7 << FACE_SHIFT;

/// Combine a face index and an operation mask into one op word
pub const fn face_op(face: u8, op: u32) -> u32 {
    ((face as u32) << FACE_SHIFT) | (op & OP_MASK)
}

#[inline]
fn swap_texels(data: &mut [u8], a: usize, b: usize, len: usize) {
    for k in 0..len {
        data.swap(a + k, b + k);
    }
}

fn rotate_90(data: &mut [u8], offset: usize, size: usize, bytes_per_pixel: usize) {
    let pitch = size * bytes_per_pixel;
    for yy in 0..size {
        let yy_end = size - 1 - yy;
        for xx in 0..yy_end {
            let xx_end = size - 1 - xx;
            let a = offset + yy * pitch + xx * bytes_per_pixel;
            let b = offset + yy_end * bytes_per_pixel + xx_end * pitch;
            swap_texels(data, a, b, bytes_per_pixel);
        }
    }
}

fn rotate_180(data: &mut [u8], offset: usize, width: usize, height: usize, bytes_per_pixel: usize) {
    let pitch = width * bytes_per_pixel;

    let mut yy = 0;
    let mut yy_end = height - 1;
    while yy < yy_end {
        for xx in 0..width {
            let xx_end = width - 1 - xx;
            let a = offset + yy * pitch + xx * bytes_per_pixel;
            let b = offset + yy_end * pitch + xx_end * bytes_per_pixel;
            swap_texels(data, a, b, bytes_per_pixel);
        }
        yy += 1;
        yy_end -= 1;
    }

    // odd height leaves a middle row to reverse on its own
    if yy == yy_end {
        let row = offset + yy * pitch;
        let mut xx = 0;
        let mut xx_end = width - 1;
        while xx < xx_end {
            swap_texels(
                data,
                row + xx * bytes_per_pixel,
                row + xx_end * bytes_per_pixel,
                bytes_per_pixel
            );
            xx += 1;
            xx_end -= 1;
        }
    }
}

fn rotate_270(data: &mut [u8], offset: usize, size: usize, bytes_per_pixel: usize) {
    let pitch = size * bytes_per_pixel;
    for yy in 0..size {
        for xx in (yy + 1)..size {
            let a = offset + yy * pitch + xx * bytes_per_pixel;
            let b = offset + yy * bytes_per_pixel + xx * pitch;
            swap_texels(data, a, b, bytes_per_pixel);
        }
    }
}

fn flip_x(data: &mut [u8], offset: usize, width: usize, height: usize, bytes_per_pixel: usize) {
    let pitch = width * bytes_per_pixel;
    let mut yy = 0;
    let mut yy_end = height - 1;
    while yy < yy_end {
        swap_texels(data, offset + yy * pitch, offset + yy_end * pitch, pitch);
        yy += 1;
        yy_end -= 1;
    }
}

fn flip_y(data: &mut [u8], offset: usize, width: usize, height: usize, bytes_per_pixel: usize) {
    let pitch = width * bytes_per_pixel;
    for yy in 0..height {
        let row = offset + yy * pitch;
        let mut xx = 0;
        let mut xx_end = width - 1;
        while xx < xx_end {
            swap_texels(
                data,
                row + xx * bytes_per_pixel,
                row + xx_end * bytes_per_pixel,
                bytes_per_pixel
            );
            xx += 1;
            xx_end -= 1;
        }
    }
}

/// Apply a sequence of in-place rotations/flips to the selected faces
///
/// Every operation is applied to all mip levels of its face. Rotations on
/// a non-square image are skipped with a warning, they are not fatal.
pub fn transform(image: &mut Image, ops: &[u32]) {
    let bytes_per_pixel = image.format().bytes_per_pixel();
    let offsets = image.mip_offsets();
    let (width, height) = image.dimensions();
    let num_mips = image.num_mips();
    let num_faces = image.num_faces();
    let square = width == height;

    for &word in ops {
        let op = word & OP_MASK;
        let face = ((word & FACE_MASK) >> FACE_SHIFT) as u8;

        if face >= num_faces {
            warn!("Transform requested on face {face} of a {num_faces}-face image, skipping.");
            continue;
        }

        if op & (OP_ROT_90 | OP_ROT_180 | OP_ROT_270) != 0 && !square {
            warn!(
                "Image data transformation is done in place, rotation operations \
                 work only when image width is equal to image height. Skipping rotation."
            );
        }

        for mip in 0..num_mips {
            let (mip_width, mip_height) = image.mip_dimensions(mip);
            let (mip_width, mip_height) = (mip_width as usize, mip_height as usize);
            let offset = offsets[usize::from(face)][usize::from(mip)];
            let data = image.data_mut();

            if square {
                if op & OP_ROT_90 != 0 {
                    rotate_90(data, offset, mip_width, bytes_per_pixel);
                }
                if op & OP_ROT_180 != 0 {
                    rotate_180(data, offset, mip_width, mip_height, bytes_per_pixel);
                }
                if op & OP_ROT_270 != 0 {
                    rotate_270(data, offset, mip_width, bytes_per_pixel);
                }
            }
            if op & OP_FLIP_X != 0 {
                flip_x(data, offset, mip_width, mip_height, bytes_per_pixel);
            }
            if op & OP_FLIP_Y != 0 {
                flip_y(data, offset, mip_width, mip_height, bytes_per_pixel);
            }
        }
    }
}
