/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Per-pixel converters between native texel bytes and canonical RGBA32F
//!
//! Every cross-format operation in the library routes through linear
//! RGBA32F, these two functions are that hinge.
//!
//! Conversion semantics
//! - unsigned channels map to `c / max`, the reverse path clamps to
//!   `[0, 1]` and truncates
//! - half floats go through [`half::f16`]
//! - a missing alpha channel unpacks as `1.0`, an extra alpha is dropped
//!   on pack
//! - multi-byte channels are little endian in memory, matching the wire
//!   order of every supported container

use half::f16;

use crate::format::TextureFormat;

#[inline]
fn u16_at(src: &[u8], channel: usize) -> u16 {
    u16::from_le_bytes([src[channel * 2], src[channel * 2 + 1]])
}

#[inline]
fn f32_at(src: &[u8], channel: usize) -> f32 {
    f32::from_le_bytes([
        src[channel * 4],
        src[channel * 4 + 1],
        src[channel * 4 + 2],
        src[channel * 4 + 3]
    ])
}

#[inline]
fn unorm8(byte: u8) -> f32 {
    f32::from(byte) * (1.0 / 255.0)
}

#[inline]
fn unorm16(value: u16) -> f32 {
    f32::from(value) * (1.0 / 65535.0)
}

#[inline]
fn to_unorm8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

#[inline]
fn to_unorm16(value: f32) -> u16 {
    (value.clamp(0.0, 1.0) * 65535.0) as u16
}

/// Unpack one RGBE texel
///
/// A zero exponent byte decodes to transparent-less black `(0,0,0,1)`,
/// otherwise each mantissa byte is scaled by `2^(E - 128 - 8)`.
#[inline]
pub fn rgbe_to_rgba32f(out: &mut [f32; 4], rgbe: &[u8]) {
    if rgbe[3] != 0 {
        let exp = f32::from(i16::from(rgbe[3]) - (128 + 8)).exp2();
        out[0] = f32::from(rgbe[0]) * exp;
        out[1] = f32::from(rgbe[1]) * exp;
        out[2] = f32::from(rgbe[2]) * exp;
        out[3] = 1.0;
    } else {
        out[0] = 0.0;
        out[1] = 0.0;
        out[2] = 0.0;
        out[3] = 1.0;
    }
}

/// Pack one RGBA32F pixel into RGBE
///
/// The shared exponent is `ceil(log2(max(r,g,b)))` clamped so the biased
/// byte fits; mantissas are scaled by `255 / 2^E` and truncated. A
/// non-positive or non-finite maximum packs to all-zero bytes.
#[inline]
pub fn rgba32f_to_rgbe(out: &mut [u8], rgba: &[f32; 4]) {
    let max_val = rgba[0].max(rgba[1]).max(rgba[2]);

    if max_val > 0.0 && max_val.is_finite() {
        let exp = max_val.log2().ceil().clamp(-128.0, 127.0);
        let to_rgb8 = 255.0 * (-exp).exp2();
        out[0] = (rgba[0] * to_rgb8) as u8;
        out[1] = (rgba[1] * to_rgb8) as u8;
        out[2] = (rgba[2] * to_rgb8) as u8;
        out[3] = (exp + 128.0) as u8;
    } else {
        out[..4].fill(0);
    }
}

/// Unpack one native texel at the start of `src` into canonical RGBA32F
///
/// `src` must hold at least `format.bytes_per_pixel()` bytes.
pub fn to_rgba32f(out: &mut [f32; 4], format: TextureFormat, src: &[u8]) {
    match format {
        TextureFormat::BGR8 => {
            out[0] = unorm8(src[2]);
            out[1] = unorm8(src[1]);
            out[2] = unorm8(src[0]);
            out[3] = 1.0;
        }
        TextureFormat::RGB8 => {
            out[0] = unorm8(src[0]);
            out[1] = unorm8(src[1]);
            out[2] = unorm8(src[2]);
            out[3] = 1.0;
        }
        TextureFormat::RGB16 => {
            out[0] = unorm16(u16_at(src, 0));
            out[1] = unorm16(u16_at(src, 1));
            out[2] = unorm16(u16_at(src, 2));
            out[3] = 1.0;
        }
        TextureFormat::RGB16F => {
            out[0] = f16::from_bits(u16_at(src, 0)).to_f32();
            out[1] = f16::from_bits(u16_at(src, 1)).to_f32();
            out[2] = f16::from_bits(u16_at(src, 2)).to_f32();
            out[3] = 1.0;
        }
        TextureFormat::RGB32F => {
            out[0] = f32_at(src, 0);
            out[1] = f32_at(src, 1);
            out[2] = f32_at(src, 2);
            out[3] = 1.0;
        }
        TextureFormat::RGBE => rgbe_to_rgba32f(out, src),
        TextureFormat::BGRA8 => {
            out[0] = unorm8(src[2]);
            out[1] = unorm8(src[1]);
            out[2] = unorm8(src[0]);
            out[3] = unorm8(src[3]);
        }
        TextureFormat::RGBA8 => {
            out[0] = unorm8(src[0]);
            out[1] = unorm8(src[1]);
            out[2] = unorm8(src[2]);
            out[3] = unorm8(src[3]);
        }
        TextureFormat::RGBA16 => {
            out[0] = unorm16(u16_at(src, 0));
            out[1] = unorm16(u16_at(src, 1));
            out[2] = unorm16(u16_at(src, 2));
            out[3] = unorm16(u16_at(src, 3));
        }
        TextureFormat::RGBA16F => {
            out[0] = f16::from_bits(u16_at(src, 0)).to_f32();
            out[1] = f16::from_bits(u16_at(src, 1)).to_f32();
            out[2] = f16::from_bits(u16_at(src, 2)).to_f32();
            out[3] = f16::from_bits(u16_at(src, 3)).to_f32();
        }
        TextureFormat::RGBA32F => {
            out[0] = f32_at(src, 0);
            out[1] = f32_at(src, 1);
            out[2] = f32_at(src, 2);
            out[3] = f32_at(src, 3);
        }
        TextureFormat::Unknown => {
            debug_assert!(false, "unknown texture format");
            out.fill(0.0);
        }
    }
}

/// Pack one canonical RGBA32F pixel into `format` at the start of `out`
///
/// `out` must hold at least `format.bytes_per_pixel()` bytes.
pub fn from_rgba32f(out: &mut [u8], format: TextureFormat, rgba: &[f32; 4]) {
    match format {
        TextureFormat::BGR8 => {
            out[2] = to_unorm8(rgba[0]);
            out[1] = to_unorm8(rgba[1]);
            out[0] = to_unorm8(rgba[2]);
        }
        TextureFormat::RGB8 => {
            out[0] = to_unorm8(rgba[0]);
            out[1] = to_unorm8(rgba[1]);
            out[2] = to_unorm8(rgba[2]);
        }
        TextureFormat::RGB16 => {
            out[0..2].copy_from_slice(&to_unorm16(rgba[0]).to_le_bytes());
            out[2..4].copy_from_slice(&to_unorm16(rgba[1]).to_le_bytes());
            out[4..6].copy_from_slice(&to_unorm16(rgba[2]).to_le_bytes());
        }
        TextureFormat::RGB16F => {
            out[0..2].copy_from_slice(&f16::from_f32(rgba[0]).to_bits().to_le_bytes());
            out[2..4].copy_from_slice(&f16::from_f32(rgba[1]).to_bits().to_le_bytes());
            out[4..6].copy_from_slice(&f16::from_f32(rgba[2]).to_bits().to_le_bytes());
        }
        TextureFormat::RGB32F => {
            out[0..4].copy_from_slice(&rgba[0].to_le_bytes());
            out[4..8].copy_from_slice(&rgba[1].to_le_bytes());
            out[8..12].copy_from_slice(&rgba[2].to_le_bytes());
        }
        TextureFormat::RGBE => rgba32f_to_rgbe(out, rgba),
        TextureFormat::BGRA8 => {
            out[2] = to_unorm8(rgba[0]);
            out[1] = to_unorm8(rgba[1]);
            out[0] = to_unorm8(rgba[2]);
            out[3] = to_unorm8(rgba[3]);
        }
        TextureFormat::RGBA8 => {
            out[0] = to_unorm8(rgba[0]);
            out[1] = to_unorm8(rgba[1]);
            out[2] = to_unorm8(rgba[2]);
            out[3] = to_unorm8(rgba[3]);
        }
        TextureFormat::RGBA16 => {
            out[0..2].copy_from_slice(&to_unorm16(rgba[0]).to_le_bytes());
            out[2..4].copy_from_slice(&to_unorm16(rgba[1]).to_le_bytes());
            out[4..6].copy_from_slice(&to_unorm16(rgba[2]).to_le_bytes());
            out[6..8].copy_from_slice(&to_unorm16(rgba[3]).to_le_bytes());
        }
        TextureFormat::RGBA16F => {
            out[0..2].copy_from_slice(&f16::from_f32(rgba[0]).to_bits().to_le_bytes());
            out[2..4].copy_from_slice(&f16::from_f32(rgba[1]).to_bits().to_le_bytes());
            out[4..6].copy_from_slice(&f16::from_f32(rgba[2]).to_bits().to_le_bytes());
            out[6..8].copy_from_slice(&f16::from_f32(rgba[3]).to_bits().to_le_bytes());
        }
        TextureFormat::RGBA32F => {
            out[0..4].copy_from_slice(&rgba[0].to_le_bytes());
            out[4..8].copy_from_slice(&rgba[1].to_le_bytes());
            out[8..12].copy_from_slice(&rgba[2].to_le_bytes());
            out[12..16].copy_from_slice(&rgba[3].to_le_bytes());
        }
        TextureFormat::Unknown => {
            debug_assert!(false, "unknown texture format");
        }
    }
}
