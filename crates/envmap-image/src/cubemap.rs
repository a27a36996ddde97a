/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Cubemap layout transforms
//!
//! Reshapes environment maps between their interchangeable layouts: the
//! six-face cubemap, the unfolded cross (vertical 3x4 or horizontal 4x3),
//! the 2:1 latitude-longitude map, the 6:1 horizontal strip, and a list
//! of six independent face images.
//!
//! Face cells of the two cross layouts, with the vertical cross storing
//! its `-Z` face rotated 180 degrees:
//!
//! ```text
//!      ___                  ___
//!     |+Y |                |+Y |
//!  ___|___|___          ___|___|___ ___
//! |-X |+Z |+X |        |-X |+Z |+X |-Z |
//! |___|___|___|        |___|___|___|___|
//!     |-Y |                |-Y |
//!     |___|                |___|
//!     |-Z |
//!     |___|
//! ```

use envmap_core::format::{PixelKind, TextureFormat};
use envmap_core::image::{Image, CUBE_FACE_COUNT, MAX_MIP_COUNT};
use envmap_core::pixel;
use envmap_core::transform::{face_op, transform, OP_FLIP_X, OP_FLIP_Y};
use log::warn;

use crate::convert::{self, ref_or_convert};
use crate::cubemap_utils::{
    latlong_from_vec, texel_coord_to_vec, vec_from_latlong, vec_to_texel_coord
};
use crate::errors::ImageErrors;

const VERTICAL_ASPECT: f32 = 3.0 / 4.0;
const HORIZONTAL_ASPECT: f32 = 4.0 / 3.0;

/// Empty cells of the vertical cross, in face-grid coordinates
const VERTICAL_EMPTY_CELLS: [(u32, u32); 6] = [(0, 0), (2, 0), (0, 2), (2, 2), (0, 3), (2, 3)];
/// Empty cells of the horizontal cross
const HORIZONTAL_EMPTY_CELLS: [(u32, u32); 6] = [(0, 0), (2, 0), (3, 0), (0, 2), (2, 2), (3, 2)];

/// Byte offset of each face cell inside one cross mip, face order
/// `+X, -X, +Y, -Y, +Z, -Z`
///
/// `row_size` is the byte length of one row of face cells (image pitch
/// times the face size).
fn cross_face_offsets(row_size: usize, face_pitch: usize, vertical: bool) -> [usize; 6] {
    if vertical {
        [
            row_size + 2 * face_pitch,
            row_size,
            face_pitch,
            2 * row_size + face_pitch,
            row_size + face_pitch,
            3 * row_size + face_pitch
        ]
    } else {
        [
            row_size + 2 * face_pitch,
            row_size,
            face_pitch,
            2 * row_size + face_pitch,
            row_size + face_pitch,
            row_size + 3 * face_pitch
        ]
    }
}

/// Near-black threshold for a format's reconstructed channels
fn near_black_threshold(format: TextureFormat) -> f32 {
    if format == TextureFormat::RGBE {
        return 0.01;
    }
    match format.kind() {
        PixelKind::Uint8 => 2.0 / 255.0,
        PixelKind::Uint16 => 2.0 / 65535.0,
        PixelKind::HalfFloat | PixelKind::Float => 0.01
    }
}

/// Detect whether a flat image is an unfolded cube cross
///
/// The aspect must be 3:4 (vertical) or 4:3 (horizontal) and the centers
/// of the six empty corner cells must all be near black.
pub fn is_cube_cross(image: &Image) -> bool {
    if image.num_faces() != 1 {
        return false;
    }

    let aspect = image.width() as f32 / image.height() as f32;
    let vertical = (aspect - VERTICAL_ASPECT).abs() < 0.0001;
    let horizontal = (aspect - HORIZONTAL_ASPECT).abs() < 0.0001;

    if !vertical && !horizontal {
        return false;
    }

    let face_size = if vertical {
        (image.width() + 2) / 3
    } else {
        (image.width() + 3) / 4
    };
    let cells = if vertical { &VERTICAL_EMPTY_CELLS } else { &HORIZONTAL_EMPTY_CELLS };
    let threshold = near_black_threshold(image.format());

    let mut texel = [0_u8; 16];
    for &(cell_x, cell_y) in cells.iter() {
        let x = (cell_x * face_size + face_size / 2).min(image.width() - 1);
        let y = (cell_y * face_size + face_size / 2).min(image.height() - 1);

        image.get_pixel(&mut texel, TextureFormat::RGBA32F, x, y, 0, 0);

        for channel in 0..3 {
            let value = f32::from_le_bytes([
                texel[channel * 4],
                texel[channel * 4 + 1],
                texel[channel * 4 + 2],
                texel[channel * 4 + 3]
            ]);
            if value >= threshold {
                return false;
            }
        }
    }

    true
}

/// Fold a cube cross into a six-face cubemap
///
/// The result carries the base level only. The vertical layout stores
/// `-Z` rotated 180 degrees, so that face is post-transformed back.
pub fn cubemap_from_cross(src: &Image) -> Result<Image, ImageErrors> {
    let aspect = src.width() as f32 / src.height() as f32;
    let vertical = (aspect - VERTICAL_ASPECT).abs() < 0.0001;
    let horizontal = (aspect - HORIZONTAL_ASPECT).abs() < 0.0001;

    if src.num_faces() != 1 || (!vertical && !horizontal) {
        return Err(ImageErrors::UnsupportedLayout("image is not a cube cross"));
    }

    let bytes_per_pixel = src.format().bytes_per_pixel();
    let image_pitch = src.width() as usize * bytes_per_pixel;
    let face_size = if vertical { (src.width() + 2) / 3 } else { (src.width() + 3) / 4 };
    let face_pitch = face_size as usize * bytes_per_pixel;
    let face_len = face_pitch * face_size as usize;
    let row_size = image_pitch * face_size as usize;

    let face_offsets = cross_face_offsets(row_size, face_pitch, vertical);

    let mut data = vec![0_u8; face_len * CUBE_FACE_COUNT];
    for face in 0..CUBE_FACE_COUNT {
        let src_face = &src.data()[face_offsets[face]..];
        let dst_face = &mut data[face_len * face..face_len * (face + 1)];

        for y in 0..face_size as usize {
            dst_face[face_pitch * y..face_pitch * (y + 1)]
                .copy_from_slice(&src_face[image_pitch * y..image_pitch * y + face_pitch]);
        }
    }

    let mut result = Image::from_parts(data, face_size, face_size, src.format(), 1, 6)
        .map_err(ImageErrors::Generic)?;

    if vertical {
        transform(&mut result, &[face_op(5, OP_FLIP_X | OP_FLIP_Y)]);
    }

    Ok(result)
}

/// Unfold a cubemap into a cross image
///
/// Empty cells are filled with the format's encoding of `(0,0,0,1)`; the
/// whole mip chain is re-packed level by level. The `-Z` face is
/// pre-rotated 180 degrees when building the vertical layout.
pub fn cross_from_cubemap(src: &Image, vertical: bool) -> Result<Image, ImageErrors> {
    if !src.is_cubemap() {
        return Err(ImageErrors::UnsupportedLayout("image is not a cubemap"));
    }

    let mut src = src.clone();
    if vertical {
        transform(&mut src, &[face_op(5, OP_FLIP_X | OP_FLIP_Y)]);
    }

    let bytes_per_pixel = src.format().bytes_per_pixel();
    let (cells_across, cells_down) = if vertical { (3, 4) } else { (4, 3) };
    let dst_width = cells_across * src.width();
    let dst_height = cells_down * src.width();

    // destination mip offsets and total size
    let mut dst_offsets = [0_usize; MAX_MIP_COUNT];
    let mut dst_len = 0_usize;
    for mip in 0..src.num_mips() {
        dst_offsets[usize::from(mip)] = dst_len;
        let mip_width = 1.max(dst_width >> mip) as usize;
        let mip_height = 1.max(dst_height >> mip) as usize;
        dst_len += mip_width * mip_height * bytes_per_pixel;
    }

    // background texel
    let mut black = [0_u8; 16];
    pixel::from_rgba32f(&mut black, src.format(), &[0.0, 0.0, 0.0, 1.0]);
    let black = &black[..bytes_per_pixel];

    let mut data = vec![0_u8; dst_len];
    for texel in data.chunks_exact_mut(bytes_per_pixel) {
        texel.copy_from_slice(black);
    }

    let src_offsets = src.mip_offsets();

    for mip in 0..src.num_mips() {
        let src_width = 1.max(src.width() >> mip) as usize;
        let src_pitch = src_width * bytes_per_pixel;

        let mip_width = 1.max(dst_width >> mip) as usize;
        let mip_pitch = mip_width * bytes_per_pixel;
        let face_size = mip_width / cells_across as usize;
        let face_pitch = face_size * bytes_per_pixel;
        let row_size = mip_pitch * face_size;

        let face_offsets = cross_face_offsets(row_size, face_pitch, vertical);

        let dst_mip = dst_offsets[usize::from(mip)];
        for face in 0..CUBE_FACE_COUNT {
            let src_face = src_offsets[face][usize::from(mip)];

            for y in 0..face_size {
                let src_row = src_face + y * src_pitch;
                let dst_row = dst_mip + face_offsets[face] + y * mip_pitch;
                data[dst_row..dst_row + face_pitch]
                    .copy_from_slice(&src.data()[src_row..src_row + face_pitch]);
            }
        }
    }

    Image::from_parts(data, dst_width, dst_height, src.format(), src.num_mips(), 1)
        .map_err(ImageErrors::Generic)
}

#[inline]
fn bilinear_tap(pixels: &[f32], base: usize, pitch: usize, x: usize, y: usize) -> &[f32] {
    &pixels[base + (y * pitch + x) * 4..]
}

/// Project a cubemap onto a latitude-longitude map
///
/// The destination is `4h x 2h` for a face size of `h`; the mip chain is
/// projected level by level. Sampling clamps at face edges, optionally
/// with bilinear filtering.
pub fn latlong_from_cubemap(src: &Image, bilinear: bool) -> Result<Image, ImageErrors> {
    if !src.is_cubemap() {
        return Err(ImageErrors::UnsupportedLayout("image is not a cubemap"));
    }

    let rgba32f = ref_or_convert(src, TextureFormat::RGBA32F)?;
    let pixels = convert::rgba32f_pixels(&rgba32f);
    let src_offsets = rgba32f.mip_offsets();

    let dst_width = rgba32f.height() * 4;
    let dst_height = rgba32f.height() * 2;
    let num_mips = rgba32f.num_mips();

    // destination mip offsets in floats
    let mut dst_offsets = [0_usize; MAX_MIP_COUNT];
    let mut dst_len = 0_usize;
    for mip in 0..num_mips {
        dst_offsets[usize::from(mip)] = dst_len;
        let mip_width = 1.max(dst_width >> mip) as usize;
        let mip_height = 1.max(dst_height >> mip) as usize;
        dst_len += mip_width * mip_height * 4;
    }

    let mut out = vec![0.0_f32; dst_len];

    for mip in 0..num_mips {
        let dst_mip_width = 1.max(dst_width >> mip) as usize;
        let dst_mip_height = 1.max(dst_height >> mip) as usize;
        let inv_dst_width = 1.0 / (dst_mip_width - 1) as f32;
        let inv_dst_height = 1.0 / (dst_mip_height - 1) as f32;

        let (src_mip_width, src_mip_height) = rgba32f.mip_dimensions(mip);
        let src_mip_width = src_mip_width as usize;
        let src_mip_height = src_mip_height as usize;

        let dst_mip = dst_offsets[usize::from(mip)];
        for y in 0..dst_mip_height {
            for x in 0..dst_mip_width {
                // destination texel direction
                let vec = vec_from_latlong(x as f32 * inv_dst_width, y as f32 * inv_dst_height);
                let (u, v, face) = vec_to_texel_coord(vec);

                let x_src = u * src_mip_width as f32;
                let y_src = v * src_mip_height as f32;
                let x0 = (x_src as usize).min(src_mip_width - 1);
                let y0 = (y_src as usize).min(src_mip_height - 1);

                let base = src_offsets[usize::from(face)][usize::from(mip)] / 4;
                let dst = dst_mip + (y * dst_mip_width + x) * 4;

                if bilinear {
                    let x1 = (x0 + 1).min(src_mip_width - 1);
                    let y1 = (y0 + 1).min(src_mip_height - 1);
                    let tx = x_src - x0 as f32;
                    let ty = y_src - y0 as f32;

                    let p0 = bilinear_tap(&pixels, base, src_mip_width, x0, y0);
                    let p1 = bilinear_tap(&pixels, base, src_mip_width, x1, y0);
                    let p2 = bilinear_tap(&pixels, base, src_mip_width, x0, y1);
                    let p3 = bilinear_tap(&pixels, base, src_mip_width, x1, y1);

                    for channel in 0..3 {
                        out[dst + channel] = p0[channel] * (1.0 - tx) * (1.0 - ty)
                            + p1[channel] * tx * (1.0 - ty)
                            + p2[channel] * (1.0 - tx) * ty
                            + p3[channel] * tx * ty;
                    }
                } else {
                    let texel = bilinear_tap(&pixels, base, src_mip_width, x0, y0);
                    out[dst..dst + 3].copy_from_slice(&texel[..3]);
                }
                out[dst + 3] = 1.0;
            }
        }
    }

    let result =
        convert::image_from_f32(&out, dst_width, dst_height, num_mips, 1)?;

    convert::convert(&result, src.format())
}

/// Fold a latitude-longitude map into a cubemap
///
/// The face size is `ceil(h / 2)`. Sampling wraps in longitude and
/// clamps in latitude, optionally with bilinear filtering. The result
/// carries the base level only.
pub fn cubemap_from_latlong(src: &Image, bilinear: bool) -> Result<Image, ImageErrors> {
    if !src.is_lat_long() {
        return Err(ImageErrors::UnsupportedLayout("image is not a lat-long map"));
    }

    let rgba32f = ref_or_convert(src, TextureFormat::RGBA32F)?;
    let pixels = convert::rgba32f_pixels(&rgba32f);

    let src_width = rgba32f.width() as usize;
    let src_height = rgba32f.height() as usize;
    let face_size = (rgba32f.height() + 1) / 2;
    let inv_face_size = 1.0 / face_size as f32;

    let face_len = face_size as usize * face_size as usize * 4;
    let mut out = vec![0.0_f32; face_len * CUBE_FACE_COUNT];

    for face in 0..CUBE_FACE_COUNT as u8 {
        let dst_face = usize::from(face) * face_len;

        for y in 0..face_size as usize {
            for x in 0..face_size as usize {
                // face texel direction
                let u = 2.0 * x as f32 * inv_face_size - 1.0;
                let v = 2.0 * y as f32 * inv_face_size - 1.0;
                let vec = texel_coord_to_vec(u, v, face);

                let (long, lat) = latlong_from_vec(vec);
                let x_src = long * (src_width - 1) as f32;
                let y_src = lat * (src_height - 1) as f32;
                let x0 = (x_src as usize).min(src_width - 1);
                let y0 = (y_src as usize).min(src_height - 1);

                let dst = dst_face + (y * face_size as usize + x) * 4;

                if bilinear {
                    // wrap in longitude, clamp in latitude
                    let x1 = if x0 + 1 < src_width { x0 + 1 } else { 0 };
                    let y1 = (y0 + 1).min(src_height - 1);
                    let tx = x_src - x0 as f32;
                    let ty = y_src - y0 as f32;

                    let p0 = bilinear_tap(&pixels, 0, src_width, x0, y0);
                    let p1 = bilinear_tap(&pixels, 0, src_width, x1, y0);
                    let p2 = bilinear_tap(&pixels, 0, src_width, x0, y1);
                    let p3 = bilinear_tap(&pixels, 0, src_width, x1, y1);

                    for channel in 0..3 {
                        out[dst + channel] = p0[channel] * (1.0 - tx) * (1.0 - ty)
                            + p1[channel] * tx * (1.0 - ty)
                            + p2[channel] * (1.0 - tx) * ty
                            + p3[channel] * tx * ty;
                    }
                } else {
                    let texel = bilinear_tap(&pixels, 0, src_width, x0, y0);
                    out[dst..dst + 3].copy_from_slice(&texel[..3]);
                }
                out[dst + 3] = 1.0;
            }
        }
    }

    let result = convert::image_from_f32(&out, face_size, face_size, 1, 6)?;

    convert::convert(&result, src.format())
}

/// Lay a cubemap's faces out as one 6:1 horizontal strip
pub fn hstrip_from_cubemap(src: &Image) -> Result<Image, ImageErrors> {
    if !src.is_cubemap() {
        return Err(ImageErrors::UnsupportedLayout("image is not a cubemap"));
    }

    let bytes_per_pixel = src.format().bytes_per_pixel();
    let dst_width = src.width() * 6;
    let dst_height = src.width();

    let mut dst_offsets = [0_usize; MAX_MIP_COUNT];
    let mut dst_len = 0_usize;
    for mip in 0..src.num_mips() {
        dst_offsets[usize::from(mip)] = dst_len;
        let mip_width = 1.max(dst_width >> mip) as usize;
        let mip_height = 1.max(dst_height >> mip) as usize;
        dst_len += mip_width * mip_height * bytes_per_pixel;
    }

    let src_offsets = src.mip_offsets();
    let mut data = vec![0_u8; dst_len];

    for face in 0..CUBE_FACE_COUNT {
        for mip in 0..src.num_mips() {
            let face_size = 1.max(src.width() >> mip) as usize;
            let src_pitch = face_size * bytes_per_pixel;
            let dst_pitch = src_pitch * 6;

            let src_face = src_offsets[face][usize::from(mip)];
            let dst_face = dst_offsets[usize::from(mip)] + src_pitch * face;

            for y in 0..face_size {
                let src_row = src_face + y * src_pitch;
                let dst_row = dst_face + y * dst_pitch;
                data[dst_row..dst_row + src_pitch]
                    .copy_from_slice(&src.data()[src_row..src_row + src_pitch]);
            }
        }
    }

    Image::from_parts(data, dst_width, dst_height, src.format(), src.num_mips(), 1)
        .map_err(ImageErrors::Generic)
}

/// Cut a 6:1 horizontal strip back into a cubemap
pub fn cubemap_from_hstrip(src: &Image) -> Result<Image, ImageErrors> {
    if !src.is_hstrip() {
        return Err(ImageErrors::UnsupportedLayout("image is not a horizontal strip"));
    }

    let bytes_per_pixel = src.format().bytes_per_pixel();
    let face_size = src.height();

    let mut dst_offsets = [[0_usize; MAX_MIP_COUNT]; CUBE_FACE_COUNT];
    let mut dst_len = 0_usize;
    for face in 0..CUBE_FACE_COUNT {
        for mip in 0..src.num_mips() {
            dst_offsets[face][usize::from(mip)] = dst_len;
            let mip_size = 1.max(face_size >> mip) as usize;
            dst_len += mip_size * mip_size * bytes_per_pixel;
        }
    }

    let src_offsets = src.mip_offsets();
    let mut data = vec![0_u8; dst_len];

    for face in 0..CUBE_FACE_COUNT {
        for mip in 0..src.num_mips() {
            let mip_size = 1.max(face_size >> mip) as usize;
            let dst_pitch = mip_size * bytes_per_pixel;
            let src_pitch = dst_pitch * 6;

            let src_face = src_offsets[0][usize::from(mip)] + dst_pitch * face;
            let dst_face = dst_offsets[face][usize::from(mip)];

            for y in 0..mip_size {
                let src_row = src_face + y * src_pitch;
                let dst_row = dst_face + y * dst_pitch;
                data[dst_row..dst_row + dst_pitch]
                    .copy_from_slice(&src.data()[src_row..src_row + dst_pitch]);
            }
        }
    }

    Image::from_parts(data, face_size, face_size, src.format(), src.num_mips(), 6)
        .map_err(ImageErrors::Generic)
}

/// Split a cubemap into six independent single-face images
pub fn face_list_from_cubemap(src: &Image) -> Result<Vec<Image>, ImageErrors> {
    if !src.is_cubemap() {
        return Err(ImageErrors::UnsupportedLayout("image is not a cubemap"));
    }

    let bytes_per_pixel = src.format().bytes_per_pixel();
    let src_offsets = src.mip_offsets();

    let mut face_len = 0_usize;
    for mip in 0..src.num_mips() {
        let mip_size = 1.max(src.width() >> mip) as usize;
        face_len += mip_size * mip_size * bytes_per_pixel;
    }

    let mut faces = Vec::with_capacity(CUBE_FACE_COUNT);
    for face in 0..CUBE_FACE_COUNT {
        let start = src_offsets[face][0];
        let data = src.data()[start..start + face_len].to_vec();

        faces.push(
            Image::from_parts(data, src.width(), src.height(), src.format(), src.num_mips(), 1)
                .map_err(ImageErrors::Generic)?
        );
    }

    Ok(faces)
}

/// Join six face images into one cubemap
///
/// Every face must be square, of the same size, format and mip count.
pub fn cubemap_from_face_list(faces: &[Image]) -> Result<Image, ImageErrors> {
    if faces.len() != CUBE_FACE_COUNT {
        return Err(ImageErrors::UnsupportedLayout("a cubemap needs exactly six faces"));
    }

    let first = &faces[0];
    for face in faces {
        if face.width() != face.height()
            || face.width() != first.width()
            || face.num_mips() != first.num_mips()
            || face.format() != first.format()
            || face.num_faces() != 1
        {
            warn!("Cubemap face list entries do not agree in size, format or mip count.");
            return Err(ImageErrors::UnsupportedLayout(
                "face list entries do not agree in size, format or mip count"
            ));
        }
    }

    let mut data = Vec::with_capacity(first.data_size() * CUBE_FACE_COUNT);
    for face in faces {
        data.extend_from_slice(face.data());
    }

    Image::from_parts(
        data,
        first.width(),
        first.height(),
        first.format(),
        first.num_mips(),
        6
    )
    .map_err(ImageErrors::Generic)
}
