/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The image container and its face/mip layout math
//!
//! An [`Image`] owns one tightly packed pixel buffer holding every face
//! and every mip level. Storage order is face-major, then mip-major within
//! a face, then row-major within a mip, rows top to bottom.
//!
//! For cubemaps the face order is `+X, -X, +Y, -Y, +Z, -Z` and every mip
//! is square.

use crate::format::TextureFormat;
use crate::pixel;

/// Number of faces in a cubemap
pub const CUBE_FACE_COUNT: usize = 6;

/// Maximum number of mip levels an image may carry
pub const MAX_MIP_COUNT: usize = 16;

/// A single image: one pixel buffer plus the description needed
/// to address faces, mips and rows inside it
#[derive(Clone)]
pub struct Image {
    data:      Vec<u8>,
    width:     u32,
    height:    u32,
    format:    TextureFormat,
    num_mips:  u8,
    num_faces: u8
}

/// Byte size of a tightly packed image with the given layout
///
/// Sums `max(1, width >> mip) * max(1, height >> mip)` over all mips,
/// multiplied by the face count and the format's bytes per pixel.
pub fn byte_size(
    width: u32, height: u32, format: TextureFormat, num_mips: u8, num_faces: u8
) -> usize {
    let mut count = 0_usize;
    for mip in 0..num_mips {
        let mip_width = 1.max(width >> mip) as usize;
        let mip_height = 1.max(height >> mip) as usize;
        count += mip_width * mip_height;
    }
    count * usize::from(num_faces) * format.bytes_per_pixel()
}

impl Image {
    /// Assemble an image from a pixel buffer and its layout description
    ///
    /// # Errors
    /// Fails when the description is out of range (`num_faces` must be 1
    /// or 6, `num_mips` in `1..=16`, dimensions non zero, format known)
    /// or when `data` does not have exactly the packed size the layout
    /// demands.
    pub fn from_parts(
        data: Vec<u8>, width: u32, height: u32, format: TextureFormat, num_mips: u8, num_faces: u8
    ) -> Result<Image, &'static str> {
        if width == 0 || height == 0 {
            return Err("image dimensions cannot be zero");
        }
        if format == TextureFormat::Unknown {
            return Err("image format cannot be unknown");
        }
        if num_faces != 1 && num_faces != CUBE_FACE_COUNT as u8 {
            return Err("image must have exactly 1 or 6 faces");
        }
        if num_mips == 0 || usize::from(num_mips) > MAX_MIP_COUNT {
            return Err("image mip count out of range");
        }
        if num_faces == CUBE_FACE_COUNT as u8 && width != height {
            return Err("cubemap faces must be square");
        }
        if data.len() != byte_size(width, height, format, num_mips, num_faces) {
            return Err("pixel buffer does not match image layout");
        }

        Ok(Image { data, width, height, format, num_mips, num_faces })
    }

    /// Base level width in pixels
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Base level height in pixels
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Base level dimensions as `(width, height)`
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The texture format pixels are stored in
    pub const fn format(&self) -> TextureFormat {
        self.format
    }

    /// Number of mip levels present, `1..=16`
    pub const fn num_mips(&self) -> u8 {
        self.num_mips
    }

    /// Number of faces present, 1 or 6
    pub const fn num_faces(&self) -> u8 {
        self.num_faces
    }

    /// The raw pixel bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the raw pixel bytes
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the image and return its pixel bytes
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Byte length of the pixel buffer
    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    /// Dimensions of a mip level, never smaller than one pixel
    pub fn mip_dimensions(&self, mip: u8) -> (u32, u32) {
        (1.max(self.width >> mip), 1.max(self.height >> mip))
    }

    /// Total number of pixels across all faces and mips
    pub fn num_pixels(&self) -> usize {
        let mut count = 0_usize;
        for mip in 0..self.num_mips {
            let (mip_width, mip_height) = self.mip_dimensions(mip);
            count += mip_width as usize * mip_height as usize;
        }
        count * usize::from(self.num_faces)
    }

    /// Byte offset of every `[face][mip]` sub-image in the pixel buffer
    ///
    /// Entries beyond `num_faces`/`num_mips` are zero.
    pub fn mip_offsets(&self) -> [[usize; MAX_MIP_COUNT]; CUBE_FACE_COUNT] {
        let bytes_per_pixel = self.format.bytes_per_pixel();
        let mut offsets = [[0_usize; MAX_MIP_COUNT]; CUBE_FACE_COUNT];

        let mut offset = 0;
        for face in 0..usize::from(self.num_faces) {
            for mip in 0..self.num_mips {
                offsets[face][usize::from(mip)] = offset;

                let (mip_width, mip_height) = self.mip_dimensions(mip);
                offset += mip_width as usize * mip_height as usize * bytes_per_pixel;
            }
        }
        offsets
    }

    /// Byte offset of the start of every face in the pixel buffer
    ///
    /// Entries beyond `num_faces` are zero.
    pub fn face_offsets(&self) -> [usize; CUBE_FACE_COUNT] {
        let bytes_per_pixel = self.format.bytes_per_pixel();
        let mut offsets = [0_usize; CUBE_FACE_COUNT];

        let mut offset = 0;
        for face in 0..usize::from(self.num_faces) {
            offsets[face] = offset;

            for mip in 0..self.num_mips {
                let (mip_width, mip_height) = self.mip_dimensions(mip);
                offset += mip_width as usize * mip_height as usize * bytes_per_pixel;
            }
        }
        offsets
    }

    /// Read one pixel, converting it into `format` if necessary
    ///
    /// `out` must hold at least `format.bytes_per_pixel()` bytes.
    /// Addressing uses the mip level pitch, `x` and `y` are texel
    /// coordinates inside that mip.
    pub fn get_pixel(&self, out: &mut [u8], format: TextureFormat, x: u32, y: u32, mip: u8, face: u8) {
        debug_assert!(mip < self.num_mips, "mip level out of range");
        debug_assert!(face < self.num_faces, "face index out of range");

        let (mip_width, mip_height) = self.mip_dimensions(mip);
        debug_assert!(x < mip_width && y < mip_height, "pixel coordinates out of range");

        let bytes_per_pixel = self.format.bytes_per_pixel();
        let pitch = mip_width as usize * bytes_per_pixel;
        let offset = self.mip_offsets()[usize::from(face)][usize::from(mip)]
            + y as usize * pitch
            + x as usize * bytes_per_pixel;
        let src = &self.data[offset..offset + bytes_per_pixel];

        if self.format == format {
            out[..bytes_per_pixel].copy_from_slice(src);
        } else {
            let mut rgba = [0.0_f32; 4];
            pixel::to_rgba32f(&mut rgba, self.format, src);
            pixel::from_rgba32f(out, format, &rgba);
        }
    }

    /// True for a six-face image with square faces
    pub fn is_cubemap(&self) -> bool {
        usize::from(self.num_faces) == CUBE_FACE_COUNT && self.width == self.height
    }

    /// True for a single-face image with a 2:1 aspect
    pub fn is_lat_long(&self) -> bool {
        let aspect = self.width as f32 / self.height as f32;
        (aspect - 2.0).abs() < 0.00001
    }

    /// True for a single-face image six faces wide
    pub fn is_hstrip(&self) -> bool {
        self.width == 6 * self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_rgba8(size: u32, mips: u8) -> Image {
        let len = byte_size(size, size, TextureFormat::RGBA8, mips, 6);
        Image::from_parts(vec![0; len], size, size, TextureFormat::RGBA8, mips, 6).unwrap()
    }

    #[test]
    fn byte_size_formula() {
        // 4x4 with full chain: 16 + 4 + 1 pixels
        assert_eq!(byte_size(4, 4, TextureFormat::RGBA8, 3, 1), 21 * 4);
        assert_eq!(byte_size(4, 4, TextureFormat::RGBA8, 3, 6), 21 * 4 * 6);
        // non square shifts clamp independently
        assert_eq!(byte_size(8, 2, TextureFormat::BGR8, 4, 1), (16 + 4 + 2 + 1) * 3);
    }

    #[test]
    fn from_parts_validates() {
        assert!(Image::from_parts(vec![0; 4], 1, 1, TextureFormat::RGBA8, 1, 1).is_ok());
        // wrong buffer size
        assert!(Image::from_parts(vec![0; 5], 1, 1, TextureFormat::RGBA8, 1, 1).is_err());
        // bad face count
        assert!(Image::from_parts(vec![0; 8], 1, 1, TextureFormat::RGBA8, 1, 2).is_err());
        // non square cubemap
        assert!(
            Image::from_parts(vec![0; 2 * 1 * 4 * 6], 2, 1, TextureFormat::RGBA8, 1, 6).is_err()
        );
        assert!(Image::from_parts(vec![], 1, 1, TextureFormat::Unknown, 1, 1).is_err());
    }

    #[test]
    fn offsets_walk_face_major() {
        let image = cube_rgba8(4, 3);
        let offsets = image.mip_offsets();
        let face_size = 21 * 4;

        assert_eq!(offsets[0][0], 0);
        assert_eq!(offsets[0][1], 16 * 4);
        assert_eq!(offsets[0][2], 20 * 4);
        assert_eq!(offsets[1][0], face_size);
        assert_eq!(offsets[5][0], 5 * face_size);

        let faces = image.face_offsets();
        for face in 0..6 {
            assert_eq!(faces[face], face * face_size);
        }
    }

    #[test]
    fn num_pixels_counts_all_faces() {
        let image = cube_rgba8(4, 3);
        assert_eq!(image.num_pixels(), 21 * 6);
        assert_eq!(image.data_size(), image.num_pixels() * 4);
    }

    #[test]
    fn get_pixel_converts() {
        let mut data = vec![0_u8; 4];
        data.copy_from_slice(&[10, 20, 30, 40]);
        let image = Image::from_parts(data, 1, 1, TextureFormat::RGBA8, 1, 1).unwrap();

        let mut raw = [0_u8; 4];
        image.get_pixel(&mut raw, TextureFormat::RGBA8, 0, 0, 0, 0);
        assert_eq!(raw, [10, 20, 30, 40]);

        let mut bgra = [0_u8; 4];
        image.get_pixel(&mut bgra, TextureFormat::BGRA8, 0, 0, 0, 0);
        assert_eq!(bgra, [30, 20, 10, 40]);
    }

    #[test]
    fn layout_predicates() {
        assert!(cube_rgba8(4, 1).is_cubemap());

        let flat = Image::from_parts(vec![0; 8 * 4 * 4], 8, 4, TextureFormat::RGBA8, 1, 1).unwrap();
        assert!(flat.is_lat_long());
        assert!(!flat.is_hstrip());

        let strip =
            Image::from_parts(vec![0; 12 * 2 * 4], 12, 2, TextureFormat::RGBA8, 1, 1).unwrap();
        assert!(strip.is_hstrip());
    }
}
