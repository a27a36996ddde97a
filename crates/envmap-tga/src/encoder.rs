/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! TGA encoder

use envmap_core::bytestream::ByteWriter;
use envmap_core::format::{ImageFileType, TextureFormat};
use envmap_core::image::Image;
use log::warn;

use crate::common::{TgaHeader, TGA_FOOTER_SIGNATURE, TGA_IT_RGB};
use crate::errors::TgaEncodeErrors;

/// A TGA encoder
///
/// The image must be `BGR8` or `BGRA8`. Only face 0 / mip 0 is written;
/// anything beyond that is dropped with a warning.
///
/// By default rows are written bottom-up so the file stores its origin at
/// the bottom left, the customary Targa layout; [`set_y_flip`](Self::set_y_flip)
/// turns that off.
pub struct TgaEncoder<'a> {
    image:  &'a Image,
    y_flip: bool
}

impl<'a> TgaEncoder<'a> {
    /// Create a new TGA encoder for `image`
    pub const fn new(image: &'a Image) -> TgaEncoder<'a> {
        TgaEncoder { image, y_flip: true }
    }

    /// Choose whether rows are written bottom-up (the default)
    pub fn set_y_flip(&mut self, y_flip: bool) {
        self.y_flip = y_flip;
    }

    /// Encode the image, returning the file bytes
    pub fn encode(&self) -> Result<Vec<u8>, TgaEncodeErrors> {
        let image = self.image;
        let format = image.format();

        if !ImageFileType::TGA.is_format_allowed(format) {
            return Err(TgaEncodeErrors::UnsupportedTextureFormat(format));
        }

        let (width, height) = image.dimensions();
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(TgaEncodeErrors::TooLargeDimensions(width.max(height) as usize));
        }

        if image.num_faces() != 1 {
            warn!(
                "Image contains more than one face. Only the first one will \
                 be saved due to the limits of the TGA format."
            );
        }
        if image.num_mips() != 1 {
            warn!(
                "Image contains more than one mip level. Only the first one \
                 will be saved due to the limits of the TGA format."
            );
        }

        let bytes_per_pixel = format.bytes_per_pixel();
        let pitch = width as usize * bytes_per_pixel;
        let face_size = pitch * height as usize;

        let header = TgaHeader {
            image_type: TGA_IT_RGB,
            width: width as u16,
            height: height as u16,
            bits_per_pixel: (bytes_per_pixel * 8) as u8,
            // the alpha-depth nibble of the descriptor
            image_descriptor: if format.has_alpha() { 0x8 } else { 0x0 },
            ..TgaHeader::default()
        };

        let mut writer = ByteWriter::with_capacity(face_size + 64);
        header.write(&mut writer);

        let rows = image.data()[..face_size].chunks_exact(pitch);
        if self.y_flip {
            for row in rows.rev() {
                writer.write_all(row);
            }
        } else {
            for row in rows {
                writer.write_all(row);
            }
        }

        // footer: extension offset, developer offset, signature
        writer.write_u32_le(0);
        writer.write_u32_le(0);
        writer.write_all(TGA_FOOTER_SIGNATURE);

        Ok(writer.into_inner())
    }
}
