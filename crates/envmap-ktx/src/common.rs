/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use envmap_core::bytestream::{ByteIoError, ByteReader, ByteWriter};
use envmap_core::format::{PixelKind, TextureFormat};
use envmap_core::image::Image;

pub const KTX_MAGIC: [u8; 12] = [
    0xAB, 0x4B, 0x54, 0x58, 0x20, 0x31, 0x31, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A
];
pub const KTX_ENDIAN_REF: u32 = 0x0403_0201;
pub const KTX_UNPACK_ALIGNMENT: usize = 4;

// GL data types
pub const GL_UNSIGNED_BYTE: u32 = 0x1401;
pub const GL_UNSIGNED_SHORT: u32 = 0x1403;
pub const GL_FLOAT: u32 = 0x1406;
pub const GL_HALF_FLOAT: u32 = 0x140B;

// GL pixel formats
pub const GL_RGB: u32 = 0x1907;
pub const GL_RGBA: u32 = 0x1908;

// GL sized internal formats
pub const GL_RGBA32F: u32 = 0x8814;
pub const GL_RGB32F: u32 = 0x8815;
pub const GL_RGBA16F: u32 = 0x881A;
pub const GL_RGB16F: u32 = 0x881B;
pub const GL_RGBA16UI: u32 = 0x8D76;
pub const GL_RGB16UI: u32 = 0x8D77;
pub const GL_RGBA8UI: u32 = 0x8D7C;
pub const GL_RGB8UI: u32 = 0x8D7D;

/// The 52-byte KTX header, all fields little endian
#[derive(Copy, Clone, Debug, Default)]
pub struct KtxHeader {
    pub endianness:              u32,
    pub gl_type:                 u32,
    pub gl_type_size:            u32,
    pub gl_format:               u32,
    pub gl_internal_format:      u32,
    pub gl_base_internal_format: u32,
    pub pixel_width:             u32,
    pub pixel_height:            u32,
    pub pixel_depth:             u32,
    pub num_array_elements:      u32,
    pub num_faces:               u32,
    pub num_mips:                u32,
    pub bytes_key_value:         u32
}

impl KtxHeader {
    pub fn read(stream: &mut ByteReader) -> Result<KtxHeader, ByteIoError> {
        Ok(KtxHeader {
            endianness:              stream.get_u32_le_err()?,
            gl_type:                 stream.get_u32_le_err()?,
            gl_type_size:            stream.get_u32_le_err()?,
            gl_format:               stream.get_u32_le_err()?,
            gl_internal_format:      stream.get_u32_le_err()?,
            gl_base_internal_format: stream.get_u32_le_err()?,
            pixel_width:             stream.get_u32_le_err()?,
            pixel_height:            stream.get_u32_le_err()?,
            pixel_depth:             stream.get_u32_le_err()?,
            num_array_elements:      stream.get_u32_le_err()?,
            num_faces:               stream.get_u32_le_err()?,
            num_mips:                stream.get_u32_le_err()?,
            bytes_key_value:         stream.get_u32_le_err()?
        })
    }

    pub fn write(&self, writer: &mut ByteWriter) {
        writer.write_u32_le(self.endianness);
        writer.write_u32_le(self.gl_type);
        writer.write_u32_le(self.gl_type_size);
        writer.write_u32_le(self.gl_format);
        writer.write_u32_le(self.gl_internal_format);
        writer.write_u32_le(self.gl_base_internal_format);
        writer.write_u32_le(self.pixel_width);
        writer.write_u32_le(self.pixel_height);
        writer.write_u32_le(self.pixel_depth);
        writer.write_u32_le(self.num_array_elements);
        writer.write_u32_le(self.num_faces);
        writer.write_u32_le(self.num_mips);
        writer.write_u32_le(self.bytes_key_value);
    }
}

/// glInternalFormat → texture format, both the sized and the bare
/// base formats older writers emit
pub static TRANSLATE_KTX_FORMAT: [(u32, TextureFormat); 10] = [
    (GL_RGB, TextureFormat::RGB8),
    (GL_RGB8UI, TextureFormat::RGB8),
    (GL_RGB16UI, TextureFormat::RGB16),
    (GL_RGB16F, TextureFormat::RGB16F),
    (GL_RGB32F, TextureFormat::RGB32F),
    (GL_RGBA, TextureFormat::RGBA8),
    (GL_RGBA8UI, TextureFormat::RGBA8),
    (GL_RGBA16UI, TextureFormat::RGBA16),
    (GL_RGBA16F, TextureFormat::RGBA16F),
    (GL_RGBA32F, TextureFormat::RGBA32F)
];

/// The `(glInternalFormat, glFormat)` pair a texture format is written as
pub fn gl_sized_internal_format(format: TextureFormat) -> (u32, u32) {
    match format {
        TextureFormat::RGB8 => (GL_RGB8UI, GL_RGB),
        TextureFormat::RGB16 => (GL_RGB16UI, GL_RGB),
        TextureFormat::RGB16F => (GL_RGB16F, GL_RGB),
        TextureFormat::RGB32F => (GL_RGB32F, GL_RGB),
        TextureFormat::RGBA8 => (GL_RGBA8UI, GL_RGBA),
        TextureFormat::RGBA16 => (GL_RGBA16UI, GL_RGBA),
        TextureFormat::RGBA16F => (GL_RGBA16F, GL_RGBA),
        TextureFormat::RGBA32F => (GL_RGBA32F, GL_RGBA),
        _ => (0, 0)
    }
}

/// The glType of a pixel data kind
pub const fn gl_type_for_kind(kind: PixelKind) -> u32 {
    match kind {
        PixelKind::Uint8 => GL_UNSIGNED_BYTE,
        PixelKind::Uint16 => GL_UNSIGNED_SHORT,
        PixelKind::HalfFloat => GL_HALF_FLOAT,
        PixelKind::Float => GL_FLOAT
    }
}

/// Trailing pad bytes needed to bring `size` up to the unpack alignment
pub const fn pad_len(size: usize) -> usize {
    (KTX_UNPACK_ALIGNMENT - 1) - ((size + KTX_UNPACK_ALIGNMENT - 1) & (KTX_UNPACK_ALIGNMENT - 1))
}

/// Fill a KTX header from an image's layout
pub fn header_from_image(image: &Image) -> KtxHeader {
    let info = image.format().info();
    let (gl_internal_format, gl_format) = gl_sized_internal_format(image.format());

    KtxHeader {
        endianness: KTX_ENDIAN_REF,
        gl_type: gl_type_for_kind(info.kind),
        gl_type_size: u32::from(info.bytes_per_pixel / info.num_channels),
        gl_format,
        gl_internal_format,
        gl_base_internal_format: gl_format,
        pixel_width: image.width(),
        pixel_height: image.height(),
        pixel_depth: 0,
        num_array_elements: 0,
        num_faces: u32::from(image.num_faces()),
        num_mips: u32::from(image.num_mips()),
        bytes_key_value: 0
    }
}
