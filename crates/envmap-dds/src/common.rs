/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use envmap_core::bytestream::{ByteIoError, ByteReader, ByteWriter};
use envmap_core::format::TextureFormat;
use envmap_core::image::Image;

pub const fn fourcc(bytes: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*bytes)
}

pub const DDS_MAGIC: u32 = fourcc(b"DDS ");
pub const DDS_HEADER_SIZE: usize = 124;
pub const DDS_PIXELFORMAT_SIZE: u32 = 32;
pub const DDS_DX10_HEADER_SIZE: usize = 20;

pub const DDS_DX10: u32 = fourcc(b"DX10");
pub const DDS_DXT1: u32 = fourcc(b"DXT1");
pub const DDS_DXT2: u32 = fourcc(b"DXT2");
pub const DDS_DXT3: u32 = fourcc(b"DXT3");
pub const DDS_DXT4: u32 = fourcc(b"DXT4");
pub const DDS_DXT5: u32 = fourcc(b"DXT5");

pub const D3DFMT_R8G8B8: u32 = 20;
pub const D3DFMT_A8R8G8B8: u32 = 21;
pub const D3DFMT_A8B8G8R8: u32 = 32;
pub const D3DFMT_A16B16G16R16: u32 = 36;
pub const D3DFMT_A16B16G16R16F: u32 = 113;
pub const D3DFMT_A32B32G32R32F: u32 = 116;

pub const DDSD_CAPS: u32 = 0x0000_0001;
pub const DDSD_HEIGHT: u32 = 0x0000_0002;
pub const DDSD_WIDTH: u32 = 0x0000_0004;
pub const DDSD_PITCH: u32 = 0x0000_0008;
pub const DDSD_PIXELFORMAT: u32 = 0x0000_1000;
pub const DDSD_MIPMAPCOUNT: u32 = 0x0002_0000;

pub const DDPF_ALPHAPIXELS: u32 = 0x0000_0001;
pub const DDPF_FOURCC: u32 = 0x0000_0004;
pub const DDPF_RGB: u32 = 0x0000_0040;
pub const DDPF_RGBA: u32 = DDPF_RGB | DDPF_ALPHAPIXELS;

// synthetic flags distinguishing bit counts in the translation table
pub const DDS_PF_BC_24: u32 = 0x0010_0000;
pub const DDS_PF_BC_32: u32 = 0x0020_0000;
pub const DDS_PF_BC_48: u32 = 0x0040_0000;

pub const DDSCAPS_COMPLEX: u32 = 0x0000_0008;
pub const DDSCAPS_TEXTURE: u32 = 0x0000_1000;
pub const DDSCAPS_MIPMAP: u32 = 0x0040_0000;

pub const DDSCAPS2_CUBEMAP: u32 = 0x0000_0200;
pub const DDS_CUBEMAP_ALLFACES: u32 = 0x0000_FC00;

pub const DXGI_FORMAT_R32G32B32A32_FLOAT: u32 = 2;
pub const DXGI_FORMAT_R16G16B16A16_FLOAT: u32 = 10;
pub const DXGI_FORMAT_R16G16B16A16_UINT: u32 = 12;

pub const DDS_DIMENSION_TEXTURE2D: u32 = 3;
pub const D3D10_RESOURCE_MISC_TEXTURECUBE: u32 = 0x4;

/// The DDS_PIXELFORMAT block inside the header
#[derive(Copy, Clone, Debug, Default)]
pub struct DdsPixelFormat {
    pub size:          u32,
    pub flags:         u32,
    pub fourcc:        u32,
    pub rgb_bit_count: u32,
    pub r_bit_mask:    u32,
    pub g_bit_mask:    u32,
    pub b_bit_mask:    u32,
    pub a_bit_mask:    u32
}

/// The 124-byte DDS header following the magic
#[derive(Copy, Clone, Debug, Default)]
pub struct DdsHeader {
    pub size:                 u32,
    pub flags:                u32,
    pub height:               u32,
    pub width:                u32,
    pub pitch_or_linear_size: u32,
    pub depth:                u32,
    pub mip_map_count:        u32,
    pub reserved1:            [u32; 11],
    pub pixel_format:         DdsPixelFormat,
    pub caps:                 u32,
    pub caps2:                u32,
    pub caps3:                u32,
    pub caps4:                u32,
    pub reserved2:            u32
}

/// The 20-byte DX10 extension header
#[derive(Copy, Clone, Debug, Default)]
pub struct DdsHeaderDx10 {
    pub dxgi_format:        u32,
    pub resource_dimension: u32,
    pub misc_flags:         u32,
    pub array_size:         u32,
    pub misc_flags2:        u32
}

impl DdsHeader {
    pub fn read(stream: &mut ByteReader) -> Result<DdsHeader, ByteIoError> {
        let size = stream.get_u32_le_err()?;
        let flags = stream.get_u32_le_err()?;
        let height = stream.get_u32_le_err()?;
        let width = stream.get_u32_le_err()?;
        let pitch_or_linear_size = stream.get_u32_le_err()?;
        let depth = stream.get_u32_le_err()?;
        let mip_map_count = stream.get_u32_le_err()?;

        let mut reserved1 = [0_u32; 11];
        for slot in reserved1.iter_mut() {
            *slot = stream.get_u32_le_err()?;
        }

        let pixel_format = DdsPixelFormat {
            size:          stream.get_u32_le_err()?,
            flags:         stream.get_u32_le_err()?,
            fourcc:        stream.get_u32_le_err()?,
            rgb_bit_count: stream.get_u32_le_err()?,
            r_bit_mask:    stream.get_u32_le_err()?,
            g_bit_mask:    stream.get_u32_le_err()?,
            b_bit_mask:    stream.get_u32_le_err()?,
            a_bit_mask:    stream.get_u32_le_err()?
        };

        Ok(DdsHeader {
            size,
            flags,
            height,
            width,
            pitch_or_linear_size,
            depth,
            mip_map_count,
            reserved1,
            pixel_format,
            caps: stream.get_u32_le_err()?,
            caps2: stream.get_u32_le_err()?,
            caps3: stream.get_u32_le_err()?,
            caps4: stream.get_u32_le_err()?,
            reserved2: stream.get_u32_le_err()?
        })
    }

    pub fn write(&self, writer: &mut ByteWriter) {
        writer.write_u32_le(self.size);
        writer.write_u32_le(self.flags);
        writer.write_u32_le(self.height);
        writer.write_u32_le(self.width);
        writer.write_u32_le(self.pitch_or_linear_size);
        writer.write_u32_le(self.depth);
        writer.write_u32_le(self.mip_map_count);
        for slot in self.reserved1 {
            writer.write_u32_le(slot);
        }
        writer.write_u32_le(self.pixel_format.size);
        writer.write_u32_le(self.pixel_format.flags);
        writer.write_u32_le(self.pixel_format.fourcc);
        writer.write_u32_le(self.pixel_format.rgb_bit_count);
        writer.write_u32_le(self.pixel_format.r_bit_mask);
        writer.write_u32_le(self.pixel_format.g_bit_mask);
        writer.write_u32_le(self.pixel_format.b_bit_mask);
        writer.write_u32_le(self.pixel_format.a_bit_mask);
        writer.write_u32_le(self.caps);
        writer.write_u32_le(self.caps2);
        writer.write_u32_le(self.caps3);
        writer.write_u32_le(self.caps4);
        writer.write_u32_le(self.reserved2);
    }
}

impl DdsHeaderDx10 {
    pub fn read(stream: &mut ByteReader) -> Result<DdsHeaderDx10, ByteIoError> {
        Ok(DdsHeaderDx10 {
            dxgi_format:        stream.get_u32_le_err()?,
            resource_dimension: stream.get_u32_le_err()?,
            misc_flags:         stream.get_u32_le_err()?,
            array_size:         stream.get_u32_le_err()?,
            misc_flags2:        stream.get_u32_le_err()?
        })
    }

    pub fn write(&self, writer: &mut ByteWriter) {
        writer.write_u32_le(self.dxgi_format);
        writer.write_u32_le(self.resource_dimension);
        writer.write_u32_le(self.misc_flags);
        writer.write_u32_le(self.array_size);
        writer.write_u32_le(self.misc_flags2);
    }
}

/// The pixel-format block a texture format is written with
///
/// The wide formats route through the DX10 fourcc and carry their actual
/// bit count; the legacy 8-bit formats describe themselves with masks.
pub fn dds_pixel_format(format: TextureFormat) -> DdsPixelFormat {
    let (flags, fourcc, rgb_bit_count) = match format {
        TextureFormat::BGR8 => (DDPF_RGB, D3DFMT_R8G8B8, 24),
        TextureFormat::BGRA8 => (DDPF_RGBA, D3DFMT_A8B8G8R8, 32),
        TextureFormat::RGBA16 => (DDPF_FOURCC, DDS_DX10, 64),
        TextureFormat::RGBA16F => (DDPF_FOURCC, DDS_DX10, 64),
        _ => (DDPF_FOURCC, DDS_DX10, 128)
    };

    DdsPixelFormat {
        size: DDS_PIXELFORMAT_SIZE,
        flags,
        fourcc,
        rgb_bit_count,
        r_bit_mask: 0x00FF_0000,
        g_bit_mask: 0x0000_FF00,
        b_bit_mask: 0x0000_00FF,
        a_bit_mask: if format == TextureFormat::BGR8 { 0 } else { 0xFF00_0000 }
    }
}

/// The DXGI code written into the DX10 header
pub const fn dxgi_format(format: TextureFormat) -> u32 {
    match format {
        TextureFormat::RGBA16 => DXGI_FORMAT_R16G16B16A16_UINT,
        TextureFormat::RGBA16F => DXGI_FORMAT_R16G16B16A16_FLOAT,
        TextureFormat::RGBA32F => DXGI_FORMAT_R32G32B32A32_FLOAT,
        _ => 0
    }
}

/// rgbBitCount → the synthetic bit-count flag used in the format table
pub static TRANSLATE_BIT_COUNT: [(u32, u32); 3] = [
    (24, DDS_PF_BC_24),
    (32, DDS_PF_BC_32),
    (48, DDS_PF_BC_48)
];

/// fourcc or flags|bit-count → texture format
pub static TRANSLATE_DDS_FORMAT: [(u32, TextureFormat); 8] = [
    (D3DFMT_R8G8B8, TextureFormat::BGR8),
    (D3DFMT_A8R8G8B8, TextureFormat::BGRA8),
    (D3DFMT_A16B16G16R16, TextureFormat::RGBA16),
    (D3DFMT_A16B16G16R16F, TextureFormat::RGBA16F),
    (D3DFMT_A32B32G32R32F, TextureFormat::RGBA32F),
    (DDS_PF_BC_24 | DDPF_RGB, TextureFormat::BGR8),
    (DDS_PF_BC_32 | DDPF_RGBA, TextureFormat::BGRA8),
    (DDS_PF_BC_48 | DDPF_RGB, TextureFormat::RGB16)
];

/// DXGI code → texture format
pub static TRANSLATE_DXGI_FORMAT: [(u32, TextureFormat); 3] = [
    (DXGI_FORMAT_R16G16B16A16_UINT, TextureFormat::RGBA16),
    (DXGI_FORMAT_R16G16B16A16_FLOAT, TextureFormat::RGBA16F),
    (DXGI_FORMAT_R32G32B32A32_FLOAT, TextureFormat::RGBA32F)
];

/// Fill the header pair from an image's layout
///
/// The DX10 header is only meaningful when the pixel format selected the
/// DX10 fourcc; the encoder checks that before writing it.
pub fn headers_from_image(image: &Image) -> (DdsHeader, DdsHeaderDx10) {
    let pixel_format = dds_pixel_format(image.format());
    let bytes_per_pixel = image.format().bytes_per_pixel() as u32;

    let has_mip_maps = image.num_mips() > 1;
    let is_cubemap = image.num_faces() == 6;

    let header = DdsHeader {
        size: DDS_HEADER_SIZE as u32,
        flags: DDSD_CAPS
            | DDSD_HEIGHT
            | DDSD_WIDTH
            | DDSD_PIXELFORMAT
            | DDSD_PITCH
            | if has_mip_maps { DDSD_MIPMAPCOUNT } else { 0 },
        height: image.height(),
        width: image.width(),
        pitch_or_linear_size: image.width() * bytes_per_pixel,
        mip_map_count: u32::from(image.num_mips()),
        pixel_format,
        caps: DDSCAPS_TEXTURE
            | if has_mip_maps { DDSCAPS_MIPMAP } else { 0 }
            | if has_mip_maps || is_cubemap { DDSCAPS_COMPLEX } else { 0 },
        caps2: if is_cubemap { DDSCAPS2_CUBEMAP | DDS_CUBEMAP_ALLFACES } else { 0 },
        ..DdsHeader::default()
    };

    let dx10 = DdsHeaderDx10 {
        dxgi_format: dxgi_format(image.format()),
        resource_dimension: DDS_DIMENSION_TEXTURE2D,
        misc_flags: if is_cubemap { D3D10_RESOURCE_MISC_TEXTURECUBE } else { 0 },
        array_size: 1,
        misc_flags2: 0
    };

    (header, dx10)
}
