/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! DDS encoder

use envmap_core::bytestream::ByteWriter;
use envmap_core::format::ImageFileType;
use envmap_core::image::Image;

use crate::common::{headers_from_image, DDS_DX10, DDS_MAGIC};
use crate::errors::DdsEncodeErrors;

/// A DDS encoder
///
/// Writes the magic, the 124-byte header, the DX10 extension header when
/// the format's pixel-format block selects the `DX10` fourcc, and then
/// the raw pixel stream, face-major then mip-major.
pub struct DdsEncoder<'a> {
    image: &'a Image
}

impl<'a> DdsEncoder<'a> {
    /// Create a new DDS encoder for `image`
    pub const fn new(image: &'a Image) -> DdsEncoder<'a> {
        DdsEncoder { image }
    }

    /// Encode the image, returning the file bytes
    pub fn encode(&self) -> Result<Vec<u8>, DdsEncodeErrors> {
        let image = self.image;

        if !ImageFileType::DDS.is_format_allowed(image.format()) {
            return Err(DdsEncodeErrors::UnsupportedTextureFormat(image.format()));
        }

        let (header, dx10) = headers_from_image(image);

        let mut writer = ByteWriter::with_capacity(image.data_size() + 256);
        writer.write_u32_le(DDS_MAGIC);
        header.write(&mut writer);

        if header.pixel_format.fourcc == DDS_DX10 {
            dx10.write(&mut writer);
        }

        writer.write_all(image.data());

        Ok(writer.into_inner())
    }
}
