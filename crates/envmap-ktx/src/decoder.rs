/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use envmap_core::bytestream::ByteReader;
use envmap_core::format::TextureFormat;
use envmap_core::image::{self, Image, CUBE_FACE_COUNT, MAX_MIP_COUNT};
use envmap_core::options::DecoderOptions;
use log::{trace, warn};

use crate::common::{KtxHeader, TRANSLATE_KTX_FORMAT, KTX_ENDIAN_REF, KTX_MAGIC};
use crate::common::pad_len;
use crate::errors::KtxDecodeErrors;

/// A KTX decoder for 2D and cubemap textures
pub struct KtxDecoder<'a> {
    stream:          ByteReader<'a>,
    options:         DecoderOptions,
    header:          KtxHeader,
    format:          TextureFormat,
    decoded_headers: bool
}

impl<'a> KtxDecoder<'a> {
    /// Create a new KTX decoder reading from `data`
    pub fn new(data: &'a [u8]) -> KtxDecoder<'a> {
        Self::new_with_options(data, DecoderOptions::default())
    }

    /// Create a new KTX decoder with custom options
    pub fn new_with_options(data: &'a [u8], options: DecoderOptions) -> KtxDecoder<'a> {
        KtxDecoder {
            stream: ByteReader::new(data),
            options,
            header: KtxHeader::default(),
            format: TextureFormat::Unknown,
            decoded_headers: false
        }
    }

    /// Image dimensions as `(width, height)`, present once the headers
    /// have been decoded
    pub const fn dimensions(&self) -> Option<(usize, usize)> {
        if self.decoded_headers {
            Some((self.header.pixel_width as usize, self.header.pixel_height as usize))
        } else {
            None
        }
    }

    /// The texture format pixels will decode into, present once the
    /// headers have been decoded
    pub const fn texture_format(&self) -> Option<TextureFormat> {
        if self.decoded_headers {
            Some(self.format)
        } else {
            None
        }
    }

    /// Parse and validate the magic bytes and the 52-byte header,
    /// leaving the cursor at the key/value block
    pub fn decode_headers(&mut self) -> Result<(), KtxDecodeErrors> {
        if self.decoded_headers {
            return Ok(());
        }

        let magic = self.stream.read_fixed_bytes_or_error::<12>()?;
        if magic != KTX_MAGIC {
            return Err(KtxDecodeErrors::InvalidMagicBytes);
        }

        let mut header = KtxHeader::read(&mut self.stream)?;

        if header.endianness != KTX_ENDIAN_REF {
            warn!("Ktx endianness marker {:#010X} is not little endian.", header.endianness);
            return Err(KtxDecodeErrors::UnsupportedEndianness(header.endianness));
        }

        if header.num_mips == 0 {
            if self.options.strict_mode() {
                return Err(KtxDecodeErrors::InvalidHeader("mip count is zero"));
            }
            warn!("Ktx image mip count is 0. Setting to 1.");
            header.num_mips = 1;
        }

        if header.num_array_elements != 0 {
            return Err(KtxDecodeErrors::UnsupportedLayout("array textures"));
        }
        if header.pixel_depth > 1 {
            return Err(KtxDecodeErrors::UnsupportedLayout("3D textures"));
        }
        if header.num_faces != 1 && header.num_faces != CUBE_FACE_COUNT as u32 {
            return Err(KtxDecodeErrors::UnsupportedLayout("partial cubemaps"));
        }
        if header.num_mips as usize > MAX_MIP_COUNT {
            return Err(KtxDecodeErrors::InvalidHeader("mip count out of range"));
        }
        if header.pixel_width == 0 || header.pixel_height == 0 {
            return Err(KtxDecodeErrors::InvalidHeader("zero image dimension"));
        }
        if header.pixel_width as usize > self.options.max_width() {
            return Err(KtxDecodeErrors::TooLargeDimensions(
                "width",
                self.options.max_width(),
                header.pixel_width as usize
            ));
        }
        if header.pixel_height as usize > self.options.max_height() {
            return Err(KtxDecodeErrors::TooLargeDimensions(
                "height",
                self.options.max_height(),
                header.pixel_height as usize
            ));
        }

        self.format = TRANSLATE_KTX_FORMAT
            .iter()
            .find(|(gl, _)| *gl == header.gl_internal_format)
            .map(|(_, format)| *format)
            .ok_or(KtxDecodeErrors::UnsupportedInternalFormat(header.gl_internal_format))?;

        trace!("Width: {}", header.pixel_width);
        trace!("Height: {}", header.pixel_height);
        trace!("Faces: {}", header.num_faces);
        trace!("Mips: {}", header.num_mips);
        trace!("Format: {}", self.format.name());

        self.header = header;
        self.decoded_headers = true;

        Ok(())
    }

    /// Decode the file into an image, stripping all alignment padding
    pub fn decode(&mut self) -> Result<Image, KtxDecodeErrors> {
        self.decode_headers()?;

        let header = self.header;
        let width = header.pixel_width;
        let height = header.pixel_height;
        let num_faces = header.num_faces as u8;
        let num_mips = header.num_mips as u8;
        let bytes_per_pixel = self.format.bytes_per_pixel();

        let data_size = image::byte_size(width, height, self.format, num_mips, num_faces);
        let mut data = vec![0_u8; data_size];

        // tightly packed destination offsets, face-major
        let mut offsets = [[0_usize; MAX_MIP_COUNT]; CUBE_FACE_COUNT];
        let mut offset = 0_usize;
        for face in 0..usize::from(num_faces) {
            for mip in 0..num_mips {
                offsets[face][usize::from(mip)] = offset;
                let mip_width = 1.max(width >> mip) as usize;
                let mip_height = 1.max(height >> mip) as usize;
                offset += mip_width * mip_height * bytes_per_pixel;
            }
        }

        // key/value pairs are not interpreted
        self.stream.skip(header.bytes_key_value as usize);

        for mip in 0..num_mips {
            let mip_width = 1.max(width >> mip) as usize;
            let mip_height = 1.max(height >> mip) as usize;
            let pitch = mip_width * bytes_per_pixel;

            let face_size = self.stream.get_u32_le_err()? as usize;
            let mip_size = face_size * usize::from(num_faces);

            let pitch_pad = pad_len(pitch);
            let face_pad = pad_len(face_size);
            let mip_pad = pad_len(mip_size);

            if face_size != (pitch + pitch_pad) * mip_height {
                if self.options.strict_mode() {
                    return Err(KtxDecodeErrors::InvalidHeader("face size mismatch"));
                }
                warn!("Ktx face size {face_size} does not match the mip layout.");
            }

            for face in 0..usize::from(num_faces) {
                let face_data = &mut data[offsets[face][usize::from(mip)]..];

                if pitch_pad == 0 {
                    self.stream.read_exact(&mut face_data[..pitch * mip_height])?;
                } else {
                    // unaligned rows: read each row and jump its padding
                    for row in face_data[..pitch * mip_height].chunks_exact_mut(pitch) {
                        self.stream.read_exact(row)?;
                        self.stream.skip(pitch_pad);
                    }
                }

                self.stream.skip(face_pad);
            }

            self.stream.skip(mip_pad);
        }

        Image::from_parts(data, width, height, self.format, num_mips, num_faces)
            .map_err(KtxDecodeErrors::Generic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_magic() {
        let mut file = vec![0_u8; 64];
        file[..4].copy_from_slice(b"KTX1");
        assert!(matches!(
            KtxDecoder::new(&file).decode(),
            Err(KtxDecodeErrors::InvalidMagicBytes)
        ));
    }

    #[test]
    fn rejects_unknown_internal_format() {
        let mut writer = envmap_core::bytestream::ByteWriter::new();
        writer.write_all(&KTX_MAGIC);
        let header = KtxHeader {
            endianness: KTX_ENDIAN_REF,
            gl_internal_format: 0x93B0, // an ASTC block format
            pixel_width: 4,
            pixel_height: 4,
            num_faces: 1,
            num_mips: 1,
            ..KtxHeader::default()
        };
        header.write(&mut writer);

        let file = writer.into_inner();
        assert!(matches!(
            KtxDecoder::new(&file).decode(),
            Err(KtxDecodeErrors::UnsupportedInternalFormat(0x93B0))
        ));
    }

    #[test]
    fn rejects_array_textures() {
        let mut writer = envmap_core::bytestream::ByteWriter::new();
        writer.write_all(&KTX_MAGIC);
        let header = KtxHeader {
            endianness: KTX_ENDIAN_REF,
            gl_internal_format: crate::common::GL_RGBA8UI,
            pixel_width: 4,
            pixel_height: 4,
            num_array_elements: 3,
            num_faces: 1,
            num_mips: 1,
            ..KtxHeader::default()
        };
        header.write(&mut writer);

        let file = writer.into_inner();
        assert!(matches!(
            KtxDecoder::new(&file).decode(),
            Err(KtxDecodeErrors::UnsupportedLayout("array textures"))
        ));
    }
}
