/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! KTX encoder

use envmap_core::bytestream::ByteWriter;
use envmap_core::format::ImageFileType;
use envmap_core::image::Image;

use crate::common::{header_from_image, pad_len, KTX_MAGIC};
use crate::errors::KtxEncodeErrors;

/// A KTX encoder
///
/// Writes every face and every mip level, padding rows, faces and mip
/// levels with zero bytes to the container's 4-byte unpack alignment.
pub struct KtxEncoder<'a> {
    image: &'a Image
}

impl<'a> KtxEncoder<'a> {
    /// Create a new KTX encoder for `image`
    pub const fn new(image: &'a Image) -> KtxEncoder<'a> {
        KtxEncoder { image }
    }

    /// Encode the image, returning the file bytes
    pub fn encode(&self) -> Result<Vec<u8>, KtxEncodeErrors> {
        let image = self.image;

        if !ImageFileType::KTX.is_format_allowed(image.format()) {
            return Err(KtxEncodeErrors::UnsupportedTextureFormat(image.format()));
        }

        let bytes_per_pixel = image.format().bytes_per_pixel();
        let offsets = image.mip_offsets();
        let num_faces = usize::from(image.num_faces());

        let mut writer = ByteWriter::with_capacity(image.data_size() + 256);

        writer.write_all(&KTX_MAGIC);
        header_from_image(image).write(&mut writer);

        const PAD: [u8; 4] = [0; 4];

        for mip in 0..image.num_mips() {
            let (mip_width, mip_height) = image.mip_dimensions(mip);
            let pitch = mip_width as usize * bytes_per_pixel;
            let face_size = pitch * mip_height as usize;
            let mip_size = face_size * num_faces;

            let pitch_pad = pad_len(pitch);
            let face_pad = pad_len(face_size);
            let mip_pad = pad_len(mip_size);

            writer.write_u32_le(face_size as u32);

            for face in 0..num_faces {
                let offset = offsets[face][usize::from(mip)];
                let face_data = &image.data()[offset..offset + face_size];

                if pitch_pad == 0 {
                    writer.write_all(face_data);
                } else {
                    for row in face_data.chunks_exact(pitch) {
                        writer.write_all(row);
                        writer.write_all(&PAD[..pitch_pad]);
                    }
                }

                writer.write_all(&PAD[..face_pad]);
            }

            writer.write_all(&PAD[..mip_pad]);
        }

        Ok(writer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::KtxDecoder;
    use envmap_core::format::TextureFormat;
    use envmap_core::image;

    fn roundtrip(image: &Image) -> Image {
        let encoded = KtxEncoder::new(image).encode().unwrap();
        KtxDecoder::new(&encoded).decode().unwrap()
    }

    #[test]
    fn aligned_cubemap_roundtrip_is_bit_exact() {
        let size = image::byte_size(4, 4, TextureFormat::RGBA8, 3, 6);
        let data: Vec<u8> = (0..size).map(|i| (i * 31) as u8).collect();
        let cube = Image::from_parts(data, 4, 4, TextureFormat::RGBA8, 3, 6).unwrap();

        let decoded = roundtrip(&cube);
        assert_eq!(decoded.format(), TextureFormat::RGBA8);
        assert_eq!(decoded.num_faces(), 6);
        assert_eq!(decoded.num_mips(), 3);
        assert_eq!(decoded.data(), cube.data());
    }

    #[test]
    fn unaligned_rows_survive_padding() {
        // 3-wide RGB8 rows are 9 bytes, forcing the row padding path
        let size = image::byte_size(3, 2, TextureFormat::RGB8, 1, 1);
        let data: Vec<u8> = (0..size).map(|i| i as u8).collect();
        let flat = Image::from_parts(data, 3, 2, TextureFormat::RGB8, 1, 1).unwrap();

        let encoded = KtxEncoder::new(&flat).encode().unwrap();
        // 12 magic + 52 header + 4 face size + 2 rows of (9 + 3 pad)
        // + 2 face pad + 2 mip pad
        assert_eq!(encoded.len(), 12 + 52 + 4 + 2 * 12 + 2 + 2);

        let decoded = KtxDecoder::new(&encoded).decode().unwrap();
        assert_eq!(decoded.data(), flat.data());
    }

    #[test]
    fn mip_chain_with_odd_pitch_roundtrips() {
        let size = image::byte_size(6, 6, TextureFormat::RGB8, 3, 1);
        let data: Vec<u8> = (0..size).map(|i| (i * 7) as u8).collect();
        let flat = Image::from_parts(data, 6, 6, TextureFormat::RGB8, 3, 1).unwrap();

        let decoded = roundtrip(&flat);
        assert_eq!(decoded.num_mips(), 3);
        assert_eq!(decoded.data(), flat.data());
    }

    #[test]
    fn rejects_bgra_storage() {
        let image = Image::from_parts(vec![0; 4], 1, 1, TextureFormat::BGRA8, 1, 1).unwrap();
        assert!(matches!(
            KtxEncoder::new(&image).encode(),
            Err(KtxEncodeErrors::UnsupportedTextureFormat(_))
        ));
    }
}
