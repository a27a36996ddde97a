/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fmt::{Debug, Display, Formatter};

use envmap_core::bytestream::ByteIoError;
use envmap_core::format::TextureFormat;

/// KTX decoding errors
pub enum KtxDecodeErrors {
    /// The 12 magic bytes are wrong
    InvalidMagicBytes,
    /// The endianness field does not match little-endian storage
    UnsupportedEndianness(u32),
    /// The glInternalFormat is not one the registry maps
    UnsupportedInternalFormat(u32),
    /// Array, 3D or partial-cubemap layouts
    UnsupportedLayout(&'static str),
    /// Too large dimensions for a given dimension
    TooLargeDimensions(&'static str, usize, usize),
    /// A header field is inconsistent
    InvalidHeader(&'static str),
    /// Generic message
    Generic(&'static str),
    /// An I/O error from the underlying bytestream
    IoErrors(ByteIoError)
}

impl Debug for KtxDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KtxDecodeErrors::InvalidMagicBytes => {
                writeln!(f, "Invalid magic bytes, not a KTX 11 file")
            }
            KtxDecodeErrors::UnsupportedEndianness(value) => {
                writeln!(
                    f,
                    "Unsupported endianness marker {value:#010X}, only little endian files are read"
                )
            }
            KtxDecodeErrors::UnsupportedInternalFormat(gl) => {
                writeln!(f, "Ktx glInternalFormat {gl:#06X} is not supported")
            }
            KtxDecodeErrors::UnsupportedLayout(err) => {
                writeln!(f, "Unsupported Ktx layout: {err}")
            }
            KtxDecodeErrors::TooLargeDimensions(dimension, expected, found) => {
                writeln!(
                    f,
                    "Too large dimensions for {dimension}, {found} exceeds {expected}"
                )
            }
            KtxDecodeErrors::InvalidHeader(err) => {
                writeln!(f, "Invalid Ktx header: {err}")
            }
            KtxDecodeErrors::Generic(err) => {
                writeln!(f, "{err}")
            }
            KtxDecodeErrors::IoErrors(err) => {
                writeln!(f, "{err:?}")
            }
        }
    }
}

impl Display for KtxDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for KtxDecodeErrors {}

impl From<ByteIoError> for KtxDecodeErrors {
    fn from(value: ByteIoError) -> Self {
        KtxDecodeErrors::IoErrors(value)
    }
}

impl From<&'static str> for KtxDecodeErrors {
    fn from(value: &'static str) -> Self {
        KtxDecodeErrors::Generic(value)
    }
}

/// KTX encoding errors
pub enum KtxEncodeErrors {
    /// The image format cannot be stored in a KTX file
    UnsupportedTextureFormat(TextureFormat)
}

impl Debug for KtxEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KtxEncodeErrors::UnsupportedTextureFormat(format) => {
                writeln!(f, "Unsupported texture format {} for Ktx", format.name())
            }
        }
    }
}

impl Display for KtxEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for KtxEncodeErrors {}
