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

/// DDS decoding errors
pub enum DdsDecodeErrors {
    /// The first four bytes are not `DDS `
    InvalidMagicBytes,
    /// A header field failed validation
    InvalidHeader(&'static str),
    /// The pixel format could not be mapped to a texture format
    UnsupportedPixelFormat,
    /// Arrays, volume textures, non-2D resources or partial cubemaps
    UnsupportedLayout(&'static str),
    /// Too large dimensions for a given dimension
    TooLargeDimensions(&'static str, usize, usize),
    /// Generic message
    Generic(&'static str),
    /// An I/O error from the underlying bytestream
    IoErrors(ByteIoError)
}

impl Debug for DdsDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DdsDecodeErrors::InvalidMagicBytes => {
                writeln!(f, "Invalid magic bytes, file does not start with 'DDS '")
            }
            DdsDecodeErrors::InvalidHeader(err) => {
                writeln!(f, "Invalid Dds header: {err}")
            }
            DdsDecodeErrors::UnsupportedPixelFormat => {
                writeln!(f, "Dds pixel format is not supported")
            }
            DdsDecodeErrors::UnsupportedLayout(err) => {
                writeln!(f, "Unsupported Dds layout: {err}")
            }
            DdsDecodeErrors::TooLargeDimensions(dimension, expected, found) => {
                writeln!(
                    f,
                    "Too large dimensions for {dimension}, {found} exceeds {expected}"
                )
            }
            DdsDecodeErrors::Generic(err) => {
                writeln!(f, "{err}")
            }
            DdsDecodeErrors::IoErrors(err) => {
                writeln!(f, "{err:?}")
            }
        }
    }
}

impl Display for DdsDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for DdsDecodeErrors {}

impl From<ByteIoError> for DdsDecodeErrors {
    fn from(value: ByteIoError) -> Self {
        DdsDecodeErrors::IoErrors(value)
    }
}

impl From<&'static str> for DdsDecodeErrors {
    fn from(value: &'static str) -> Self {
        DdsDecodeErrors::Generic(value)
    }
}

/// DDS encoding errors
pub enum DdsEncodeErrors {
    /// The image format cannot be stored in a DDS file
    UnsupportedTextureFormat(TextureFormat)
}

impl Debug for DdsEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DdsEncodeErrors::UnsupportedTextureFormat(format) => {
                writeln!(f, "Unsupported texture format {} for Dds", format.name())
            }
        }
    }
}

impl Display for DdsEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for DdsEncodeErrors {}
