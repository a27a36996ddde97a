/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A DirectDraw Surface decoder and encoder
//!
//! Handles uncompressed 2D textures and full cubemaps with mip chains in
//! the formats the registry allows for DDS, both through the legacy
//! pixel-format block and through the DX10 extension header.
//!
//! # Quirks handled on read
//! - a mip count of zero is coerced to one
//! - files that flag a DX10 header without actually writing one are
//!   detected by sizing the remaining data and the bogus header bytes are
//!   handed back to the pixel stream
//! - unmapped pixel formats fall back to a bytes-per-pixel guess over the
//!   allowed DDS formats, loudly
//!
//! # Not supported
//! - block-compressed data (DXT/BC fourccs are recognized only to be
//!   rejected)
//! - texture arrays, volume textures and partial cubemaps

#![forbid(unsafe_code)]

pub use decoder::DdsDecoder;
pub use encoder::DdsEncoder;
pub use errors::{DdsDecodeErrors, DdsEncodeErrors};

mod common;
mod decoder;
mod encoder;
mod errors;
