/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A KTX (Khronos texture container, version 1) decoder and encoder
//!
//! Handles 2D and cubemap textures with full mip chains in the
//! uncompressed sized internal formats the registry allows for KTX.
//! Rows, faces and mip levels honor the container's 4-byte
//! `UNPACK_ALIGNMENT` padding on both the read and write paths.
//!
//! # Not supported
//! - Array textures and 3D textures
//! - Big-endian files
//! - Compressed internal formats

#![forbid(unsafe_code)]

pub use decoder::KtxDecoder;
pub use encoder::KtxEncoder;
pub use errors::{KtxDecodeErrors, KtxEncodeErrors};

mod common;
mod decoder;
mod encoder;
mod errors;
