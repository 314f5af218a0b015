// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// Media formats recognized by signature sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Webp,
    Tiff,
    Ico,
}

impl ImageFormat {
    /// Canonical file extension for the detected format.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Webp => "webp",
            ImageFormat::Tiff => "tiff",
            ImageFormat::Ico => "ico",
        }
    }
}

/// Detect the media format of a byte buffer by its magic bytes.
///
/// The declared content type and the URL extension are never trusted;
/// this check gates every write to disk. Empty or truncated buffers
/// are reported as unrecognized.
pub fn detect(buf: &[u8]) -> Option<ImageFormat> {
    if buf.len() < 12 {
        return None;
    }

    if buf.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(ImageFormat::Jpeg);
    }
    if buf.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some(ImageFormat::Png);
    }
    if buf.starts_with(b"GIF87a") || buf.starts_with(b"GIF89a") {
        return Some(ImageFormat::Gif);
    }
    if buf.starts_with(b"RIFF") && &buf[8..12] == b"WEBP" {
        return Some(ImageFormat::Webp);
    }
    if buf.starts_with(b"BM") {
        return Some(ImageFormat::Bmp);
    }
    if buf.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || buf.starts_with(&[0x4D, 0x4D, 0x00, 0x2A]) {
        return Some(ImageFormat::Tiff);
    }
    if buf.starts_with(&[0x00, 0x00, 0x01, 0x00]) {
        return Some(ImageFormat::Ico);
    }

    None
}

/// Whether the buffer holds a recognized media format.
pub fn is_image(buf: &[u8]) -> bool {
    detect(buf).is_some()
}
