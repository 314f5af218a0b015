// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::Url;

/// Extensions written through as-is; anything else falls back to the default.
pub const KNOWN_EXTENSIONS: [&str; 10] = [
    "jpe", "jpeg", "jfif", "exif", "tiff", "gif", "bmp", "png", "webp", "jpg",
];

/// Fallback extension for links with no recognizable extension.
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Derive the destination file extension from a link's URL path.
///
/// Query strings and fragments are ignored, the comparison is
/// case-insensitive, and unknown extensions map to [`DEFAULT_EXTENSION`].
/// This is only a naming hint; persistence is gated on signature sniffing.
pub fn file_extension(link: &str) -> String {
    let path = match Url::parse(link) {
        Ok(url) => url.path().to_string(),
        // Not an absolute URL; strip any query manually
        Err(_) => link.split(['?', '#']).next().unwrap_or("").to_string(),
    };

    let basename = path.rsplit('/').next().unwrap_or("");
    let ext = match basename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => return DEFAULT_EXTENSION.to_string(),
    };

    if KNOWN_EXTENSIONS.contains(&ext.as_str()) {
        ext
    } else {
        DEFAULT_EXTENSION.to_string()
    }
}

/// Build the destination filename `{base}_{index}.{ext}` for a link.
pub fn destination_name(base: &str, index: usize, link: &str) -> String {
    format!("{}_{}.{}", base, index, file_extension(link))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_uppercase_with_query() {
        assert_eq!(
            file_extension("https://example.com/photos/cat.PNG?size=large"),
            "png"
        );
    }

    #[test]
    fn test_extension_known_passthrough() {
        assert_eq!(file_extension("https://example.com/a/b/pic.jfif"), "jfif");
        assert_eq!(file_extension("https://example.com/x.webp"), "webp");
    }

    #[test]
    fn test_extension_unknown_defaults() {
        assert_eq!(file_extension("https://example.com/image.php"), "jpg");
        assert_eq!(file_extension("https://example.com/image"), "jpg");
        assert_eq!(file_extension("https://example.com/"), "jpg");
    }

    #[test]
    fn test_extension_unparseable_link() {
        assert_eq!(file_extension("not a url at all"), "jpg");
        assert_eq!(file_extension("thing.jpeg?x=1"), "jpeg");
    }

    #[test]
    fn test_destination_name() {
        assert_eq!(
            destination_name("Image", 3, "https://example.com/cat.gif"),
            "Image_3.gif"
        );
        assert_eq!(
            destination_name("cats", 12, "https://example.com/download?id=9"),
            "cats_12.jpg"
        );
    }
}
