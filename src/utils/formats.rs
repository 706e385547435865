use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Media type of every compressed artifact.
pub const JPEG_MEDIA_TYPE: &str = "image/jpeg";

/// Media type for anything we cannot identify from its extension.
pub const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// Media types offered by the file picker. The filter accepts any `image/*`.
pub const ACCEPTED_MEDIA_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

const COMPRESSED_SUFFIX: &str = "_compressed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    JPEG,
    PNG,
    WebP,
    GIF,
    BMP,
    TIFF,
    AVIF,
}

impl ImageFormat {
    /// Declared media type, as a browser would report it for a file
    pub fn media_type(&self) -> &'static str {
        match self {
            Self::JPEG => "image/jpeg",
            Self::PNG => "image/png",
            Self::WebP => "image/webp",
            Self::GIF => "image/gif",
            Self::BMP => "image/bmp",
            Self::TIFF => "image/tiff",
            Self::AVIF => "image/avif",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(ext: &str) -> Result<Self, Self::Err> {
        let ext = ext.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Ok(Self::JPEG),
            "png" => Ok(Self::PNG),
            "webp" => Ok(Self::WebP),
            "gif" => Ok(Self::GIF),
            "bmp" => Ok(Self::BMP),
            "tif" | "tiff" => Ok(Self::TIFF),
            "avif" => Ok(Self::AVIF),
            _ => Err(format!("Unsupported image format: {}", ext)),
        }
    }
}

/// Guess the declared media type of a file from its extension.
pub fn media_type_from_path(path: impl AsRef<Path>) -> &'static str {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .and_then(|e| ImageFormat::from_str(e).ok())
        .map(|f| f.media_type())
        .unwrap_or(UNKNOWN_MEDIA_TYPE)
}

/// Whether a declared media type denotes an image.
pub fn is_image_media_type(media_type: &str) -> bool {
    media_type
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

/// Download name for a compressed file: the original name with its final
/// extension replaced by `_compressed.jpg`.
///
/// `photo.png` becomes `photo_compressed.jpg`, `a.b.webp` becomes
/// `a.b_compressed.jpg`, and a name without extension just gains the suffix.
pub fn compressed_file_name(original: &str) -> String {
    let base = match original.rfind('.') {
        Some(dot) if dot + 1 < original.len() && !original[dot + 1..].contains('/') => {
            &original[..dot]
        }
        _ => original,
    };
    format!("{base}{COMPRESSED_SUFFIX}.jpg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_follows_extension() {
        assert_eq!(media_type_from_path("holiday.JPG"), "image/jpeg");
        assert_eq!(media_type_from_path("dir/scan.png"), "image/png");
        assert_eq!(media_type_from_path("notes.txt"), UNKNOWN_MEDIA_TYPE);
        assert_eq!(media_type_from_path("README"), UNKNOWN_MEDIA_TYPE);
    }

    #[test]
    fn image_prefix_check() {
        assert!(is_image_media_type("image/png"));
        assert!(is_image_media_type("IMAGE/x-icon"));
        assert!(!is_image_media_type("text/plain"));
        assert!(!is_image_media_type("image"));
        assert!(!is_image_media_type(""));
    }

    #[test]
    fn accepted_types_are_images() {
        assert!(ACCEPTED_MEDIA_TYPES.iter().all(|t| is_image_media_type(t)));
    }

    #[test]
    fn compressed_names_always_end_in_jpg() {
        assert_eq!(compressed_file_name("photo.png"), "photo_compressed.jpg");
        assert_eq!(compressed_file_name("photo.jpeg"), "photo_compressed.jpg");
        assert_eq!(compressed_file_name("a.b.webp"), "a.b_compressed.jpg");
        assert_eq!(compressed_file_name("noext"), "noext_compressed.jpg");
        assert_eq!(compressed_file_name("trailing."), "trailing._compressed.jpg");
    }

    #[test]
    fn extension_matching_ignores_case() {
        assert_eq!("JPEG".parse::<ImageFormat>(), Ok(ImageFormat::JPEG));
        assert_eq!("Tif".parse::<ImageFormat>(), Ok(ImageFormat::TIFF));
        assert!("jpgx".parse::<ImageFormat>().is_err());
    }
}
