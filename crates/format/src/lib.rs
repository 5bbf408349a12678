//! Coarse raster image format detection.
//!
//! [`ImageFormat::from_magic_bytes`] looks at the first couple of bytes of an
//! encoded buffer and names the container format. It is a heuristic, not a
//! validator: nothing past the signature is read, and anything unrecognised
//! (including buffers too short to tell) is [`ImageFormat::Unknown`].

mod construct;
mod util;

pub use crate::construct::MIN_SNIFF_LEN;

/// An encoded raster image format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum ImageFormat {
    /// Portable Network Graphics (.png)
    Png,
    /// JPEG/JFIF (.jpg)
    Jpg,
    /// RIFF container, assumed WebP (.webp)
    Webp,
    /// Graphics Interchange Format (.gif)
    Gif,
    /// No recognised signature.
    #[default]
    Unknown,
}

#[cfg(test)]
mod tests {
    use crate::ImageFormat;

    #[test]
    fn format_default() {
        assert_eq!(ImageFormat::default(), ImageFormat::Unknown);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_uppercase() {
        assert_eq!(serde_json::to_string(&ImageFormat::Webp).unwrap(), "\"WEBP\"");
    }
}
