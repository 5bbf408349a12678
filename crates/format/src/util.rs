use crate::ImageFormat;
use std::fmt::{Display, Formatter, Result as FmtResult};

impl Display for ImageFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl ImageFormat {
    /// Returns the file extension for this format, including the dot.
    #[inline]
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => ".png",
            ImageFormat::Jpg => ".jpg",
            ImageFormat::Webp => ".webp",
            ImageFormat::Gif => ".gif",
            ImageFormat::Unknown => "",
        }
    }

    /// Returns the upper-case label shown to users.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpg => "JPG",
            ImageFormat::Webp => "WEBP",
            ImageFormat::Gif => "GIF",
            ImageFormat::Unknown => "UNKNOWN",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ImageFormat;
    use rstest::rstest;

    #[rstest]
    #[case(ImageFormat::Png, ".png", "PNG")]
    #[case(ImageFormat::Jpg, ".jpg", "JPG")]
    #[case(ImageFormat::Webp, ".webp", "WEBP")]
    #[case(ImageFormat::Gif, ".gif", "GIF")]
    #[case(ImageFormat::Unknown, "", "UNKNOWN")]
    fn test_labels(#[case] format: ImageFormat, #[case] extension: &str, #[case] label: &str) {
        assert_eq!(format.extension(), extension);
        assert_eq!(format.to_string(), label);
    }
}
