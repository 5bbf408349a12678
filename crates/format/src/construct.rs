use crate::ImageFormat;

/// Buffers shorter than this are never recognised.
pub const MIN_SNIFF_LEN: usize = 4;

const PNG_MAGIC: [u8; 2] = [0x89, 0x50];
const JPG_MAGIC: [u8; 2] = [0xFF, 0xD8];
// "RI" of "RIFF". Any RIFF container is reported as WebP.
const WEBP_MAGIC: [u8; 2] = [0x52, 0x49];
// "GI" of "GIF8".
const GIF_MAGIC: [u8; 2] = [0x47, 0x49];

impl ImageFormat {
    /// Detect the format from leading magic bytes.
    ///
    /// Total and deterministic: every input, including an empty slice, maps to
    /// exactly one variant.
    #[must_use]
    pub fn from_magic_bytes(bytes: &[u8]) -> Self {
        if bytes.len() < MIN_SNIFF_LEN {
            return ImageFormat::Unknown;
        }
        if bytes.starts_with(&PNG_MAGIC) {
            return ImageFormat::Png;
        }
        if bytes.starts_with(&JPG_MAGIC) {
            return ImageFormat::Jpg;
        }
        if bytes.starts_with(&WEBP_MAGIC) {
            return ImageFormat::Webp;
        }
        if bytes.starts_with(&GIF_MAGIC) {
            return ImageFormat::Gif;
        }
        ImageFormat::Unknown
    }
}
