use serde::{Deserialize, Serialize};

/// A fill or stroke attached to a node.
///
/// Only [`Image`](Self::Image) paints matter to the scanner; the rest are
/// kept so that documents round-trip and so unknown paint types don't fail
/// deserialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Paint {
    Solid,
    GradientLinear,
    GradientRadial,
    GradientAngular,
    GradientDiamond,
    Image {
        #[serde(rename = "imageHash", default)]
        image_hash: Option<String>,
    },
    Video,
    #[serde(other)]
    Other,
}
impl Paint {
    pub fn image(hash: impl Into<String>) -> Self {
        Paint::Image { image_hash: Some(hash.into()) }
    }

    /// The content hash, if this is an image paint that carries one.
    pub fn image_hash(&self) -> Option<&str> {
        match self {
            Paint::Image { image_hash } => image_hash.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_image_paint() {
        let paint: Paint = serde_json::from_str(r#"{"type":"IMAGE","imageHash":"abc","scaleMode":"FILL"}"#).unwrap();
        assert_eq!(paint.image_hash(), Some("abc"));
    }

    #[test]
    fn test_deserialize_image_paint_without_hash() {
        let paint: Paint = serde_json::from_str(r#"{"type":"IMAGE"}"#).unwrap();
        assert_eq!(paint, Paint::Image { image_hash: None });
        assert_eq!(paint.image_hash(), None);
    }

    #[test]
    fn test_deserialize_other_paints() {
        let solid: Paint = serde_json::from_str(r#"{"type":"SOLID","color":{"r":1,"g":0,"b":0}}"#).unwrap();
        assert_eq!(solid, Paint::Solid);
        let pattern: Paint = serde_json::from_str(r#"{"type":"PATTERN"}"#).unwrap();
        assert_eq!(pattern, Paint::Other);
        assert_eq!(pattern.image_hash(), None);
    }
}
