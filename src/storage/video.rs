// Video model
// What a storage backend hands back after an upload

use serde::{Deserialize, Serialize};

/// A stored video and where it can be fetched from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub url: String,
    /// RFC 3339
    pub created_at: String,
}

impl Video {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            url: url.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_video_fields() {
        let video = Video::new("clip.mp4", "https://cdn.example.com/clip.mp4");
        assert!(uuid::Uuid::parse_str(&video.id).is_ok());
        assert!(chrono::DateTime::parse_from_rfc3339(&video.created_at).is_ok());
        assert_ne!(video.id, Video::new("a", "b").id);
    }

    #[test]
    fn test_json_shape() {
        let video = Video {
            id: "1".into(),
            title: "t".into(),
            url: "u".into(),
            created_at: "2024-12-13T16:27:46Z".into(),
        };
        let json = serde_json::to_value(&video).unwrap();
        assert_eq!(json["created_at"], "2024-12-13T16:27:46Z");
        assert_eq!(json["url"], "u");
    }
}
