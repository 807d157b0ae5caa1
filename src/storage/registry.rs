// Video registry
// Maps video ids to stored videos so each stream request resolves its own id

use std::collections::HashMap;
use tokio::sync::RwLock;

use super::video::Video;

/// In-memory id -> video lookup
#[derive(Debug, Default)]
pub struct VideoRegistry {
    videos: RwLock<HashMap<String, Video>>,
}

impl VideoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, video: Video) {
        self.videos.write().await.insert(video.id.clone(), video);
    }

    pub async fn get(&self, id: &str) -> Option<Video> {
        self.videos.read().await.get(id).cloned()
    }

    /// All videos, oldest first
    pub async fn list(&self) -> Vec<Video> {
        let mut videos: Vec<Video> = self.videos.read().await.values().cloned().collect();
        videos.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        videos
    }
}
