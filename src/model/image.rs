use serde::{Deserialize, Serialize};

use crate::model::common::{null_as_default, GameId, ImageId, Timestamp};

/// A photo attached to a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameImage {
    pub id: ImageId,
    #[serde(default)]
    pub game_id: GameId,
    /// Object path inside the image bucket.
    pub storage_path: String,
    pub caption: Option<String>,
    /// At most one image per game should carry the flag.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_cover: bool,
    pub created_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_gallery_row() {
        let json = r#"[
            {"id": 5, "storage_path": "g1/1709300000000-brett.jpg", "caption": null,
             "is_cover": true, "created_at": "2024-03-01T19:13:20+00:00"},
            {"id": 6, "game_id": "g1", "storage_path": "g1/1709300000001-box.jpg",
             "caption": "Schachtel", "is_cover": null, "created_at": "2024-03-01T19:14:00+00:00"}
        ]"#;
        let images: Vec<GameImage> = serde_json::from_str(json).unwrap();
        assert!(images[0].is_cover);
        assert!(images[0].game_id.is_empty());
        assert!(!images[1].is_cover);
        assert_eq!(images[1].caption.as_deref(), Some("Schachtel"));
    }
}
