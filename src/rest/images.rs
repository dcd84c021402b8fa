use chrono::Utc;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::error::{LudothekError, Result};
use crate::model::{GameId, GameImage, ImageId, Timestamp};
use crate::projection::DayRange;
use crate::rest::query::Query;
use crate::rest::{auth, games, storage, Service};

const IMAGE_COLUMNS: &str = "id, game_id, storage_path, caption, is_cover, created_at";
const MAX_CAPTION_CHARS: usize = 200;

/// All images of a game, newest first.
#[instrument(skip(service))]
pub(crate) async fn images_for_game(service: &Service, game_id: &str) -> Result<Vec<GameImage>> {
    let query = Query::select(IMAGE_COLUMNS)
        .eq("game_id", game_id)
        .order("created_at", false, None)
        .order("id", false, None);
    service.select("game_images", &query).await
}

/// Images of a game uploaded inside `range`, oldest first.
pub(crate) async fn images_for_range(
    service: &Service,
    game_id: &str,
    range: &DayRange,
) -> Result<Vec<GameImage>> {
    let query = Query::select(IMAGE_COLUMNS)
        .eq("game_id", game_id)
        .gte("created_at", range.start_param())
        .lt("created_at", range.end_param())
        .order("created_at", true, None);
    service.select("game_images", &query).await
}

#[derive(Debug, Deserialize)]
pub(crate) struct Cover {
    pub(crate) game_id: GameId,
    pub(crate) storage_path: String,
}

/// Cover images of the given games, in one in-list read.
pub(crate) async fn covers_for<'a>(
    service: &Service,
    game_ids: impl IntoIterator<Item = &'a GameId>,
) -> Result<Vec<Cover>> {
    let ids = game_ids.into_iter().collect::<Vec<_>>();
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let query = Query::select("game_id, storage_path")
        .in_list("game_id", ids)
        .eq("is_cover", true)
        .order("id", true, None);
    service.select("game_images", &query).await
}

#[derive(Serialize)]
struct NewImage<'a> {
    game_id: &'a str,
    storage_path: &'a str,
    caption: Option<String>,
    is_cover: bool,
    created_at: Timestamp,
}

/// Store a photo and register it. Setting it as cover happens in one
/// atomic call after the row exists and requires owning the game.
#[instrument(skip(service, bytes), fields(size = bytes.len()))]
pub(crate) async fn upload_image(
    service: &Service,
    game_id: &str,
    file_name: &str,
    bytes: Vec<u8>,
    caption: Option<&str>,
    as_cover: bool,
) -> Result<GameImage> {
    if as_cover {
        games::require_owner(service, game_id).await?;
    } else {
        auth::current_user(service).await?;
    }

    let now = Utc::now();
    let path = storage::object_path(game_id, file_name, now.timestamp_millis());
    storage::upload(service, &path, bytes).await?;

    let row = NewImage {
        game_id,
        storage_path: &path,
        caption: caption.and_then(normalize_caption),
        is_cover: false,
        created_at: Timestamp::new(now.to_rfc3339()),
    };
    let mut image = service
        .insert::<_, GameImage>("game_images", &row)
        .await?
        .into_iter()
        .next()
        .ok_or(LudothekError::NotFound { what: "inserted image" })?;

    if as_cover {
        set_cover(service, game_id, image.id).await?;
        image.is_cover = true;
    }
    debug!(image_id = image.id, path = %path, "uploaded image");
    Ok(image)
}

/// Make `image_id` the only cover of `game_id`.
///
/// Runs as a single statement on the service (`set_game_cover`), so a
/// failure can never leave the game with zero or two covers.
#[instrument(skip(service))]
pub(crate) async fn set_cover(service: &Service, game_id: &str, image_id: ImageId) -> Result<()> {
    games::require_owner(service, game_id).await?;
    service
        .rpc(
            "set_game_cover",
            &json!({ "p_game_id": game_id, "p_image_id": image_id }),
        )
        .await
}

/// Trim and cap a caption; blank captions are cleared.
pub(crate) fn normalize_caption(raw: &str) -> Option<String> {
    let caption: String = raw.trim().chars().take(MAX_CAPTION_CHARS).collect();
    let caption = caption.trim_end().to_string();
    (!caption.is_empty()).then_some(caption)
}

#[instrument(skip(service))]
pub(crate) async fn update_caption(
    service: &Service,
    game_id: &str,
    image_id: ImageId,
    caption: &str,
) -> Result<()> {
    games::require_owner(service, game_id).await?;
    let query = Query::filter().eq("id", image_id).eq("game_id", game_id);
    service
        .execute(
            Method::PATCH,
            "game_images",
            &query,
            Some(&json!({ "caption": normalize_caption(caption) })),
        )
        .await
}

/// Delete the row, then its stored object. A leftover object is only logged.
#[instrument(skip(service))]
pub(crate) async fn delete_image(
    service: &Service,
    game_id: &str,
    image_id: ImageId,
) -> Result<()> {
    games::require_owner(service, game_id).await?;

    let query = Query::select(IMAGE_COLUMNS)
        .eq("id", image_id)
        .eq("game_id", game_id);
    let image: GameImage = service
        .select_one("game_images", query)
        .await?
        .ok_or(LudothekError::NotFound { what: "image" })?;

    service
        .execute::<()>(
            Method::DELETE,
            "game_images",
            &Query::filter().eq("id", image_id),
            None,
        )
        .await?;

    if !image.storage_path.is_empty() {
        if let Err(e) = storage::remove(service, &[image.storage_path.as_str()]).await {
            warn!(image_id, path = %image.storage_path, error = %e, "stored object not removed");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_caption() {
        assert_eq!(normalize_caption("  Finale  "), Some("Finale".to_string()));
        assert_eq!(normalize_caption("   "), None);
        let long = "ä".repeat(250);
        assert_eq!(normalize_caption(&long).map(|c| c.chars().count()), Some(200));
    }

    #[test]
    fn test_new_image_payload() {
        let row = NewImage {
            game_id: "g1",
            storage_path: "g1/1-a.jpg",
            caption: normalize_caption(""),
            is_cover: false,
            created_at: Timestamp::new("2024-03-01T19:00:00+00:00"),
        };
        let body = serde_json::to_value(&row).unwrap();
        assert!(body["caption"].is_null());
        assert_eq!(body["created_at"], "2024-03-01T19:00:00+00:00");
    }
}
