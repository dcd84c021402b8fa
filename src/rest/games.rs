use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{LudothekError, Result};
use crate::model::{
    last_page, CatalogEntry, CatalogPage, CatalogParams, CatalogSort, Game, GameDetail, GameId,
    GameInput, PlayerFilter, User,
};
use crate::projection::{build_gallery, GalleryParams};
use crate::rest::query::{Nulls, Query};
use crate::rest::{auth, comments, images, plays, storage, Service};

pub(crate) const PLACEHOLDER_COVER: &str = "/placeholder-game.jpg";

const CATALOG_COLUMNS: &str = "id, title, bgg_rating, status, loaned_to, created_at";
const DETAIL_COLUMNS: &str = "id, created_by, title, alt_title, min_players, max_players, \
     play_minutes, owner, bgg_url, bgg_rating, award, manual_url, more_info, notes, weight, \
     is_coop, status, loaned_to, created_at";

/// Build the catalog read for one page.
pub(crate) fn catalog_query(params: &CatalogParams, page_size: usize) -> Query {
    let mut query = Query::select(CATALOG_COLUMNS);

    if let Some(search) = &params.search {
        query = query.ilike_contains("title", search);
    }
    query = match params.players {
        Some(PlayerFilter::UpTo(n)) => query.lte("max_players", n),
        Some(PlayerFilter::SixPlus) => query.gte("max_players", 6),
        None => query,
    };
    query = match params.sort {
        CatalogSort::TitleAsc => query.order("title", true, None),
        CatalogSort::TitleDesc => query.order("title", false, None),
        CatalogSort::RatingDesc => query.order("bgg_rating", false, Some(Nulls::Last)),
        CatalogSort::RatingAsc => query.order("bgg_rating", true, Some(Nulls::First)),
        CatalogSort::CreatedDesc => query.order("created_at", false, None),
        CatalogSort::CreatedAsc => query.order("created_at", true, None),
    };

    let page_size = page_size.max(1);
    let from = (params.page.max(1) - 1).saturating_mul(page_size);
    query.range(from, from.saturating_add(page_size - 1))
}

/// One page of the catalog with each game's cover URL.
#[instrument(skip(service))]
pub(crate) async fn list_games(service: &Service, params: &CatalogParams) -> Result<CatalogPage> {
    let page_size = service.config.page_size;
    let query = catalog_query(params, page_size);
    let (games, total): (Vec<Game>, _) = service.select_counted("games", &query).await?;
    let total = total.unwrap_or(games.len());

    let covers = images::covers_for(service, games.iter().map(|g| &g.id)).await?;
    let config = &service.config;
    let entries = games
        .into_iter()
        .map(|game| {
            let cover_url = covers
                .iter()
                .find(|c| c.game_id == game.id)
                .map(|c| storage::public_url(&config.url, &config.bucket, &c.storage_path))
                .unwrap_or_else(|| PLACEHOLDER_COVER.to_string());
            CatalogEntry { game, cover_url }
        })
        .collect::<Vec<_>>();

    debug!(count = entries.len(), total, page = params.page, "listed games");

    Ok(CatalogPage {
        entries,
        page: params.page.max(1),
        last_page: last_page(total, page_size),
        total,
    })
}

#[instrument(skip(service))]
pub(crate) async fn get_game(service: &Service, game_id: &str) -> Result<Game> {
    service
        .select_one("games", Query::select(DETAIL_COLUMNS).eq("id", game_id))
        .await?
        .ok_or(LudothekError::NotFound { what: "game" })
}

/// A game with its gallery, sessions and comments, read concurrently.
#[instrument(skip(service))]
pub(crate) async fn get_detail(
    service: &Service,
    game_id: &str,
    gallery: &GalleryParams,
) -> Result<GameDetail> {
    let (game, images, plays, comments) = tokio::try_join!(
        get_game(service, game_id),
        images::images_for_game(service, game_id),
        plays::sessions_for_game(service, game_id),
        comments::comments_for_game(service, game_id),
    )?;

    let gallery = build_gallery(images, gallery);
    let config = &service.config;
    let cover_url = gallery
        .cover
        .as_ref()
        .map(|c| storage::public_url(&config.url, &config.bucket, &c.storage_path))
        .unwrap_or_else(|| PLACEHOLDER_COVER.to_string());

    Ok(GameDetail {
        game,
        cover_url,
        gallery,
        plays,
        comments,
    })
}

/// The signed-in caller, provided they created `game_id`.
pub(crate) async fn require_owner(service: &Service, game_id: &str) -> Result<User> {
    #[derive(Deserialize)]
    struct Owner {
        created_by: Option<String>,
    }

    let user = auth::current_user(service).await?;
    let owner: Owner = service
        .select_one("games", Query::select("created_by").eq("id", game_id))
        .await?
        .ok_or(LudothekError::NotFound { what: "game" })?;
    if owner.created_by.as_deref() != Some(user.id.as_str()) {
        return Err(LudothekError::NotAuthorized);
    }
    Ok(user)
}

#[derive(Serialize)]
struct NewGame<'a> {
    #[serde(flatten)]
    input: &'a GameInput,
    created_by: &'a str,
}

#[derive(Deserialize)]
struct Inserted {
    id: GameId,
}

#[instrument(skip(service, input), fields(title = %input.title))]
pub(crate) async fn create_game(service: &Service, input: GameInput) -> Result<GameId> {
    let input = input.normalized()?;
    let user = auth::current_user(service).await?;
    let body = NewGame {
        input: &input,
        created_by: &user.id,
    };
    let rows: Vec<Inserted> = service.insert("games", &body).await?;
    let id = rows
        .into_iter()
        .next()
        .map(|row| row.id)
        .ok_or(LudothekError::NotFound { what: "inserted game" })?;
    debug!(game_id = %id, "created game");
    Ok(id)
}

#[instrument(skip(service, input))]
pub(crate) async fn update_game(service: &Service, game_id: &str, input: GameInput) -> Result<()> {
    let input = input.normalized()?;
    require_owner(service, game_id).await?;
    service
        .execute(Method::PATCH, "games", &Query::filter().eq("id", game_id), Some(&input))
        .await
}

#[instrument(skip(service))]
pub(crate) async fn delete_game(service: &Service, game_id: &str) -> Result<()> {
    require_owner(service, game_id).await?;
    service
        .execute::<()>(Method::DELETE, "games", &Query::filter().eq("id", game_id), None)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(query: &Query) -> Vec<String> {
        query
            .pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect()
    }

    #[test]
    fn test_default_catalog_query() {
        let query = catalog_query(&CatalogParams::default(), 12);
        assert_eq!(
            rendered(&query),
            vec![
                "select=id,title,bgg_rating,status,loaned_to,created_at",
                "order=title.asc",
                "limit=12",
                "offset=0",
            ]
        );
    }

    #[test]
    fn test_filtered_catalog_query() {
        let params =
            CatalogParams::from_query(Some("Azul"), Some("4"), Some("rating_desc"), Some("3"));
        let query = catalog_query(&params, 12);
        assert_eq!(
            rendered(&query)[1..],
            [
                "title=ilike.*Azul*",
                "max_players=lte.4",
                "order=bgg_rating.desc.nullslast",
                "limit=12",
                "offset=24",
            ]
        );

        let params = CatalogParams::from_query(None, Some("6plus"), Some("rating_asc"), None);
        let query = catalog_query(&params, 12);
        assert_eq!(
            rendered(&query)[1..3],
            ["max_players=gte.6", "order=bgg_rating.asc.nullsfirst"]
        );
    }

    #[test]
    fn test_huge_page_saturates_instead_of_overflowing() {
        let params = CatalogParams::from_query(None, None, None, Some("18446744073709551615"));
        let query = catalog_query(&params, 12);
        let rendered = rendered(&query);
        assert!(rendered.contains(&format!("offset={}", usize::MAX)));
        assert!(rendered.contains(&"limit=1".to_string()));
    }

    #[test]
    fn test_new_game_payload_carries_creator() {
        let input = GameInput {
            title: "Azul".into(),
            min_players: Some(2),
            max_players: Some(4),
            ..Default::default()
        };
        let body = serde_json::to_value(NewGame {
            input: &input,
            created_by: "user-1",
        })
        .unwrap();
        assert_eq!(body["title"], "Azul");
        assert_eq!(body["created_by"], "user-1");
        assert_eq!(body["status"], "active");
        assert_eq!(body["is_coop"], false);
        assert!(body["owner"].is_null());
    }
}
