use std::sync::Arc;

use tracing::instrument;

use crate::config::Config;
use crate::error::Result;
use crate::model::*;
use crate::projection::{build_gallery, Gallery, GalleryParams};
use crate::rest::{self, Service};

/// The main entry point for a hosted board-game collection.
///
/// `LudothekClient` wraps a [`reqwest::Client`] and exposes methods to read
/// the catalog, game pages and the news feed, and to record plays, comments
/// and photos.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> ludothek::Result<()> {
/// use ludothek::{CatalogParams, Config, LudothekClient};
///
/// let client = LudothekClient::new(Config::from_env()?);
/// let page = client.list_games(&CatalogParams::default()).await?;
/// println!("{} of {} games", page.entries.len(), page.total);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LudothekClient {
    service: Service,
}

impl LudothekClient {
    /// Create a new anonymous client with default HTTP settings.
    pub fn new(config: Config) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create a new client using the provided [`reqwest::Client`].
    ///
    /// Use this when you need to configure timeouts, proxies, headers, etc.
    pub fn with_client(client: reqwest::Client, config: Config) -> Self {
        Self {
            service: Service {
                http: client,
                config: Arc::new(config),
                access_token: None,
            },
        }
    }

    /// Act on behalf of the user owning `access_token`.
    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.service.access_token = Some(Arc::from(access_token.into()));
        self
    }

    pub fn config(&self) -> &Config {
        &self.service.config
    }

    /// Public URL of a stored image.
    pub fn public_image_url(&self, storage_path: &str) -> String {
        let config = &self.service.config;
        rest::storage::public_url(&config.url, &config.bucket, storage_path)
    }

    /// Resolve the access token into the signed-in user.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<User> {
        rest::auth::current_user(&self.service).await
    }

    /// Fetch one page of the catalog, filtered and sorted.
    #[instrument(skip(self))]
    pub async fn list_games(&self, params: &CatalogParams) -> Result<CatalogPage> {
        rest::games::list_games(&self.service, params).await
    }

    /// Fetch a single game.
    #[instrument(skip(self))]
    pub async fn get_game(&self, game_id: &str) -> Result<Game> {
        rest::games::get_game(&self.service, game_id).await
    }

    /// Fetch everything shown on a game's page.
    #[instrument(skip(self))]
    pub async fn get_game_detail(
        &self,
        game_id: &str,
        gallery: &GalleryParams,
    ) -> Result<GameDetail> {
        rest::games::get_detail(&self.service, game_id, gallery).await
    }

    /// Fetch a game's gallery only.
    #[instrument(skip(self))]
    pub async fn get_gallery(&self, game_id: &str, params: &GalleryParams) -> Result<Gallery> {
        let images = rest::images::images_for_game(&self.service, game_id).await?;
        Ok(build_gallery(images, params))
    }

    /// Fetch the news feed of recent play sessions.
    #[instrument(skip(self))]
    pub async fn get_news(&self) -> Result<Vec<NewsItem>> {
        rest::news::get_news(&self.service).await
    }

    /// Add a game owned by the signed-in user and return its id.
    #[instrument(skip(self, input))]
    pub async fn create_game(&self, input: GameInput) -> Result<GameId> {
        rest::games::create_game(&self.service, input).await
    }

    /// Replace a game's metadata. Only its creator may do this.
    #[instrument(skip(self, input))]
    pub async fn update_game(&self, game_id: &str, input: GameInput) -> Result<()> {
        rest::games::update_game(&self.service, game_id, input).await
    }

    /// Delete a game. Only its creator may do this.
    #[instrument(skip(self))]
    pub async fn delete_game(&self, game_id: &str) -> Result<()> {
        rest::games::delete_game(&self.service, game_id).await
    }

    /// Record a play session with its results.
    #[instrument(skip(self, input))]
    pub async fn add_play(&self, game_id: &str, input: PlayInput) -> Result<PlayId> {
        rest::plays::add_play(&self.service, game_id, input).await
    }

    #[instrument(skip(self, body))]
    pub async fn add_comment(&self, game_id: &str, body: &str) -> Result<()> {
        rest::comments::add_comment(&self.service, game_id, body).await
    }

    /// Comment on the news item of `game_id` on `news_date` (`YYYY-MM-DD`).
    #[instrument(skip(self, body))]
    pub async fn add_news_comment(
        &self,
        game_id: &str,
        news_date: &str,
        body: &str,
    ) -> Result<()> {
        rest::comments::add_news_comment(&self.service, game_id, news_date, body).await
    }

    /// Upload a photo of a game, optionally making it the cover.
    #[instrument(skip(self, bytes))]
    pub async fn upload_image(
        &self,
        game_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
        caption: Option<&str>,
        as_cover: bool,
    ) -> Result<GameImage> {
        rest::images::upload_image(&self.service, game_id, file_name, bytes, caption, as_cover)
            .await
    }

    /// Make an image the game's only cover, atomically.
    #[instrument(skip(self))]
    pub async fn set_cover(&self, game_id: &str, image_id: ImageId) -> Result<()> {
        rest::images::set_cover(&self.service, game_id, image_id).await
    }

    #[instrument(skip(self))]
    pub async fn update_caption(
        &self,
        game_id: &str,
        image_id: ImageId,
        caption: &str,
    ) -> Result<()> {
        rest::images::update_caption(&self.service, game_id, image_id, caption).await
    }

    /// Delete an image and its stored file.
    #[instrument(skip(self))]
    pub async fn delete_image(&self, game_id: &str, image_id: ImageId) -> Result<()> {
        rest::images::delete_image(&self.service, game_id, image_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LudothekError;
    use crate::projection::DayKey;

    fn client() -> LudothekClient {
        LudothekClient::new(Config::new("http://127.0.0.1:9", "anon"))
    }

    #[test]
    fn test_public_image_url() {
        assert_eq!(
            client().public_image_url("g1/1-box.jpg"),
            "http://127.0.0.1:9/storage/v1/object/public/game-images/g1/1-box.jpg"
        );
    }

    #[tokio::test]
    async fn test_writes_require_sign_in() {
        let client = client();

        let result = client.add_comment("g1", "Schöne Partie").await;
        assert!(matches!(result, Err(LudothekError::NotSignedIn)));

        let input = PlayInput {
            played_at: DayKey::parse("2024-03-01").unwrap(),
            location: None,
            notes: None,
            results: Vec::new(),
        };
        let result = client.add_play("g1", input).await;
        assert!(matches!(result, Err(LudothekError::NotSignedIn)));

        let result = client.set_cover("g1", 4).await;
        assert!(matches!(result, Err(LudothekError::NotSignedIn)));
    }

    #[tokio::test]
    async fn test_input_is_validated_before_any_request() {
        let client = client();

        let result = client.add_comment("g1", "   ").await;
        assert!(matches!(result, Err(LudothekError::Validation(_))));

        let result = client.add_news_comment("g1", "gestern", "Revanche!").await;
        assert!(matches!(result, Err(LudothekError::Projection(_))));

        let result = client.create_game(GameInput::default()).await;
        assert!(matches!(result, Err(LudothekError::Validation(_))));
    }
}
