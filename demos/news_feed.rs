use ludothek::{CatalogParams, Config, LudothekClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().unwrap();
    let client = LudothekClient::new(config);

    let page = client.list_games(&CatalogParams::default()).await.unwrap();
    println!("Page {}/{} ({} games)", page.page, page.last_page, page.total);
    for entry in &page.entries {
        println!(
            "  {} (BGG {})",
            entry.game.title,
            entry
                .game
                .bgg_rating
                .map(|r| format!("{r:.1}"))
                .unwrap_or_else(|| "-".to_string())
        );
    }

    let news = client.get_news().await.unwrap();
    println!("Found {} news items", news.len());
    for item in news {
        println!("{} {}", item.day, item.title);
        for session in &item.sessions {
            for result in &session.play_results {
                let position = result
                    .position
                    .map(|p| p.to_string())
                    .unwrap_or_default();
                let score = result
                    .score
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("  {position}. {} - {score}", result.player_name);
            }
        }
        for image in &item.images {
            println!("  photo {}", client.public_image_url(&image.storage_path));
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&item.comments).unwrap()
        );
    }
}
