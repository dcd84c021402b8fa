use itertools::Itertools;
use reqwest::{Method, Url};
use serde_json::json;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::rest::{self, Service};

const CACHE_CONTROL: &str = "max-age=3600";

/// Public URL of an object in `bucket`.
pub(crate) fn public_url(base: &str, bucket: &str, path: &str) -> String {
    object_url(base, &["storage", "v1", "object", "public", bucket], path)
}

/// Object path for a new upload: `{game_id}/{millis}-{file_name}` with
/// whitespace runs and slashes in the file name replaced by `_`.
pub(crate) fn object_path(game_id: &str, file_name: &str, unix_millis: i64) -> String {
    let clean = file_name
        .split_whitespace()
        .join("_")
        .replace(['/', '\\'], "_");
    let clean = if clean.is_empty() { "upload".to_string() } else { clean };
    format!("{game_id}/{unix_millis}-{clean}")
}

/// Upload a new object; fails if the path is already taken.
#[instrument(skip(service, bytes), fields(size = bytes.len()))]
pub(crate) async fn upload(service: &Service, path: &str, bytes: Vec<u8>) -> Result<()> {
    let bucket = service.config.bucket.as_str();
    let url = object_url(&service.config.url, &["storage", "v1", "object", bucket], path);
    let request = service
        .request(Method::POST, &url)
        .header("cache-control", CACHE_CONTROL)
        .header("x-upsert", "false")
        .header(reqwest::header::CONTENT_TYPE, content_type(path))
        .body(bytes);
    rest::send(&url, request).await?;
    debug!(path, "uploaded object");
    Ok(())
}

/// Remove objects from the image bucket.
#[instrument(skip(service))]
pub(crate) async fn remove(service: &Service, paths: &[&str]) -> Result<()> {
    let url = format!("{}/storage/v1/object/{}", service.config.url, service.config.bucket);
    let request = service
        .request(Method::DELETE, &url)
        .json(&json!({ "prefixes": paths }));
    rest::send(&url, request).await?;
    Ok(())
}

fn object_url(base: &str, prefix: &[&str], path: &str) -> String {
    let segments = prefix
        .iter()
        .copied()
        .chain(path.split('/').filter(|s| !s.is_empty()))
        .collect_vec();
    match Url::parse(base) {
        Ok(mut url) => {
            if let Ok(mut parts) = url.path_segments_mut() {
                parts.pop_if_empty().extend(&segments);
            }
            url.to_string()
        }
        Err(_) => format!("{}/{}", base.trim_end_matches('/'), segments.join("/")),
    }
}

fn content_type(path: &str) -> &'static str {
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}
