use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, warn};

use crate::model::GameImage;
use crate::projection::day::DayKey;

/// Ordering of gallery images by upload time.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortDirection {
    Asc,
    /// Newest first.
    #[default]
    Desc,
}

impl SortDirection {
    /// Parse an `"asc"` / `"desc"` request parameter; anything else is `Desc`.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        raw.and_then(|r| Self::from_str(r.trim()).ok())
            .unwrap_or_default()
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// Day filter and direction requested for a gallery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryParams {
    pub day: Option<String>,
    pub direction: SortDirection,
}

impl GalleryParams {
    /// Build from raw `img_sort` and `img_date` request parameters.
    pub fn from_query(img_sort: Option<&str>, img_date: Option<&str>) -> Self {
        Self {
            day: img_date
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            direction: SortDirection::parse_lenient(img_sort),
        }
    }
}

/// An image with its parsed upload time.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryImage {
    pub image: GameImage,
    pub created_at: DateTime<Utc>,
}

impl GalleryImage {
    pub fn day(&self) -> DayKey {
        DayKey::of(&self.created_at)
    }
}

/// Consecutive images sharing an upload day.
#[derive(Debug, Clone, Serialize)]
pub struct GallerySection<'a> {
    pub day: DayKey,
    pub images: Vec<&'a GalleryImage>,
}

/// A game's images, filtered and ordered for display.
#[derive(Debug, Clone, Serialize)]
pub struct Gallery {
    pub images: Vec<GalleryImage>,
    /// Distinct upload days across all images, in `direction` order.
    pub available_days: Vec<DayKey>,
    /// The day filter actually applied.
    pub day: Option<DayKey>,
    pub direction: SortDirection,
    pub cover: Option<GameImage>,
}

impl Gallery {
    /// Split the ordered images into runs of the same day.
    pub fn sections(&self) -> Vec<GallerySection<'_>> {
        let chunks = self.images.iter().chunk_by(|image| image.day());
        let sections = chunks
            .into_iter()
            .map(|(day, images)| GallerySection {
                day,
                images: images.collect(),
            })
            .collect();
        sections
    }
}

/// Filter and order one game's images.
///
/// Images with unparseable timestamps are dropped. An invalid `day` is
/// treated as no filter.
pub fn build_gallery(images: Vec<GameImage>, params: &GalleryParams) -> Gallery {
    let direction = params.direction;
    let mut parsed = images
        .into_iter()
        .filter_map(|image| match image.created_at.parse() {
            Ok(created_at) => Some(GalleryImage { image, created_at }),
            Err(e) => {
                warn!(image_id = image.id, error = %e, "excluding image from gallery");
                None
            }
        })
        .collect_vec();
    parsed.sort_by(|a, b| direction.apply(compare_images(a, b)));

    let available_days = parsed
        .iter()
        .map(GalleryImage::day)
        .sorted_by(|a, b| direction.apply(a.cmp(b)))
        .dedup()
        .collect_vec();

    // Legacy rows may flag several covers; the oldest flagged id wins.
    let cover = parsed
        .iter()
        .filter(|i| i.image.is_cover)
        .min_by_key(|i| i.image.id)
        .map(|i| i.image.clone());

    let filter = params.day.as_deref().and_then(|raw| {
        match DayKey::parse(raw).and_then(|day| day.range().map(|range| (day, range))) {
            Ok(filter) => Some(filter),
            Err(e) => {
                warn!(error = %e, "ignoring gallery day filter");
                None
            }
        }
    });
    if let Some((_, range)) = &filter {
        parsed.retain(|image| range.contains(&image.created_at));
    }
    let day = filter.map(|(day, _)| day);

    debug!(
        count = parsed.len(),
        days = available_days.len(),
        %direction,
        "built gallery"
    );

    Gallery {
        images: parsed,
        available_days,
        day,
        direction,
        cover,
    }
}

fn compare_images(a: &GalleryImage, b: &GalleryImage) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.image.id.cmp(&b.image.id))
}
