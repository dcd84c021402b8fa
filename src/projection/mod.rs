//! Pure shaping of fetched rows into display-ready sequences.
//!
//! Nothing here performs I/O or keeps state between calls.

pub mod day;
pub mod gallery;
pub mod join;
pub mod news;

pub use day::{day_key, day_range, parse_timestamp, DayKey, DayRange};
pub use gallery::{
    build_gallery, Gallery, GalleryImage, GalleryParams, GallerySection, SortDirection,
};
pub use join::{join_day, within_day, within_range, Timestamped};
pub use news::{group_sessions, sort_results};
