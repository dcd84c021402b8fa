pub use client::LudothekClient;
pub use config::Config;
pub use error::{LudothekError, ProjectionError, Result};
pub use model::*;
pub use projection::{DayKey, Gallery, GalleryParams, SortDirection};

mod client;
pub mod config;
mod error;
pub mod model;
pub mod projection;
pub(crate) mod rest;
