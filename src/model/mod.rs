mod catalog;
mod comment;
mod common;
mod game;
mod image;
mod news;
mod play;
mod user;

pub use catalog::*;
pub use comment::*;
pub use common::{GameId, ImageId, PlayId, Timestamp};
pub use game::*;
pub use image::*;
pub use news::*;
pub use play::*;
pub use user::*;
