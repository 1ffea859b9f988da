//! Core business entities shared across sources, services, and the API.

mod business;
mod category;
mod review;
mod source_id;

pub use business::{Business, BusinessDetails, Coordinates};
pub use category::Category;
pub use review::Review;
pub use source_id::SourceId;
