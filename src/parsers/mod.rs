pub mod fields;
pub mod html;


pub use fields::{MISSING_RATING, PLACEHOLDER, normalize_field, normalize_rating};
