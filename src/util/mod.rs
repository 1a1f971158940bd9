pub mod image_url;
pub mod text;

pub use image_url::normalize_image_url;
pub use text::normalize_search_text;
