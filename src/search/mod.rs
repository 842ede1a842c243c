//! Search orchestration module
//!
//! Splits a prompt into keywords, searches each one, samples candidates
//! round-robin, and resolves the sampled items to image files.

mod executor;
mod keywords;
mod resolver;
mod sampler;

pub use executor::{Llomax, MAX_WORKERS, OVERFETCH_FACTOR};
pub use keywords::extract_keywords;
pub use resolver::{
    download_url, images_from_item, is_image_format, ItemImageResolver, ItemImages, IMAGE_FORMATS,
};
pub use sampler::{round_robin_sample, round_robin_unique};
