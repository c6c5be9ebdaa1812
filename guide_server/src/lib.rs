pub mod api;
pub mod config;
pub mod errors;
pub mod guide;
pub mod prompts;
pub mod store;

#[cfg(test)]
pub(crate) mod test_utils;

pub use api::AppState;
pub use guide::{VideoGuide, VideoReport};
