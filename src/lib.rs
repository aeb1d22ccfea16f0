pub mod batch;
pub mod cache;
pub mod config;
pub mod downloader;
pub mod error;
pub mod generator;
pub mod image_processing;
pub mod models;
pub mod openai;
pub mod retry;
pub mod templates;

#[cfg(test)]
mod test_support;

pub use error::{LogoError, Result};
