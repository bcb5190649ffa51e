//! Application state module
//!
//! Defines shared state accessible across all request handlers.

use std::sync::Arc;

use wallpaper_core::{ImageStore, DEFAULT_IMAGE_BASE_URL};

use crate::config::{Config, DEFAULT_REDIRECT_CACHE_CONTROL};

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    /// Image set the handlers read from
    pub store: Arc<dyn ImageStore>,
    /// Origin prefixed to relative image records
    pub image_base_url: Arc<str>,
    /// `Cache-Control` sent with image redirects
    pub redirect_cache_control: Arc<str>,
}

impl AppState {
    /// State with default URL and caching settings.
    pub fn new(store: Arc<dyn ImageStore>) -> Self {
        Self {
            store,
            image_base_url: Arc::from(DEFAULT_IMAGE_BASE_URL),
            redirect_cache_control: Arc::from(DEFAULT_REDIRECT_CACHE_CONTROL),
        }
    }

    /// State using the URL and caching settings of `config`.
    pub fn with_config(store: Arc<dyn ImageStore>, config: &Config) -> Self {
        Self {
            store,
            image_base_url: Arc::from(config.image_base_url.as_str()),
            redirect_cache_control: Arc::from(config.redirect_cache_control.as_str()),
        }
    }
}
