//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::document::{CompileOptions, Compiler};
use crate::library::DocumentStore;
use crate::service::ContentService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    service: ContentService,
}

impl AppState {
    /// Build the state from configuration
    pub fn new(config: Config) -> Self {
        let store = DocumentStore::new(config.content.dir.clone(), config.content.extensions.clone());
        let compiler = Compiler::new(CompileOptions {
            tab_size: config.content.tab_size,
        });

        Self {
            inner: Arc::new(AppStateInner {
                service: ContentService::new(store, compiler),
                config,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the content service
    pub fn service(&self) -> &ContentService {
        &self.inner.service
    }
}
