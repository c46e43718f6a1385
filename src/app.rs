//! Application object shared by the HTTP layer.
//!
//! An [`App`] is assembled mutably during initialization (hooks, auth
//! loader) and then frozen behind an `Arc` when the API is built. Nothing
//! on the request path mutates it.

use std::fmt;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::hooks::{ApiErrorEvent, Hook};
use crate::security::auth::{AuthLoader, NoAuth};

pub struct App {
    config: AppConfig,
    auth_loader: Arc<dyn AuthLoader>,
    on_before_api_error: Hook<ApiErrorEvent>,
    on_after_api_error: Hook<ApiErrorEvent>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            auth_loader: Arc::new(NoAuth),
            on_before_api_error: Hook::new(),
            on_after_api_error: Hook::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Diagnostic mode: error internals are written to the log.
    pub fn is_debug(&self) -> bool {
        self.config.debug
    }

    pub fn auth_loader(&self) -> &dyn AuthLoader {
        self.auth_loader.as_ref()
    }

    pub fn set_auth_loader(&mut self, loader: impl AuthLoader + 'static) {
        self.auth_loader = Arc::new(loader);
    }

    /// Handlers run before the error response is written.
    ///
    /// They may inspect or replace `event.error`, or commit their own
    /// response on `event.ctx`, in which case the default write is skipped.
    pub fn on_before_api_error(&self) -> &Hook<ApiErrorEvent> {
        &self.on_before_api_error
    }

    pub fn on_before_api_error_mut(&mut self) -> &mut Hook<ApiErrorEvent> {
        &mut self.on_before_api_error
    }

    /// Handlers run after the error response was written successfully.
    pub fn on_after_api_error(&self) -> &Hook<ApiErrorEvent> {
        &self.on_after_api_error
    }

    pub fn on_after_api_error_mut(&mut self) -> &mut Hook<ApiErrorEvent> {
        &mut self.on_after_api_error
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("debug", &self.config.debug)
            .field("on_before_api_error", &self.on_before_api_error)
            .field("on_after_api_error", &self.on_after_api_error)
            .finish_non_exhaustive()
    }
}
