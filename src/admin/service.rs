//! Request-handling services attached to the admin listener.
//!
//! The lifecycle manager knows nothing about what the admin API does; it
//! asks an [`AdminService`] for a router at start time and serves that.

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::admin::auth::admin_auth_middleware;
use crate::admin::handlers::get_status;
use crate::config::AdminConfig;

/// Builds the router served on the admin listener.
pub trait AdminService: Send + Sync + 'static {
    fn router(&self) -> Router;
}

impl AdminService for Router {
    fn router(&self) -> Router {
        self.clone()
    }
}

/// Built-in service exposing `GET /admin/status`.
#[derive(Debug, Clone, Default)]
pub struct StatusService {
    api_key: Option<Arc<str>>,
}

impl StatusService {
    pub fn new(api_key: Option<&str>) -> Self {
        Self {
            api_key: api_key.map(Arc::from),
        }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(config.api_key.as_deref())
    }
}

impl AdminService for StatusService {
    fn router(&self) -> Router {
        let router = Router::new().route("/admin/status", get(get_status));

        let router = match &self.api_key {
            Some(key) => router.layer(middleware::from_fn_with_state(
                Arc::clone(key),
                admin_auth_middleware,
            )),
            None => router,
        };

        router.layer(TraceLayer::new_for_http())
    }
}
