//! `CurrentContext` extractor: resolves the acting user and tree for a request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use filetree_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// The request context available in handlers.
///
/// Identity comes from server configuration, never from the client.
#[derive(Debug, Clone)]
pub struct CurrentContext(pub RequestContext);

impl CurrentContext {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for CurrentContext {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for CurrentContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(CurrentContext(RequestContext::from_config(
            &state.config.context,
            state.config.storage.readonly,
        )))
    }
}
