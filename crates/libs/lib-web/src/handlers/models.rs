//! # Model Listing Handler
//!
//! `GET /api/chats/available-models/{provider}` always answers 200 for a
//! supported provider. When the catalog cannot be fetched the body carries
//! an empty list and an `error` string, so the model picker can show why.

use axum::{
    extract::{Path, State},
    Json,
};
use lib_ai::{ProviderError, ProviderKind, ProviderRegistry};
use lib_core::dto::ModelsResponse;
use lib_core::AppError;
use std::sync::Arc;
use tracing::warn;

/// **Route**: `GET /api/chats/available-models/{provider}`
///
/// Unsupported provider ids are a 400.
pub async fn list_models(
    State(providers): State<Arc<ProviderRegistry>>,
    Path(provider): Path<String>,
) -> Result<Json<ModelsResponse>, AppError> {
    let kind: ProviderKind = provider.parse()?;

    let listed = match providers.get(kind) {
        Ok(client) => client.list_models().await,
        Err(err) => Err(err),
    };

    let response = match listed {
        Ok(models) => ModelsResponse { models, error: None },
        Err(err) => {
            warn!("[MODELS] Listing {} models failed: {}", kind, err);
            ModelsResponse {
                models: Vec::new(),
                error: Some(listing_error(&err)),
            }
        }
    };
    Ok(Json(response))
}

fn listing_error(err: &ProviderError) -> String {
    match err {
        ProviderError::Unconfigured { provider } => format!("{} API key not configured", provider),
        ProviderError::AuthenticationFailed { status, .. } => format!("Failed to fetch models: {}", status),
        ProviderError::RateLimited { .. } => "Failed to fetch models: 429".to_string(),
        ProviderError::RemoteError { status: Some(status), .. } => format!("Failed to fetch models: {}", status),
        other => format!("Error fetching models: {}", other.user_message()),
    }
}
