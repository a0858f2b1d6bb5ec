//! Public configuration for the browser widget.

use axum::{extract::State, Json};

use crate::response::PublicConfig;
use crate::state::AppState;

/// GET /api/config - Values the widget needs before rendering the form.
pub async fn config_handler(State(state): State<AppState>) -> Json<PublicConfig> {
    let site_key = state
        .recaptcha
        .config()
        .site_key
        .clone()
        .filter(|k| !k.trim().is_empty());

    Json(PublicConfig {
        recaptcha_site_key: site_key,
    })
}
