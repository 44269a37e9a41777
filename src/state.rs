use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::TokenVerifier;
use crate::config::AppConfig;
use crate::idp::CognitoIdp;

/// Process-wide resources, constructed once at startup and passed into
/// every handler by handle.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: PgPool,
    pub idp: CognitoIdp,
    pub verifier: Arc<TokenVerifier>,
}
