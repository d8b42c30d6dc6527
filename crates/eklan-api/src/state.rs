use axum::extract::FromRef;
use sqlx::PgPool;

use crate::config::{ApiConfig, Environment};

/// What the `AuthUser` extractor needs to verify bearer tokens.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ApiState {
    pub pool: PgPool,
    pub auth: AuthConfig,
    pub environment: Environment,
}

impl ApiState {
    pub fn new(config: &ApiConfig, pool: PgPool) -> Self {
        Self {
            pool,
            auth: AuthConfig {
                jwt_secret: config.jwt_secret.clone(),
            },
            environment: config.environment,
        }
    }
}

impl FromRef<ApiState> for AuthConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.auth.clone()
    }
}
