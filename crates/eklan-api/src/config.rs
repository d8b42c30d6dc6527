use serde::Deserialize;

/// Runtime environment, selects the logging shape among other things.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Environment-driven configuration, loaded with `envy` after `dotenvy` has
/// populated the process environment.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub database_url: String,
    pub jwt_secret: String,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    10
}
