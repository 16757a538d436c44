use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::Deserialize;
use std::env;

/// Settings shared by every service binary.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_port() -> u16 {
    5000
}

fn default_environment() -> String {
    "dev".to_string()
}

impl Config {
    /// Load from `configuration.*`, then `APP__*` variables.
    ///
    /// A bare `PORT` or `ENVIRONMENT` variable is honoured as the lowest
    /// precedence source so the service runs under common PaaS conventions.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let mut builder = Cfg::builder();
        if let Ok(port) = env::var("PORT") {
            builder = builder.set_default("port", port)?;
        }
        if let Ok(environment) = env::var("ENVIRONMENT") {
            builder = builder.set_default("environment", environment)?;
        }

        let config = builder
            .add_source(File::with_name("configuration").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "prod" | "production")
    }
}
