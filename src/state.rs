use std::sync::Arc;

use anyhow::Context;

use crate::config::AppConfig;
use crate::store::{MongoUserStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = Arc::new(
            MongoUserStore::new(&config.mongo)
                .await
                .context("connect to mongodb")?,
        ) as Arc<dyn UserStore>;
        Ok(Self { store, config })
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{JwtConfig, MongoConfig};
        use crate::store::memory::MemoryUserStore;

        let config = Arc::new(AppConfig {
            mongo: MongoConfig {
                uri: "mongodb://localhost:27017".into(),
                database: "test".into(),
                collection: "users".into(),
            },
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: Some("test-issuer".into()),
                audience: Some("test-aud".into()),
                ttl_minutes: 5,
            },
        });
        Self {
            store: Arc::new(MemoryUserStore::default()),
            config,
        }
    }
}
