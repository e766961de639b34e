pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;

use std::sync::Arc;

use anyhow::Result;

use crate::config::{AppConfig, StoreBackend};
use crate::infra::db::Db;
use crate::infra::store::{MemoryStore, PgStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub admin_token: Option<String>,
}

impl AppState {
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let store: Store = match config.store_backend {
            StoreBackend::Postgres => Arc::new(PgStore::new(Db::connect(config).await?)),
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
        };

        Ok(Self {
            store,
            admin_token: config.admin_token.clone(),
        })
    }
}
