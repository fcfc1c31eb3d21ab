pub mod db;
pub mod memory_store;
pub mod pg_store;
pub mod store;

use std::sync::Arc;

use anyhow::Result;

use crate::config::{AppConfig, StoreBackend};
use self::db::Db;
use self::memory_store::MemoryCommentStore;
use self::pg_store::PgCommentStore;
use self::store::CommentStore;

pub async fn connect_store(config: &AppConfig) -> Result<Arc<dyn CommentStore>> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory comment store; data is lost on restart");
            Ok(Arc::new(MemoryCommentStore::new()))
        }
        StoreBackend::Postgres => {
            let db = Db::connect(config).await?;
            db.migrate().await?;
            Ok(Arc::new(PgCommentStore::new(db)))
        }
    }
}
