use anyhow::{bail, Context};
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::database::connect_stores;
use crate::ingest::{self, IngestionError};

/// Load a CSV file through the same pipeline as `POST /api/upload-csv`.
pub async fn handle(config: AppConfig, path: PathBuf) -> anyhow::Result<()> {
    if config.database.url.is_none() {
        bail!("DATABASE_URL must be set to import");
    }

    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let stores = connect_stores(&config).await.context("failed to connect stores")?;

    let result = ingest::ingest_csv(stores.trades.as_ref(), &bytes).await;
    if let Some(manager) = &stores.manager {
        manager.close().await;
    }

    match result {
        Ok(inserted) => {
            println!("Imported {} records from {}", inserted, path.display());
            Ok(())
        }
        Err(IngestionError::ParseFailure { details }) => {
            for detail in &details {
                eprintln!("  {}", detail);
            }
            bail!("{} is not a valid CSV file; nothing imported", path.display())
        }
        Err(e) => Err(e.into()),
    }
}
