use csv::ReaderBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{ItemId, LikeRecord, User},
    services::loader::parse_likes,
};

use super::LikesStore;

/// Likes store over CSV snapshots
///
/// `users.csv` starts with a header row, which is skipped. Its columns are
/// read by position as user id, name and likes, where `likes` is a serialized
/// id list; header names do not matter. The optional quotes file supplies the
/// catalog from its `id` (or `index`) column. Files are re-read on every [`fetch_like_records`] so a
/// rebuild sees the latest snapshot.
///
/// [`fetch_like_records`]: LikesStore::fetch_like_records
pub struct CsvLikesStore {
    users_path: Option<PathBuf>,
    quotes_path: Option<PathBuf>,
    snapshot: RwLock<Snapshot>,
}

#[derive(Debug, Clone, Default)]
struct Snapshot {
    records: Vec<LikeRecord>,
    catalog: Option<HashSet<ItemId>>,
}

impl CsvLikesStore {
    /// Opens the snapshot files and reads them once
    pub async fn open(users_path: impl Into<PathBuf>, quotes_path: Option<PathBuf>) -> AppResult<Self> {
        let store = Self {
            users_path: Some(users_path.into()),
            quotes_path,
            snapshot: RwLock::new(Snapshot::default()),
        };
        store.reload().await?;
        Ok(store)
    }

    /// Fixed in-memory data, mainly for tests
    pub fn from_records(records: Vec<LikeRecord>, catalog: Option<HashSet<ItemId>>) -> Self {
        Self {
            users_path: None,
            quotes_path: None,
            snapshot: RwLock::new(Snapshot { records, catalog }),
        }
    }

    async fn reload(&self) -> AppResult<()> {
        let Some(users_path) = self.users_path.clone() else {
            return Ok(());
        };
        let quotes_path = self.quotes_path.clone();

        let snapshot = tokio::task::spawn_blocking(move || -> AppResult<Snapshot> {
            let records = read_users(&users_path)?;
            let catalog = quotes_path.as_deref().map(read_catalog).transpose()?;
            Ok(Snapshot { records, catalog })
        })
        .await
        .map_err(|e| AppError::Internal(format!("CSV reader task failed: {}", e)))??;

        tracing::debug!(
            users = snapshot.records.len(),
            catalog = snapshot.catalog.as_ref().map(|c| c.len()),
            "CSV snapshot loaded"
        );

        *self.snapshot.write().await = snapshot;
        Ok(())
    }
}

fn read_users(path: &Path) -> AppResult<Vec<LikeRecord>> {
    let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let records = reader
        .deserialize::<(i64, String, String)>()
        .map(|row| {
            row.map(|(user_id, name, likes)| LikeRecord {
                user_id,
                name,
                likes,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

fn read_catalog(path: &Path) -> AppResult<HashSet<ItemId>> {
    let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let headers = reader.headers()?.clone();
    let id_col = headers
        .iter()
        .position(|h| h == "id" || h == "index")
        .ok_or_else(|| {
            AppError::InvalidInput(format!("{} has no id or index column", path.display()))
        })?;

    let mut catalog = HashSet::new();
    for row in reader.records() {
        let row = row?;
        let raw = row.get(id_col).unwrap_or_default();
        let id = raw.parse::<ItemId>().map_err(|e| {
            AppError::InvalidInput(format!("invalid quote id {:?} in {}: {}", raw, path.display(), e))
        })?;
        catalog.insert(id);
    }
    Ok(catalog)
}

#[async_trait::async_trait]
impl LikesStore for CsvLikesStore {
    async fn fetch_like_records(&self) -> AppResult<Vec<LikeRecord>> {
        self.reload().await?;
        Ok(self.snapshot.read().await.records.clone())
    }

    async fn fetch_catalog(&self) -> AppResult<HashSet<ItemId>> {
        let snapshot = self.snapshot.read().await;
        if let Some(catalog) = &snapshot.catalog {
            return Ok(catalog.clone());
        }

        // Without a quotes file every liked id counts as known
        Ok(snapshot
            .records
            .iter()
            .filter_map(|r| parse_likes(&r.likes).ok())
            .flatten()
            .collect())
    }

    async fn find_user(&self, user_id: i64) -> AppResult<Option<User>> {
        let snapshot = self.snapshot.read().await;
        Ok(snapshot
            .records
            .iter()
            .find(|r| r.user_id == user_id)
            .map(|r| User {
                id: r.user_id,
                name: r.name.clone(),
            }))
    }

    async fn find_user_by_name(&self, name: &str) -> AppResult<Option<User>> {
        let snapshot = self.snapshot.read().await;
        Ok(snapshot.records.iter().find(|r| r.name == name).map(|r| User {
            id: r.user_id,
            name: r.name.clone(),
        }))
    }

    async fn fetch_user_likes(&self, user_id: i64) -> AppResult<Vec<ItemId>> {
        let snapshot = self.snapshot.read().await;
        let Some(record) = snapshot.records.iter().find(|r| r.user_id == user_id) else {
            return Ok(Vec::new());
        };

        parse_likes(&record.likes).map_err(|reason| {
            AppError::Mining(crate::services::MiningError::DataFormat { user_id, reason })
        })
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}
