use super::PredictionRecord;
use crate::{Error, Result};
use libsql::{Builder, Connection, Database};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Records kept by the in-memory fallback before the oldest are dropped.
pub const FALLBACK_CAPACITY: usize = 1000;

struct Store {
    // Keeps the database open for the lifetime of the connection.
    _db: Database,
    conn: Connection,
}

enum Backend {
    Database(Store),
    // Used only when the database could not be opened at startup
    Memory {
        records: Mutex<VecDeque<PredictionRecord>>,
        capacity: usize,
    },
}

/// Log of past predictions, newest first on read.
pub struct HistoryStorage {
    backend: Backend,
}

impl HistoryStorage {
    pub async fn new(db_path: &str) -> Result<Self> {
        match Self::open(db_path).await {
            Ok(store) => {
                info!("Prediction history database ready: {}", db_path);
                Ok(Self {
                    backend: Backend::Database(store),
                })
            }
            Err(e) => {
                warn!(
                    "Database initialization failed, using in-memory fallback: {}",
                    e
                );
                Ok(Self::in_memory(FALLBACK_CAPACITY))
            }
        }
    }

    /// Memory-only history that keeps the newest `capacity` records.
    pub fn in_memory(capacity: usize) -> Self {
        Self {
            backend: Backend::Memory {
                records: Mutex::new(VecDeque::with_capacity(capacity.min(FALLBACK_CAPACITY))),
                capacity: capacity.max(1),
            },
        }
    }

    async fn open(db_path: &str) -> Result<Store> {
        let db = Builder::new_local(db_path).build().await?;
        let conn = db.connect()?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS predictions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                label TEXT NOT NULL,
                confidence REAL NOT NULL,
                created_at DATETIME NOT NULL
            )
            "#,
            (),
        )
        .await?;

        Ok(Store { _db: db, conn })
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, Backend::Database(_))
    }

    pub async fn save(&self, record: PredictionRecord) -> Result<()> {
        match &self.backend {
            Backend::Database(store) => {
                Self::save_to_db(&store.conn, &record).await?;
                debug!("Prediction saved to database: {}", record.label);
                Ok(())
            }
            Backend::Memory { records, capacity } => {
                let mut records = records
                    .lock()
                    .map_err(|e| Error::internal(format!("Mutex lock failed: {e}")))?;
                while records.len() >= *capacity {
                    records.pop_front();
                }
                records.push_back(record);
                Ok(())
            }
        }
    }

    async fn save_to_db(conn: &Connection, record: &PredictionRecord) -> Result<()> {
        conn.execute(
            "INSERT INTO predictions (label, confidence, created_at) VALUES (?, ?, ?)",
            (
                record.label.as_str(),
                record.confidence as f64,
                record.created_at.to_rfc3339(),
            ),
        )
        .await?;
        Ok(())
    }

    /// Returns at most `limit` records, newest first.
    pub async fn list(&self, limit: usize) -> Result<Vec<PredictionRecord>> {
        match &self.backend {
            Backend::Database(store) => {
                let records = Self::list_from_db(&store.conn, limit).await?;
                debug!("Retrieved {} predictions from database", records.len());
                Ok(records)
            }
            Backend::Memory { records, .. } => {
                let records = records
                    .lock()
                    .map_err(|e| Error::internal(format!("Mutex lock failed: {e}")))?;
                Ok(records.iter().rev().take(limit).cloned().collect())
            }
        }
    }

    async fn list_from_db(conn: &Connection, limit: usize) -> Result<Vec<PredictionRecord>> {
        let mut rows = conn
            .query(
                "SELECT id, label, confidence, created_at FROM predictions ORDER BY id DESC LIMIT ?",
                [limit as i64],
            )
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            let created_at_str: String = row.get(3)?;
            let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
                .map_err(|e| Error::internal(format!("Failed to parse timestamp: {e}")))?
                .with_timezone(&chrono::Utc);
            let confidence: f64 = row.get(2)?;

            records.push(PredictionRecord {
                id: Some(row.get(0)?),
                label: row.get(1)?,
                confidence: confidence as f32,
                created_at,
            });
        }

        Ok(records)
    }
}
