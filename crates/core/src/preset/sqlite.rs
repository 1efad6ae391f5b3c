//! SQLite-backed preset persistence.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{FilterPreset, NewPreset, PersistenceError, PresetPersistence};
use crate::filter::FilterSpecification;

/// SQLite-backed preset persistence.
pub struct SqlitePresetPersistence {
    conn: Mutex<Connection>,
}

impl SqlitePresetPersistence {
    /// Open (or create) the database file and its tables.
    pub fn new(path: &Path) -> Result<Self, PersistenceError> {
        let conn =
            Connection::open(path).map_err(|e| PersistenceError::Storage(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| PersistenceError::Storage(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), PersistenceError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS filter_presets (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                filter_spec TEXT NOT NULL,
                is_default INTEGER NOT NULL DEFAULT 0,
                is_public INTEGER NOT NULL DEFAULT 0,
                usage_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_filter_presets_created_at ON filter_presets(created_at);
            "#,
        )
        .map_err(|e| PersistenceError::Storage(e.to_string()))?;

        Ok(())
    }

    fn row_to_preset(row: &rusqlite::Row) -> rusqlite::Result<FilterPreset> {
        let spec_json: String = row.get(3)?;
        let created_at_str: String = row.get(7)?;

        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        // A spec that no longer parses degrades to "match all" rather than
        // hiding the preset
        let filter_specification: FilterSpecification =
            serde_json::from_str(&spec_json).unwrap_or_default();

        Ok(FilterPreset {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            filter_specification,
            is_default: row.get(4)?,
            is_public: row.get(5)?,
            usage_count: row.get::<_, i64>(6)?.max(0) as u64,
            created_at,
        })
    }
}

#[async_trait]
impl PresetPersistence for SqlitePresetPersistence {
    async fn list(&self) -> Result<Vec<FilterPreset>, PersistenceError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT id, name, description, filter_spec, is_default, is_public, usage_count, created_at
                 FROM filter_presets ORDER BY created_at ASC, id ASC",
            )
            .map_err(|e| PersistenceError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_preset)
            .map_err(|e| PersistenceError::Storage(e.to_string()))?;

        let mut presets = Vec::new();
        for row in rows {
            presets.push(row.map_err(|e| PersistenceError::Storage(e.to_string()))?);
        }
        Ok(presets)
    }

    async fn create(&self, preset: NewPreset) -> Result<FilterPreset, PersistenceError> {
        let conn = self.conn.lock().unwrap();

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let spec_json = serde_json::to_string(&preset.filter_specification)
            .map_err(|e| PersistenceError::Storage(e.to_string()))?;

        conn.execute(
            "INSERT INTO filter_presets (id, name, description, filter_spec, is_default, is_public, usage_count, created_at) VALUES (?, ?, ?, ?, ?, ?, 0, ?)",
            params![
                id,
                preset.name,
                preset.description,
                spec_json,
                preset.is_default,
                preset.is_public,
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| PersistenceError::Storage(e.to_string()))?;

        Ok(FilterPreset {
            id,
            name: preset.name,
            description: preset.description,
            filter_specification: preset.filter_specification,
            is_default: preset.is_default,
            is_public: preset.is_public,
            usage_count: 0,
            created_at: now,
        })
    }

    async fn delete(&self, id: &str) -> Result<(), PersistenceError> {
        let conn = self.conn.lock().unwrap();

        let affected = conn
            .execute("DELETE FROM filter_presets WHERE id = ?", params![id])
            .map_err(|e| PersistenceError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(PersistenceError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn increment_usage(&self, id: &str) -> Result<(), PersistenceError> {
        let conn = self.conn.lock().unwrap();

        let affected = conn
            .execute(
                "UPDATE filter_presets SET usage_count = usage_count + 1 WHERE id = ?",
                params![id],
            )
            .map_err(|e| PersistenceError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(PersistenceError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
