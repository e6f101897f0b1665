//! Versioned universe storage on SQLite.
//!
//! A background thread owns the connection and drains a command channel,
//! so callers never hold database latency inside a simulation tick. Each
//! universe is one row: a JSON document plus a version counter and a few
//! denormalized columns for cheap owner listings. Writes are optimistic:
//! an update names the version it read, and a moved row comes back as
//! [`StoreError::Conflict`] instead of silently losing the race.

use crate::error::{Result, StoreError};
use chrono::Utc;
use cosmogenesis_data::{Universe, UniverseStatus};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::thread;
use uuid::Uuid;

/// Projection returned by owner listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniverseSummary {
    pub id: Uuid,
    pub name: String,
    pub difficulty: String,
    pub status: String,
    pub age: f64,
    pub stability_index: f64,
    pub last_modified: String,
}

/// Commands for the background storage thread.
enum StoreCommand {
    Insert {
        universe: Box<Universe>,
        reply: Sender<Result<()>>,
    },
    Load {
        id: Uuid,
        reply: Sender<Result<(Universe, i64)>>,
    },
    ListByOwner {
        owner_id: String,
        reply: Sender<Result<Vec<UniverseSummary>>>,
    },
    UpdateVersioned {
        universe: Box<Universe>,
        expected_version: i64,
        reply: Sender<Result<i64>>,
    },
    Delete {
        id: Uuid,
        reply: Sender<Result<()>>,
    },
    Stop,
}

/// Thread-safe handle to the persistent universe store.
pub struct UniverseStore {
    sender: Sender<StoreCommand>,
}

impl UniverseStore {
    /// Opens (or creates) the store and spawns its worker thread.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<StoreCommand>();
        let path = path.as_ref().to_owned();

        // Fail fast on an unopenable database before detaching the worker.
        let mut conn = Connection::open(&path).map_err(StoreError::from)?;
        init_db(&mut conn)?;
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;");

        thread::spawn(move || {
            while let Ok(command) = rx.recv() {
                match command {
                    StoreCommand::Insert { universe, reply } => {
                        let _ = reply.send(insert(&conn, &universe));
                    }
                    StoreCommand::Load { id, reply } => {
                        let _ = reply.send(load(&conn, id));
                    }
                    StoreCommand::ListByOwner { owner_id, reply } => {
                        let _ = reply.send(list_by_owner(&conn, &owner_id));
                    }
                    StoreCommand::UpdateVersioned {
                        universe,
                        expected_version,
                        reply,
                    } => {
                        let _ = reply.send(update_versioned(&conn, &universe, expected_version));
                    }
                    StoreCommand::Delete { id, reply } => {
                        let _ = reply.send(delete(&conn, id));
                    }
                    StoreCommand::Stop => break,
                }
            }
            tracing::debug!("universe store thread stopped");
        });

        Ok(Self { sender: tx })
    }

    fn roundtrip<T>(&self, build: impl FnOnce(Sender<Result<T>>) -> StoreCommand) -> Result<T> {
        let (tx, rx) = mpsc::channel();
        self.sender
            .send(build(tx))
            .map_err(|_| StoreError::Database("storage thread unavailable".into()))?;
        rx.recv()
            .map_err(|_| StoreError::Database("storage thread dropped the reply".into()))?
    }

    /// Persists a newly created universe at version 1.
    pub fn insert(&self, universe: &Universe) -> Result<()> {
        self.roundtrip(|reply| StoreCommand::Insert {
            universe: Box::new(universe.clone()),
            reply,
        })
    }

    /// Loads a universe document and the version it was read at.
    pub fn load(&self, id: Uuid) -> Result<(Universe, i64)> {
        self.roundtrip(|reply| StoreCommand::Load { id, reply })
    }

    /// Summary projections of every universe owned by `owner_id`.
    pub fn list_by_owner(&self, owner_id: &str) -> Result<Vec<UniverseSummary>> {
        self.roundtrip(|reply| StoreCommand::ListByOwner {
            owner_id: owner_id.to_string(),
            reply,
        })
    }

    /// Replaces the document in one write, guarded by the version the
    /// caller read. Returns the new version.
    pub fn update(&self, universe: &Universe, expected_version: i64) -> Result<i64> {
        self.roundtrip(|reply| StoreCommand::UpdateVersioned {
            universe: Box::new(universe.clone()),
            expected_version,
            reply,
        })
    }

    pub fn delete(&self, id: Uuid) -> Result<()> {
        self.roundtrip(|reply| StoreCommand::Delete { id, reply })
    }

    /// Asks the worker thread to exit once queued commands drain.
    pub fn shutdown(&self) {
        let _ = self.sender.send(StoreCommand::Stop);
    }
}

fn init_db(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS universes (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            name TEXT NOT NULL,
            difficulty TEXT NOT NULL,
            status TEXT NOT NULL,
            age_years REAL NOT NULL DEFAULT 0,
            stability REAL NOT NULL DEFAULT 1,
            version INTEGER NOT NULL DEFAULT 1,
            document TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_universes_owner ON universes(owner_id)",
        [],
    )?;
    Ok(())
}

fn status_label(status: UniverseStatus) -> &'static str {
    match status {
        UniverseStatus::Running => "running",
        UniverseStatus::Paused => "paused",
        UniverseStatus::Ended => "ended",
    }
}

fn insert(conn: &Connection, universe: &Universe) -> Result<()> {
    let document = serde_json::to_string(universe)?;
    conn.execute(
        "INSERT INTO universes
            (id, owner_id, name, difficulty, status, age_years, stability, version, document, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?9)",
        params![
            universe.id.to_string(),
            universe.owner_id,
            universe.name,
            universe.difficulty.as_str(),
            status_label(universe.status),
            universe.current_state.age,
            universe.current_state.stability_index,
            document,
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn load(conn: &Connection, id: Uuid) -> Result<(Universe, i64)> {
    let row: Option<(String, i64)> = conn
        .query_row(
            "SELECT document, version FROM universes WHERE id = ?1",
            params![id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let (document, version) =
        row.ok_or_else(|| StoreError::not_found(format!("universe {id}")))?;
    let universe: Universe = serde_json::from_str(&document)?;
    Ok((universe, version))
}

fn list_by_owner(conn: &Connection, owner_id: &str) -> Result<Vec<UniverseSummary>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, difficulty, status, age_years, stability, updated_at
         FROM universes WHERE owner_id = ?1 ORDER BY updated_at DESC",
    )?;
    let rows = stmt.query_map(params![owner_id], |row| {
        let id_str: String = row.get(0)?;
        Ok(UniverseSummary {
            id: Uuid::parse_str(&id_str).unwrap_or_default(),
            name: row.get(1)?,
            difficulty: row.get(2)?,
            status: row.get(3)?,
            age: row.get(4)?,
            stability_index: row.get(5)?,
            last_modified: row.get(6)?,
        })
    })?;
    Ok(rows.filter_map(std::result::Result::ok).collect())
}

fn update_versioned(conn: &Connection, universe: &Universe, expected_version: i64) -> Result<i64> {
    let document = serde_json::to_string(universe)?;
    let changed = conn.execute(
        "UPDATE universes
         SET name = ?2, status = ?3, age_years = ?4, stability = ?5,
             document = ?6, updated_at = ?7, version = version + 1
         WHERE id = ?1 AND version = ?8",
        params![
            universe.id.to_string(),
            universe.name,
            status_label(universe.status),
            universe.current_state.age,
            universe.current_state.stability_index,
            document,
            Utc::now().to_rfc3339(),
            expected_version,
        ],
    )?;

    if changed == 1 {
        return Ok(expected_version + 1);
    }

    // Distinguish a lost race from a missing row.
    let exists: Option<i64> = conn
        .query_row(
            "SELECT version FROM universes WHERE id = ?1",
            params![universe.id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    match exists {
        Some(current) => Err(StoreError::conflict(format!(
            "universe {} moved from version {expected_version} to {current}",
            universe.id
        ))),
        None => Err(StoreError::not_found(format!("universe {}", universe.id))),
    }
}

fn delete(conn: &Connection, id: Uuid) -> Result<()> {
    let changed = conn.execute(
        "DELETE FROM universes WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(StoreError::not_found(format!("universe {id}")));
    }
    Ok(())
}
