// crates/role-reactor-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Role Store
// Description: Durable RoleStore backed by SQLite WAL.
// Purpose: Persist role records with JSON-serialized reactor fields.
// Dependencies: role-reactor-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`RoleStore`] using `SQLite`. Each role
//! row carries the three reactor-visible fields as nullable JSON columns;
//! a NULL column models an absent field. Loads fail closed when stored JSON
//! cannot be decoded.
//! Invariants:
//! - `(account, role_name)` is unique; lookups resolve at most one role.
//! - `Policies` order round-trips exactly as written.
//! - Schema versions are checked on open; mismatches refuse the database.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use role_reactor_core::RoleField;
use role_reactor_core::RoleFieldValue;
use role_reactor_core::RoleId;
use role_reactor_core::RoleStore;
use role_reactor_core::RoleStoreError;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for the `SQLite` role store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteRoleStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl SqliteRoleStoreConfig {
    /// Creates a configuration for `path` with default timeouts.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` role store errors.
#[derive(Debug, Error)]
pub enum SqliteRoleStoreError {
    /// Store I/O error.
    #[error("sqlite role store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite role store db error: {0}")]
    Db(String),
    /// Stored data cannot be decoded.
    #[error("sqlite role store invalid data: {0}")]
    Invalid(String),
    /// Store schema version mismatch.
    #[error("sqlite role store version mismatch: {0}")]
    VersionMismatch(String),
}

impl From<SqliteRoleStoreError> for RoleStoreError {
    fn from(error: SqliteRoleStoreError) -> Self {
        match error {
            SqliteRoleStoreError::Io(message) => Self::Io(message),
            SqliteRoleStoreError::Db(message) | SqliteRoleStoreError::VersionMismatch(message) => {
                Self::Store(message)
            }
            SqliteRoleStoreError::Invalid(message) => Self::Corrupt(message),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed role store with WAL support.
#[derive(Clone)]
pub struct SqliteRoleStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteRoleStore {
    /// Opens an `SQLite`-backed role store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteRoleStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn open(config: &SqliteRoleStoreConfig) -> Result<Self, SqliteRoleStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let connection = Connection::open_with_flags(&config.path, flags)
            .map_err(|err| SqliteRoleStoreError::Db(err.to_string()))?;
        apply_pragmas(&connection, config.busy_timeout_ms)?;
        Self::from_connection(connection)
    }

    /// Opens an in-memory role store for tests and local experiments.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteRoleStoreError`] when initialization fails.
    pub fn open_in_memory() -> Result<Self, SqliteRoleStoreError> {
        let connection = Connection::open_in_memory()
            .map_err(|err| SqliteRoleStoreError::Db(err.to_string()))?;
        Self::from_connection(connection)
    }

    /// Wraps an opened connection after initializing the schema.
    fn from_connection(mut connection: Connection) -> Result<Self, SqliteRoleStoreError> {
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Creates a role record if absent and returns its identifier.
    ///
    /// Existing `(account, role_name)` rows keep their identifier and fields.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteRoleStoreError`] when the write fails.
    pub fn put_role(
        &self,
        account: &str,
        role_name: &str,
    ) -> Result<RoleId, SqliteRoleStoreError> {
        let role_id = format!("{account}/{role_name}");
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO roles (role_id, account, role_name) VALUES (?1, ?2, ?3) ON \
                 CONFLICT(account, role_name) DO NOTHING",
                params![role_id, account, role_name],
            )
            .map_err(|err| SqliteRoleStoreError::Db(err.to_string()))?;
        let existing: String = guard
            .query_row(
                "SELECT role_id FROM roles WHERE account = ?1 AND role_name = ?2",
                params![account, role_name],
                |row| row.get(0),
            )
            .map_err(|err| SqliteRoleStoreError::Db(err.to_string()))?;
        Ok(RoleId::new(existing))
    }

    /// Locks the shared connection, mapping poisoning to a store error.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteRoleStoreError> {
        self.connection.lock().map_err(|_| SqliteRoleStoreError::Db("mutex poisoned".to_string()))
    }

    /// Resolves a role identifier by account and role name.
    fn find_id(
        &self,
        account: &str,
        role_name: &str,
    ) -> Result<Option<RoleId>, SqliteRoleStoreError> {
        let guard = self.lock()?;
        let role_id: Option<String> = guard
            .query_row(
                "SELECT role_id FROM roles WHERE account = ?1 AND role_name = ?2",
                params![account, role_name],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| SqliteRoleStoreError::Db(err.to_string()))?;
        Ok(role_id.map(RoleId::new))
    }

    /// Reads the requested fields of a role row.
    fn read_fields(
        &self,
        role_id: &RoleId,
        fields: &[RoleField],
    ) -> Result<BTreeMap<RoleField, RoleFieldValue>, SqliteRoleStoreError> {
        let guard = self.lock()?;
        let row: Option<(Option<String>, Option<String>, Option<String>)> = guard
            .query_row(
                "SELECT repoable_services, policies, opt_out FROM roles WHERE role_id = ?1",
                params![role_id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .map_err(|err| SqliteRoleStoreError::Db(err.to_string()))?;
        drop(guard);
        let Some((repoable_services, policies, opt_out)) = row else {
            return Err(SqliteRoleStoreError::Db(format!("unknown role id {role_id}")));
        };
        let mut values = BTreeMap::new();
        for field in fields {
            let value = match field {
                RoleField::RepoableServices => {
                    decode_column(repoable_services.as_deref(), role_id, *field)?
                        .map(RoleFieldValue::RepoableServices)
                }
                RoleField::Policies => decode_column(policies.as_deref(), role_id, *field)?
                    .map(RoleFieldValue::Policies),
                RoleField::OptOut => decode_column(opt_out.as_deref(), role_id, *field)?
                    .map(|record| RoleFieldValue::OptOut(Some(record))),
            };
            if let Some(value) = value {
                values.insert(*field, value);
            }
        }
        Ok(values)
    }

    /// Writes the provided field values to a role row.
    fn write_fields(
        &self,
        role_id: &RoleId,
        updates: BTreeMap<RoleField, RoleFieldValue>,
    ) -> Result<(), SqliteRoleStoreError> {
        let guard = self.lock()?;
        for (field, value) in updates {
            if value.field() != field {
                return Err(SqliteRoleStoreError::Invalid(format!(
                    "value does not belong to field {field}"
                )));
            }
            let column = match value {
                RoleFieldValue::RepoableServices(services) => encode_column(&services)?,
                RoleFieldValue::Policies(versions) => encode_column(&versions)?,
                RoleFieldValue::OptOut(Some(record)) => encode_column(&record)?,
                // A cleared opt-out is stored as NULL.
                RoleFieldValue::OptOut(None) => None,
            };
            let statement = match field {
                RoleField::RepoableServices => {
                    "UPDATE roles SET repoable_services = ?1 WHERE role_id = ?2"
                }
                RoleField::Policies => "UPDATE roles SET policies = ?1 WHERE role_id = ?2",
                RoleField::OptOut => "UPDATE roles SET opt_out = ?1 WHERE role_id = ?2",
            };
            let updated = guard
                .execute(statement, params![column, role_id.as_str()])
                .map_err(|err| SqliteRoleStoreError::Db(err.to_string()))?;
            if updated != 1 {
                return Err(SqliteRoleStoreError::Db(format!("unknown role id {role_id}")));
            }
        }
        Ok(())
    }
}

impl RoleStore for SqliteRoleStore {
    fn find_role_id(
        &self,
        account: &str,
        role_name: &str,
    ) -> Result<Option<RoleId>, RoleStoreError> {
        self.find_id(account, role_name).map_err(RoleStoreError::from)
    }

    fn get_fields(
        &self,
        role_id: &RoleId,
        fields: &[RoleField],
    ) -> Result<BTreeMap<RoleField, RoleFieldValue>, RoleStoreError> {
        self.read_fields(role_id, fields).map_err(RoleStoreError::from)
    }

    fn set_fields(
        &self,
        role_id: &RoleId,
        updates: BTreeMap<RoleField, RoleFieldValue>,
    ) -> Result<(), RoleStoreError> {
        self.write_fields(role_id, updates).map_err(RoleStoreError::from)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes one nullable JSON column into its typed value.
fn decode_column<T: serde::de::DeserializeOwned>(
    column: Option<&str>,
    role_id: &RoleId,
    field: RoleField,
) -> Result<Option<T>, SqliteRoleStoreError> {
    match column {
        None => Ok(None),
        Some(json) => serde_json::from_str(json).map(Some).map_err(|err| {
            SqliteRoleStoreError::Invalid(format!(
                "undecodable {field} for role {role_id}: {err}"
            ))
        }),
    }
}

/// Encodes one typed value into a JSON column.
fn encode_column<T: serde::Serialize>(value: &T) -> Result<Option<String>, SqliteRoleStoreError> {
    serde_json::to_string(value)
        .map(Some)
        .map_err(|err| SqliteRoleStoreError::Invalid(err.to_string()))
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteRoleStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteRoleStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteRoleStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteRoleStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteRoleStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteRoleStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteRoleStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    busy_timeout_ms: u64,
) -> Result<(), SqliteRoleStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteRoleStoreError::Db(err.to_string()))?;
    connection
        .execute_batch("PRAGMA journal_mode = wal;")
        .map_err(|err| SqliteRoleStoreError::Db(err.to_string()))?;
    connection
        .execute_batch("PRAGMA synchronous = full;")
        .map_err(|err| SqliteRoleStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(busy_timeout_ms))
        .map_err(|err| SqliteRoleStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteRoleStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteRoleStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteRoleStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteRoleStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteRoleStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS roles (
                    role_id TEXT PRIMARY KEY,
                    account TEXT NOT NULL,
                    role_name TEXT NOT NULL,
                    repoable_services TEXT,
                    policies TEXT,
                    opt_out TEXT,
                    UNIQUE (account, role_name)
                );",
            )
            .map_err(|err| SqliteRoleStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteRoleStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteRoleStoreError::Db(err.to_string()))?;
    Ok(())
}
