//! Version store backed by the migrations table
//!
//! The table is append-only: `(sequence UBIGINT PRIMARY KEY, version BIGINT,
//! dirty UTINYINT)`. The row with the greatest sequence is the current state.

use crate::error::{MigrateError, MigrateResult};
use tm_core::sql_utils::qualified_table;
use tm_core::{SequenceGenerator, VersionRecord, VersionState};
use tm_db::{Database, DbResult, ExecMode, Row, Value};

/// Reads and appends version records in one migrations table.
#[derive(Debug)]
pub struct VersionStore {
    table: String,
    sequence: SequenceGenerator,
}

impl VersionStore {
    /// Store for `table`, which may be schema-qualified.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            sequence: SequenceGenerator::new(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Schema-qualified, quoted table name. Unqualified names land in `main`,
    /// the schema the catalog check looks in.
    fn quoted_table(&self) -> String {
        qualified_table(&self.table)
    }

    fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE {} (sequence UBIGINT PRIMARY KEY, version BIGINT NOT NULL, dirty UTINYINT NOT NULL)",
            self.quoted_table()
        )
    }

    fn read_current_sql(&self) -> String {
        format!(
            "SELECT sequence, version, dirty FROM {} ORDER BY sequence DESC LIMIT 1",
            self.quoted_table()
        )
    }

    fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (sequence, version, dirty) VALUES (?, ?, ?)",
            self.quoted_table()
        )
    }

    /// Create the migrations table unless the catalog already lists it.
    ///
    /// Returns `true` when the table was created by this call. Callers hold
    /// the migration lock around it so the check and the create are not
    /// interleaved with another initialization in this process.
    pub async fn ensure_table(&self, db: &dyn Database) -> MigrateResult<bool> {
        let exists = db.relation_exists(&self.table).await.map_err(|source| {
            let query = source.sql().unwrap_or(self.table.as_str()).to_string();
            MigrateError::Catalog { query, source }
        })?;
        if exists {
            log::debug!("Migrations table {} already exists", self.table);
            self.observe_stored_sequence(db).await?;
            return Ok(false);
        }

        let query = self.create_table_sql();
        db.execute(ExecMode::Schema, &query)
            .await
            .map_err(|source| MigrateError::Catalog {
                query: query.clone(),
                source,
            })?;
        log::info!("Created migrations table {}", self.table);
        Ok(true)
    }

    /// The latest record's state, or [`VersionState::NONE`] for an empty table.
    pub async fn read_current(&self, db: &dyn Database) -> MigrateResult<VersionState> {
        let query = self.read_current_sql();
        let store_err = |source| MigrateError::Store {
            query: query.clone(),
            source,
        };

        let rows = db
            .query(ExecMode::Data, &query)
            .await
            .map_err(store_err)?;
        let Some(row) = rows.first() else {
            return Ok(VersionState::NONE);
        };

        let record = parse_record(row).map_err(store_err)?;
        self.sequence.observe(record.sequence);
        Ok(record.state())
    }

    /// Append a record in its own committed transaction.
    ///
    /// When this returns an error the record must be assumed not persisted.
    pub async fn append_record(
        &self,
        db: &dyn Database,
        version: i64,
        dirty: bool,
    ) -> MigrateResult<VersionRecord> {
        let record = VersionRecord {
            sequence: self.sequence.next(),
            version,
            dirty,
        };
        let query = self.insert_sql();
        let params = [
            Value::from(record.sequence),
            Value::from(record.version),
            Value::from(record.dirty_flag()),
        ];

        db.execute_in_transaction(&query, &params)
            .await
            .map_err(|source| MigrateError::Store {
                query: query.clone(),
                source,
            })?;

        log::info!(
            "Recorded version {} (dirty: {}) in {}",
            record.version,
            record.dirty,
            self.table
        );
        Ok(record)
    }

    /// Drop every user-created object, the migrations table included.
    ///
    /// Objects are dropped in catalog order. A drop that fails is retried
    /// after the rest of its pass, since a table referenced by a foreign key
    /// only becomes droppable once the referencing table is gone. A pass that
    /// drops nothing ends the operation with the first failure of that pass;
    /// objects dropped before it stay dropped. Returns how many objects were
    /// removed.
    pub async fn drop_all(&self, db: &dyn Database) -> MigrateResult<usize> {
        let mut pending = db.list_objects().await.map_err(|source| {
            let query = source.sql().unwrap_or("list objects").to_string();
            MigrateError::Drop { query, source }
        })?;

        let mut dropped = 0;
        while !pending.is_empty() {
            let pass_size = pending.len();
            let mut deferred = Vec::new();
            let mut first_failure = None;

            for object in pending {
                let query = object.drop_sql();
                match db.execute(ExecMode::Schema, &query).await {
                    Ok(_) => {
                        log::info!("Dropped {}", object.quoted_name());
                        dropped += 1;
                    }
                    Err(source) => {
                        log::debug!("Deferring drop of {}: {source}", object.quoted_name());
                        if first_failure.is_none() {
                            first_failure = Some(MigrateError::Drop { query, source });
                        }
                        deferred.push(object);
                    }
                }
            }

            if deferred.len() == pass_size {
                if let Some(err) = first_failure {
                    return Err(err);
                }
            }
            pending = deferred;
        }
        Ok(dropped)
    }

    /// Move the sequence generator past every key already stored.
    async fn observe_stored_sequence(&self, db: &dyn Database) -> MigrateResult<()> {
        let query = format!("SELECT max(sequence) FROM {}", self.quoted_table());
        let rows = db
            .query(ExecMode::Data, &query)
            .await
            .map_err(|source| MigrateError::Store {
                query: query.clone(),
                source,
            })?;

        // max() over an empty table is a single NULL.
        let Some(row) = rows.first() else {
            return Ok(());
        };
        if matches!(row.values().first(), None | Some(Value::Null)) {
            return Ok(());
        }

        let stored = row
            .get_u64(0)
            .map_err(|source| MigrateError::Store { query, source })?;
        self.sequence.observe(stored);
        Ok(())
    }
}

fn parse_record(row: &Row) -> DbResult<VersionRecord> {
    Ok(VersionRecord {
        sequence: row.get_u64(0)?,
        version: row.get_i64(1)?,
        dirty: row.get_bool(2)?,
    })
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
