//! Record store backed by Spin's SQLite database.

use crate::{params, DbError, RecordStore, StoredCart, Value};
use spin_sdk::sqlite::Connection;

const SELECT_COLUMNS: &str =
    "SELECT identifier, instance, content, owner, created_at, updated_at FROM shoppingcart";

/// Parked carts in the `shoppingcart` table.
pub struct SqliteRecordStore {
    conn: Connection,
}

impl SqliteRecordStore {
    /// Open the default SQLite database.
    pub fn open_default() -> Result<Self, DbError> {
        let conn = Connection::open_default().map_err(|e| DbError::OpenError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Open a named SQLite database.
    pub fn open(name: &str) -> Result<Self, DbError> {
        let conn = Connection::open(name).map_err(|e| DbError::OpenError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Create the `shoppingcart` table if it does not exist.
    pub fn migrate(&self) -> Result<(), DbError> {
        self.execute(
            "CREATE TABLE IF NOT EXISTS shoppingcart (
                identifier TEXT PRIMARY KEY,
                instance TEXT NOT NULL,
                content TEXT NOT NULL,
                owner TEXT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            params![],
        )
        .map(|_| ())
    }

    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<spin_sdk::sqlite::QueryResult, DbError> {
        tracing::trace!(sql, params = params.len(), "sqlite execute");
        let spin_params: Vec<spin_sdk::sqlite::Value> = params.iter().map(Into::into).collect();
        self.conn
            .execute(sql, spin_params.as_slice())
            .map_err(|e| DbError::QueryError(e.to_string()))
    }
}

impl RecordStore for SqliteRecordStore {
    fn exists(&self, identifier: &str) -> Result<bool, DbError> {
        Ok(self.find(identifier)?.is_some())
    }

    fn insert(&self, record: StoredCart) -> Result<(), DbError> {
        if self.exists(&record.identifier)? {
            return Err(DbError::AlreadyExists(record.identifier));
        }
        self.execute(
            "INSERT INTO shoppingcart (identifier, instance, content, owner, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                &record.identifier,
                &record.instance,
                &record.content,
                record.owner.clone(),
                record.created_at,
                record.updated_at
            ],
        )?;
        Ok(())
    }

    fn update(&self, identifier: &str, mut record: StoredCart) -> Result<(), DbError> {
        if !self.exists(identifier)? {
            return Err(DbError::NotFound(identifier.to_string()));
        }
        record.touch();
        self.execute(
            "UPDATE shoppingcart SET instance = ?, content = ?, owner = ?, updated_at = ? \
             WHERE identifier = ?",
            params![
                &record.instance,
                &record.content,
                record.owner.clone(),
                record.updated_at,
                identifier
            ],
        )?;
        Ok(())
    }

    fn find(&self, identifier: &str) -> Result<Option<StoredCart>, DbError> {
        let sql = format!("{SELECT_COLUMNS} WHERE identifier = ?");
        let result = self.execute(&sql, params![identifier])?;
        let Some(row) = result.rows.first() else {
            return Ok(None);
        };

        let values: Vec<Value> = row.values.iter().map(Value::from).collect();
        let text = |i: usize| -> Result<String, DbError> {
            values
                .get(i)
                .and_then(Value::as_text)
                .map(str::to_string)
                .ok_or_else(|| DbError::DeserializeError(format!("column {i} is not text")))
        };
        let integer = |i: usize| values.get(i).and_then(Value::as_integer).unwrap_or(0);

        Ok(Some(StoredCart {
            identifier: text(0)?,
            instance: text(1)?,
            content: text(2)?,
            owner: values.get(3).and_then(Value::as_text).map(str::to_string),
            created_at: integer(4),
            updated_at: integer(5),
        }))
    }

    fn delete(&self, identifier: &str) -> Result<(), DbError> {
        self.execute(
            "DELETE FROM shoppingcart WHERE identifier = ?",
            params![identifier],
        )?;
        Ok(())
    }
}
