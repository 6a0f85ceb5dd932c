//! The collection-scoped document store.

use crate::{StoreError, StoreResult};
use cmdbkit_types::PublicId;
use rusqlite::{params, Connection, ErrorCode};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Equality filter over top-level document keys. An empty filter matches
/// every document.
#[derive(Debug, Clone, Default)]
pub struct Filter(BTreeMap<String, Value>);

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality condition on a top-level key.
    #[must_use]
    pub fn eq(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Whether the document satisfies every condition.
    #[must_use]
    pub fn matches(&self, doc: &Value) -> bool {
        self.0.iter().all(|(key, expected)| doc.get(key) == Some(expected))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Sort direction for [`Sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Sort spec over a top-level document key.
///
/// The default sorts by `public_id` ascending, which is also the stable
/// tie-break for every other key.
#[derive(Debug, Clone)]
pub struct Sort {
    pub key: String,
    pub order: SortOrder,
}

impl Sort {
    #[must_use]
    pub fn by(key: &str, order: SortOrder) -> Self {
        Self {
            key: key.to_string(),
            order,
        }
    }
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            key: "public_id".to_string(),
            order: SortOrder::Ascending,
        }
    }
}

/// SQLite-backed store of JSON documents in named collections.
pub struct DocumentStore {
    conn: Arc<Mutex<Connection>>,
}

impl DocumentStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Opens an in-memory store (for testing and embedding).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                public_id INTEGER NOT NULL,
                doc TEXT NOT NULL,
                UNIQUE(collection, public_id)
            );

            CREATE TABLE IF NOT EXISTS counters (
                collection TEXT PRIMARY KEY,
                value INTEGER NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Mints the next public id for a collection.
    ///
    /// The increment happens in a single statement so concurrent callers
    /// sharing the store never observe the same value.
    pub fn get_new_public_id(&self, collection: &str) -> StoreResult<PublicId> {
        let conn = self.conn.lock().unwrap();
        let value: u64 = conn.query_row(
            "INSERT INTO counters (collection, value) VALUES (?1, 1)
             ON CONFLICT(collection) DO UPDATE SET value = value + 1
             RETURNING value",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(PublicId::new(value))
    }

    /// Fetches one document by public id.
    pub fn get(&self, collection: &str, public_id: PublicId) -> StoreResult<Value> {
        let conn = self.conn.lock().unwrap();
        let doc: Option<String> = conn
            .query_row(
                "SELECT doc FROM documents WHERE collection = ?1 AND public_id = ?2",
                params![collection, public_id.value() as i64],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        match doc {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Err(StoreError::NotFound {
                collection: collection.to_string(),
                public_id,
            }),
        }
    }

    /// Fetches matching documents with sort/skip/limit, plus the total
    /// match count before pagination.
    pub fn get_many(
        &self,
        collection: &str,
        filter: &Filter,
        sort: &Sort,
        skip: usize,
        limit: Option<usize>,
    ) -> StoreResult<(Vec<Value>, usize)> {
        let mut docs = self.load_collection(collection)?;
        docs.retain(|doc| filter.matches(doc));
        let total = docs.len();

        docs.sort_by(|a, b| {
            let primary = cmp_values(a.get(&sort.key), b.get(&sort.key));
            let primary = match sort.order {
                SortOrder::Ascending => primary,
                SortOrder::Descending => primary.reverse(),
            };
            primary.then_with(|| cmp_values(a.get("public_id"), b.get("public_id")))
        });

        let page: Vec<Value> = docs
            .into_iter()
            .skip(skip)
            .take(limit.unwrap_or(usize::MAX))
            .collect();
        Ok((page, total))
    }

    /// Inserts a document under an already-minted public id.
    pub fn insert(&self, collection: &str, public_id: PublicId, doc: &Value) -> StoreResult<PublicId> {
        let raw = serde_json::to_string(doc)?;
        let conn = self.conn.lock().unwrap();
        let result = conn.execute(
            "INSERT INTO documents (collection, public_id, doc) VALUES (?1, ?2, ?3)",
            params![collection, public_id.value() as i64, raw],
        );
        match result {
            Ok(_) => {
                debug!(collection, %public_id, "document inserted");
                Ok(public_id)
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::DuplicateKey {
                    collection: collection.to_string(),
                    public_id,
                })
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Replaces the document stored under the given public id.
    pub fn update(&self, collection: &str, public_id: PublicId, doc: &Value) -> StoreResult<()> {
        let raw = serde_json::to_string(doc)?;
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE documents SET doc = ?3 WHERE collection = ?1 AND public_id = ?2",
            params![collection, public_id.value() as i64, raw],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                public_id,
            });
        }
        Ok(())
    }

    /// Removes the document stored under the given public id.
    pub fn delete(&self, collection: &str, public_id: PublicId) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND public_id = ?2",
            params![collection, public_id.value() as i64],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                public_id,
            });
        }
        debug!(collection, %public_id, "document deleted");
        Ok(())
    }

    /// Counts documents matching the filter.
    pub fn count(&self, collection: &str, filter: &Filter) -> StoreResult<usize> {
        if filter.is_empty() {
            let conn = self.conn.lock().unwrap();
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM documents WHERE collection = ?1",
                params![collection],
                |row| row.get(0),
            )?;
            return Ok(count as usize);
        }
        let docs = self.load_collection(collection)?;
        Ok(docs.iter().filter(|doc| filter.matches(doc)).count())
    }

    /// Groups documents by the string form of a top-level key and counts
    /// each bucket. Documents lacking the key are skipped.
    pub fn group_by(&self, collection: &str, key: &str) -> StoreResult<BTreeMap<String, usize>> {
        let docs = self.load_collection(collection)?;
        let mut buckets: BTreeMap<String, usize> = BTreeMap::new();
        for doc in docs {
            let Some(value) = doc.get(key) else { continue };
            let bucket = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            *buckets.entry(bucket).or_insert(0) += 1;
        }
        Ok(buckets)
    }

    fn load_collection(&self, collection: &str) -> StoreResult<Vec<Value>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT doc FROM documents WHERE collection = ?1 ORDER BY public_id ASC",
        )?;
        let rows = stmt.query_map(params![collection], |row| {
            let raw: String = row.get(0)?;
            Ok(raw)
        })?;

        let mut docs = Vec::new();
        for row in rows {
            let raw = row?;
            docs.push(serde_json::from_str(&raw)?);
        }
        Ok(docs)
    }
}

/// Total order over optional JSON values for sorting: missing < null < bool
/// < number < string; arrays/objects compare by their serialized form.
fn cmp_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => match (x, y) {
            (Value::Bool(p), Value::Bool(q)) => p.cmp(q),
            (Value::Number(p), Value::Number(q)) => p
                .as_f64()
                .partial_cmp(&q.as_f64())
                .unwrap_or(Ordering::Equal),
            (Value::String(p), Value::String(q)) => p.cmp(q),
            _ if rank(x) != rank(y) => rank(x).cmp(&rank(y)),
            _ => x.to_string().cmp(&y.to_string()),
        },
    }
}
