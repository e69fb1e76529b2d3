// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Book persistence backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `books`: book id → serialized Book (JSON bytes)
//! - `sequences`: sequence name → last assigned id
//!
//! Id allocation and the insert happen in one write transaction, so ids are
//! monotonic and never reused after deletion.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::model::Book;

/// Primary table: book id → serialized Book (JSON bytes).
const BOOKS: TableDefinition<i64, &[u8]> = TableDefinition::new("books");

/// Sequence table: sequence name → last assigned id.
const SEQUENCES: TableDefinition<&str, i64> = TableDefinition::new("sequences");

/// Name of the book id sequence.
const BOOK_SEQUENCE: &str = "books";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Fields of a not-yet-persisted book; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The narrow storage contract the book service depends on.
///
/// Implementations are single-call atomic; the service's read-modify-write
/// paths make no cross-call transactional guarantee.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books, in no particular order.
    async fn find_all(&self) -> StoreResult<Vec<Book>>;

    /// Look up a single book by id.
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Book>>;

    /// Persist a new book, assigning the next id.
    async fn insert(&self, new: NewBook) -> StoreResult<Book>;

    /// Write back an existing book.
    async fn save(&self, book: &Book) -> StoreResult<()>;

    /// Remove a book. Removing an absent id is a no-op.
    async fn delete_by_id(&self, id: i64) -> StoreResult<()>;
}

// =============================================================================
// RedbBookStore
// =============================================================================

/// Embedded ACID book store.
pub struct RedbBookStore {
    db: Database,
}

impl RedbBookStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(BOOKS)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }
}

#[async_trait]
impl BookStore for RedbBookStore {
    async fn find_all(&self) -> StoreResult<Vec<Book>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BOOKS)?;
        let mut books = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            books.push(serde_json::from_slice(value.value())?);
        }
        Ok(books)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Book>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BOOKS)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, new: NewBook) -> StoreResult<Book> {
        let write_txn = self.db.begin_write()?;
        let book = {
            let mut sequences = write_txn.open_table(SEQUENCES)?;
            let id = sequences
                .get(BOOK_SEQUENCE)?
                .map(|v| v.value())
                .unwrap_or(0)
                + 1;
            sequences.insert(BOOK_SEQUENCE, id)?;

            let book = Book {
                id,
                name: new.name,
                description: new.description,
                created_at: new.created_at,
                updated_at: new.updated_at,
            };
            let json = serde_json::to_vec(&book)?;
            let mut books = write_txn.open_table(BOOKS)?;
            books.insert(id, json.as_slice())?;
            book
        };
        write_txn.commit()?;
        Ok(book)
    }

    async fn save(&self, book: &Book) -> StoreResult<()> {
        let json = serde_json::to_vec(book)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut books = write_txn.open_table(BOOKS)?;
            books.insert(book.id, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut books = write_txn.open_table(BOOKS)?;
            books.remove(id)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

// =============================================================================
// MemoryBookStore
// =============================================================================

/// In-memory book store for tests and ephemeral runs.
///
/// Ids come from the same kind of monotonic sequence the persistent store
/// uses, so deleted ids are never reassigned.
#[derive(Default)]
pub struct MemoryBookStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    books: HashMap<i64, Book>,
    last_id: i64,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn find_all(&self) -> StoreResult<Vec<Book>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.books.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Book>> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.books.get(&id).cloned())
    }

    async fn insert(&self, new: NewBook) -> StoreResult<Book> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.last_id += 1;
        let book = Book {
            id: inner.last_id,
            name: new.name,
            description: new.description,
            created_at: new.created_at,
            updated_at: new.updated_at,
        };
        inner.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn save(&self, book: &Book) -> StoreResult<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.books.insert(book.id, book.clone());
        Ok(())
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<()> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.books.remove(&id);
        Ok(())
    }
}

// =============================================================================
// Test instrumentation
// =============================================================================


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_book(name: &str) -> NewBook {
        let now = Utc::now();
        NewBook {
            name: name.to_string(),
            description: format!("about {name}"),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn redb_insert_assigns_sequential_ids() {
        let dir = TempDir::new().expect("temp dir");
        let store = RedbBookStore::open(&dir.path().join("books.redb")).expect("open store");

        let first = store.insert(new_book("Dune")).await.expect("insert");
        let second = store.insert(new_book("Hyperion")).await.expect("insert");
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn redb_ids_are_never_reused_after_deletion() {
        let dir = TempDir::new().expect("temp dir");
        let store = RedbBookStore::open(&dir.path().join("books.redb")).expect("open store");

        let first = store.insert(new_book("Dune")).await.expect("insert");
        store.delete_by_id(first.id).await.expect("delete");
        let second = store.insert(new_book("Hyperion")).await.expect("insert");
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn redb_find_by_id_roundtrip() {
        let dir = TempDir::new().expect("temp dir");
        let store = RedbBookStore::open(&dir.path().join("books.redb")).expect("open store");

        let inserted = store.insert(new_book("Dune")).await.expect("insert");
        let found = store
            .find_by_id(inserted.id)
            .await
            .expect("find")
            .expect("present");
        assert_eq!(found, inserted);
        assert!(store.find_by_id(999).await.expect("find").is_none());
    }

    #[tokio::test]
    async fn redb_save_overwrites_record() {
        let dir = TempDir::new().expect("temp dir");
        let store = RedbBookStore::open(&dir.path().join("books.redb")).expect("open store");

        let mut book = store.insert(new_book("Dune")).await.expect("insert");
        book.description = "Updated".to_string();
        store.save(&book).await.expect("save");

        let found = store
            .find_by_id(book.id)
            .await
            .expect("find")
            .expect("present");
        assert_eq!(found.description, "Updated");
    }

    #[tokio::test]
    async fn redb_sequence_survives_reopen() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("books.redb");

        let first_id = {
            let store = RedbBookStore::open(&path).expect("open store");
            let book = store.insert(new_book("Dune")).await.expect("insert");
            store.delete_by_id(book.id).await.expect("delete");
            book.id
        };

        let store = RedbBookStore::open(&path).expect("reopen store");
        let book = store.insert(new_book("Hyperion")).await.expect("insert");
        assert!(book.id > first_id);
    }

    #[tokio::test]
    async fn memory_store_matches_sequence_behavior() {
        let store = MemoryBookStore::new();
        let first = store.insert(new_book("Dune")).await.expect("insert");
        store.delete_by_id(first.id).await.expect("delete");
        let second = store.insert(new_book("Hyperion")).await.expect("insert");
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(store.find_by_id(first.id).await.expect("find").is_none());
    }

    #[tokio::test]
    async fn find_all_returns_every_record() {
        let store = MemoryBookStore::new();
        assert!(store.find_all().await.expect("find all").is_empty());
        store.insert(new_book("Dune")).await.expect("insert");
        store.insert(new_book("Hyperion")).await.expect("insert");
        assert_eq!(store.find_all().await.expect("find all").len(), 2);
    }
}
