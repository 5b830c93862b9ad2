//! Transactional chapter persistence used by the upload pipeline.
//!
//! A chapter and its pages are written through one [`ChapterTx`]; nothing is
//! visible to readers until [`ChapterTx::commit`]. Dropping a transaction
//! without committing discards every write made through it.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use crate::database::manager::DatabaseError;

#[async_trait]
pub trait ChapterStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn ChapterTx>, DatabaseError>;
}

#[async_trait]
pub trait ChapterTx: Send {
    /// Insert a chapter row and return its id.
    async fn create_chapter(&mut self, manhwa_id: i32, chapter_number: i32, title: &str) -> Result<i32, DatabaseError>;

    async fn add_page(&mut self, chapter_id: i32, position: i32, image_url: &str) -> Result<(), DatabaseError>;

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError>;
}

/// Postgres-backed store; each `begin` opens a pool transaction.
#[derive(Clone)]
pub struct PgChapterStore {
    pool: PgPool,
}

impl PgChapterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChapterStore for PgChapterStore {
    async fn begin(&self) -> Result<Box<dyn ChapterTx>, DatabaseError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgChapterTx { tx }))
    }
}

struct PgChapterTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ChapterTx for PgChapterTx {
    async fn create_chapter(&mut self, manhwa_id: i32, chapter_number: i32, title: &str) -> Result<i32, DatabaseError> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO chapters (manhwa_id, chapter_number, title) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(manhwa_id)
        .bind(chapter_number)
        .bind(title)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn add_page(&mut self, chapter_id: i32, position: i32, image_url: &str) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO pages (chapter_id, page_number, image_url) VALUES ($1, $2, $3)")
            .bind(chapter_id)
            .bind(position)
            .bind(image_url)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredChapter {
    pub id: i32,
    pub manhwa_id: i32,
    pub chapter_number: i32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPage {
    pub chapter_id: i32,
    pub page_number: i32,
    pub image_url: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i32,
    chapters: Vec<StoredChapter>,
    pages: Vec<StoredPage>,
}

/// In-process store for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryChapterStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryChapterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed chapters, in insertion order.
    pub fn chapters(&self) -> Vec<StoredChapter> {
        self.lock().chapters.clone()
    }

    /// Committed pages, in insertion order.
    pub fn pages(&self) -> Vec<StoredPage> {
        self.lock().pages.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A panic while holding the lock leaves plain data behind; keep using it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ChapterStore for MemoryChapterStore {
    async fn begin(&self) -> Result<Box<dyn ChapterTx>, DatabaseError> {
        Ok(Box::new(MemoryChapterTx {
            store: self.clone(),
            chapters: Vec::new(),
            pages: Vec::new(),
        }))
    }
}

struct MemoryChapterTx {
    store: MemoryChapterStore,
    chapters: Vec<StoredChapter>,
    pages: Vec<StoredPage>,
}

#[async_trait]
impl ChapterTx for MemoryChapterTx {
    async fn create_chapter(&mut self, manhwa_id: i32, chapter_number: i32, title: &str) -> Result<i32, DatabaseError> {
        // Ids are consumed even if the transaction is later dropped, like a sequence.
        let id = {
            let mut state = self.store.lock();
            state.next_id += 1;
            state.next_id
        };
        self.chapters.push(StoredChapter {
            id,
            manhwa_id,
            chapter_number,
            title: title.to_string(),
        });
        Ok(id)
    }

    async fn add_page(&mut self, chapter_id: i32, position: i32, image_url: &str) -> Result<(), DatabaseError> {
        if !self.chapters.iter().any(|c| c.id == chapter_id) {
            return Err(DatabaseError::NotFound(format!("chapter {} not in this transaction", chapter_id)));
        }
        self.pages.push(StoredPage {
            chapter_id,
            page_number: position,
            image_url: image_url.to_string(),
        });
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        let this = *self;
        let mut state = this.store.lock();
        debug!("Committing {} chapter(s), {} page(s)", this.chapters.len(), this.pages.len());
        state.chapters.extend(this.chapters);
        state.pages.extend(this.pages);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_are_visible_only_after_commit() {
        let store = MemoryChapterStore::new();

        let mut tx = store.begin().await.unwrap();
        let id = tx.create_chapter(1, 5, "").await.unwrap();
        tx.add_page(id, 1, "data:image/jpeg;base64,AAAA").await.unwrap();
        assert!(store.chapters().is_empty());

        tx.commit().await.unwrap();
        assert_eq!(store.chapters().len(), 1);
        assert_eq!(store.pages()[0].chapter_id, id);
    }

    #[tokio::test]
    async fn dropped_transaction_leaves_nothing_behind() {
        let store = MemoryChapterStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.create_chapter(1, 1, "").await.unwrap();
        }
        assert!(store.chapters().is_empty());
        assert!(store.pages().is_empty());
    }

    #[tokio::test]
    async fn resubmission_creates_a_new_chapter() {
        let store = MemoryChapterStore::new();
        for _ in 0..2 {
            let mut tx = store.begin().await.unwrap();
            tx.create_chapter(1, 5, "same").await.unwrap();
            tx.commit().await.unwrap();
        }
        let chapters = store.chapters();
        assert_eq!(chapters.len(), 2);
        assert_ne!(chapters[0].id, chapters[1].id);
    }
}
