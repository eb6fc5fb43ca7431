//! Database handle.
//! Uses diesel with SQLite backend; schema lives in embedded migrations.

use crate::error::Result;
use crate::models::{ComicRecord, ProgressMarker};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::path::Path;

embed_migrations!("migrations");

/// Discriminator of the single progress row.
const PROGRESS_SLOT: i32 = 0;

/// Database handle owning the connection. Opened once at process start and
/// passed by reference to whatever needs it.
pub struct Store {
    conn: SqliteConnection,
}

impl Store {
    /// Opens (creating if needed) the database at `path`, applies pending
    /// migrations and makes sure the progress row exists.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = SqliteConnection::establish(
            path.to_str().ok_or("Database path is not valid UTF-8")?,
        )?;
        Self::init(conn)
    }

    /// In-memory database for tests.
    #[cfg(test)]
    pub(crate) fn open_memory() -> Result<Self> {
        Self::init(SqliteConnection::establish(":memory:")?)
    }

    fn init(conn: SqliteConnection) -> Result<Self> {
        embedded_migrations::run(&conn)?;

        // The migration seeds the row; insert-or-ignore heals a database
        // where it has gone missing.
        {
            use crate::schema::progress::dsl::*;
            diesel::insert_or_ignore_into(progress)
                .values((slot.eq(PROGRESS_SLOT), last_comic_id.eq(0)))
                .execute(&conn)?;
        }

        Ok(Self { conn })
    }

    /// Last comic id confirmed archived, 0 if nothing has been archived yet.
    pub fn progress(&self) -> Result<i32> {
        use crate::schema::progress::dsl::*;
        Ok(progress
            .find(PROGRESS_SLOT)
            .select(last_comic_id)
            .first(&self.conn)?)
    }

    /// Advances the progress marker to `id` and stamps the run time.
    /// The update is conditional on the stored value being smaller, so the
    /// marker never moves backward and a lost race is a no-op.
    pub fn advance(&self, id: i32) -> Result<()> {
        use crate::schema::progress::dsl::*;
        let updated = diesel::update(
            progress
                .filter(slot.eq(PROGRESS_SLOT))
                .filter(last_comic_id.lt(id)),
        )
        .set((
            last_comic_id.eq(id),
            last_run_at.eq(chrono::Local::now().naive_local()),
        ))
        .execute(&self.conn)?;

        if updated == 0 {
            log::debug!("Progress marker already at or past {}", id);
        }
        Ok(())
    }

    /// Stamps `last_run_at` without moving the marker. Used when a run had
    /// nothing to do.
    pub fn touch_last_run(&self) -> Result<()> {
        use crate::schema::progress::dsl::*;
        diesel::update(progress.filter(slot.eq(PROGRESS_SLOT)))
            .set(last_run_at.eq(chrono::Local::now().naive_local()))
            .execute(&self.conn)?;
        Ok(())
    }

    pub fn progress_marker(&self) -> Result<ProgressMarker> {
        use crate::schema::progress::dsl::*;
        Ok(progress.find(PROGRESS_SLOT).first(&self.conn)?)
    }

    /// Inserts the record, or overwrites the mutable fields of an existing
    /// record with the same comic id.
    pub fn upsert_comic(&self, rec: &ComicRecord) -> Result<()> {
        use crate::schema::comics::dsl::*;
        self.conn.transaction(|| {
            let existing: i64 = comics
                .filter(comic_id.eq(rec.comic_id))
                .count()
                .get_result(&self.conn)?;

            if existing > 0 {
                diesel::update(comics.find(rec.comic_id))
                    .set((
                        title.eq(&rec.title),
                        news.eq(&rec.news),
                        file_path.eq(&rec.file_path),
                        collected_at.eq(rec.collected_at),
                    ))
                    .execute(&self.conn)?;
            } else {
                diesel::insert_into(comics).values(rec).execute(&self.conn)?;
            }
            Ok(())
        })
    }

    pub fn comic_exists(&self, id: i32) -> Result<bool> {
        use crate::schema::comics::dsl::*;
        let count: i64 = comics
            .filter(comic_id.eq(id))
            .count()
            .get_result(&self.conn)?;
        Ok(count > 0)
    }

    pub fn comic(&self, id: i32) -> Result<Option<ComicRecord>> {
        use crate::schema::comics::dsl::*;
        Ok(comics.find(id).first(&self.conn).optional()?)
    }

    pub fn comic_count(&self) -> Result<i64> {
        use crate::schema::comics::dsl::*;
        Ok(comics.count().get_result(&self.conn)?)
    }
}
