#[cfg(feature = "ssr")]
mod db_impl {
    use crate::models::review::{NewReview, Review};
    use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
    use leptos::logging;
    use leptos::logging::log;
    use rusqlite::types::Type;
    use rusqlite::{params, Connection, Error, OptionalExtension, Row};
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use uuid::Uuid;


    // Store timestamps with the precision the JSON layer exposes so a
    // re-read record compares equal to the one handed out on write.
    fn now() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }

    fn format_timestamp(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn parse_timestamp(row: &Row<'_>, idx: usize) -> Result<DateTime<Utc>, Error> {
        let raw: String = row.get(idx)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    const REVIEW_COLUMNS: &str =
        "id, username, repository, rating, comment, created_at, updated_at, upvotes, downvotes";

    fn review_from_row(row: &Row<'_>) -> Result<Review, Error> {
        Ok(Review {
            id: row.get(0)?,
            username: row.get(1)?,
            repository: row.get(2)?,
            rating: row.get(3)?,
            comment: row.get(4)?,
            created_at: parse_timestamp(row, 5)?,
            updated_at: parse_timestamp(row, 6)?,
            upvotes: row.get(7)?,
            downvotes: row.get(8)?,
        })
    }

    /// SQLite-backed review collection. Cloning shares the same connection.
    #[derive(Debug, Clone)]
    pub struct Database {
        conn: Arc<Mutex<Connection>>,
    }

    impl Database {
        // Create a new database connection
        pub fn new(db_path: &str) -> Result<Self, Error> {
            let conn = Connection::open(db_path)?;
            logging::log!("Database connection established at: {}", db_path);
            Ok(Database {
                conn: Arc::new(Mutex::new(conn)),
            })
        }

        // Create the database schema
        pub async fn create_schema(&self) -> Result<(), Error> {
            let conn = self.conn.lock().await;
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS reviews (
                    id TEXT PRIMARY KEY,
                    username TEXT NOT NULL,
                    repository TEXT NOT NULL,
                    rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                    comment TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    upvotes INTEGER NOT NULL DEFAULT 0,
                    downvotes INTEGER NOT NULL DEFAULT 0
                );",
            )
            .map_err(|e| {
                logging::error!("[DB] Failed creating reviews table: {}", e);
                e
            })?;
            Ok(())
        }

        /// Persists a new review, assigning its id and both timestamps.
        pub async fn insert_review(&self, review: &NewReview) -> Result<Review, Error> {
            let created = now();
            let stored = Review {
                id: Uuid::new_v4().to_string(),
                username: review.username.clone(),
                repository: review.repository.clone(),
                rating: review.rating,
                comment: review.comment.clone(),
                created_at: created,
                updated_at: created,
                upvotes: 0,
                downvotes: 0,
            };

            let conn = self.conn.lock().await;
            conn.execute(
                "INSERT INTO reviews (id, username, repository, rating, comment, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    &stored.id,
                    &stored.username,
                    &stored.repository,
                    stored.rating,
                    &stored.comment,
                    format_timestamp(&stored.created_at),
                    format_timestamp(&stored.updated_at),
                ],
            )?;
            log!("[DB] Review inserted: {}", stored.id);
            Ok(stored)
        }

        // Retrieve all reviews in insertion order
        pub async fn get_reviews(&self) -> Result<Vec<Review>, Error> {
            let conn = self.conn.lock().await;
            let mut stmt = conn.prepare(&format!(
                "SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY rowid ASC"
            ))?;
            let rows = stmt.query_map([], review_from_row)?;
            let mut result = Vec::new();
            for row in rows {
                result.push(row?);
            }
            log!("[DB] Fetched {} reviews", result.len());
            Ok(result)
        }

        pub async fn get_review(&self, id: &str) -> Result<Option<Review>, Error> {
            let conn = self.conn.lock().await;
            conn.query_row(
                &format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?"),
                [id],
                review_from_row,
            )
            .optional()
        }

        /// Writes every mutable field of `review` and moves `updated_at` strictly
        /// past its stored value. Returns `None` if the row no longer exists.
        pub async fn save_review(&self, review: &Review) -> Result<Option<Review>, Error> {
            let mut saved = review.clone();
            saved.updated_at = now().max(review.updated_at + Duration::milliseconds(1));

            let conn = self.conn.lock().await;
            let changed = conn.execute(
                "UPDATE reviews
                SET username = ?, repository = ?, rating = ?, comment = ?, updated_at = ?
                WHERE id = ?",
                params![
                    &saved.username,
                    &saved.repository,
                    saved.rating,
                    &saved.comment,
                    format_timestamp(&saved.updated_at),
                    &saved.id,
                ],
            )?;
            if changed == 0 {
                log!("[DB] Save skipped, review {} no longer exists", saved.id);
                return Ok(None);
            }
            log!("[DB] Review saved: {}", saved.id);
            Ok(Some(saved))
        }

        /// Returns whether a row was removed.
        pub async fn delete_review(&self, id: &str) -> Result<bool, Error> {
            let conn = self.conn.lock().await;
            let deleted = conn.execute("DELETE FROM reviews WHERE id = ?", [id])?;
            log!("[DB] Deleted {} row(s) for review {}", deleted, id);
            Ok(deleted > 0)
        }
    }
}

#[cfg(feature = "ssr")]
pub use db_impl::Database;
