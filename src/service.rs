//! Review Service: validates mutations before they reach the store and skips
//! writes that would not change anything.
use crate::db::Database;
use crate::models::review::{Review, ReviewInput};
use crate::validation::{self, ValidationErrors};
use leptos::logging::log;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("review {0} not found")]
    NotFound(String),
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

#[derive(Debug, Clone)]
pub struct ReviewService {
    db: Database,
}

impl ReviewService {
    pub fn new(db: Database) -> Self {
        ReviewService { db }
    }

    /// Every stored review, in no particular order.
    pub async fn list_all(&self) -> Result<Vec<Review>, ServiceError> {
        Ok(self.db.get_reviews().await?)
    }

    pub async fn create(&self, input: &ReviewInput) -> Result<Review, ServiceError> {
        let new_review = validation::validate_new(input)?;
        let review = self.db.insert_review(&new_review).await?;
        log!("[SERVICE] Created review {} for {}", review.id, review.repository);
        Ok(review)
    }

    /// Applies the fields of `input` that differ from the stored review.
    /// Identical submissions return the stored review without a write, so
    /// `updated_at` only moves when something actually changed.
    pub async fn update(&self, id: &str, input: &ReviewInput) -> Result<Review, ServiceError> {
        let existing = self
            .db
            .get_review(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;

        let patch = validation::validate_patch(input)?;
        let mut review = existing.clone();
        if !review.apply(&patch) {
            log!("[SERVICE] Review {} unchanged, skipping write", id);
            return Ok(existing);
        }

        let saved = self
            .db
            .save_review(&review)
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;
        log!("[SERVICE] Updated review {}", id);
        Ok(saved)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        if !self.db.delete_review(id).await? {
            return Err(ServiceError::NotFound(id.to_string()));
        }
        log!("[SERVICE] Deleted review {}", id);
        Ok(())
    }
}
