// src/models/review.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A persisted code review. Serialized in the camelCase shape the front end consumes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,           // Opaque id assigned by the store
    pub username: String,     // Who submitted the review
    pub repository: String,   // Repository being reviewed, `owner/repo`
    pub rating: u8,           // 1..=5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    // Reserved counters, never written by any operation yet.
    #[serde(default)]
    pub upvotes: u32,
    #[serde(default)]
    pub downvotes: u32,
}

impl Review {
    /// Applies every field of `patch` that differs from the current value.
    /// Returns `true` when at least one field changed.
    pub fn apply(&mut self, patch: &ReviewPatch) -> bool {
        let mut modified = false;

        if let Some(username) = &patch.username {
            if *username != self.username {
                self.username = username.clone();
                modified = true;
            }
        }
        if let Some(repository) = &patch.repository {
            if *repository != self.repository {
                self.repository = repository.clone();
                modified = true;
            }
        }
        if let Some(rating) = patch.rating {
            if rating != self.rating {
                self.rating = rating;
                modified = true;
            }
        }
        if let Some(comment) = &patch.comment {
            if self.comment.as_ref() != Some(comment) {
                self.comment = Some(comment.clone());
                modified = true;
            }
        }

        modified
    }

    pub fn was_edited(&self) -> bool {
        self.updated_at != self.created_at
    }
}

/// Raw POST/PUT body. Every field is optional so missing or out-of-range
/// values are reported as validation errors instead of decoding failures.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Validated payload for creating a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub username: String,
    pub repository: String,
    pub rating: u8,
    pub comment: Option<String>,
}

/// Validated partial update; `None` means "leave untouched".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPatch {
    pub username: Option<String>,
    pub repository: Option<String>,
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

/// What the review form currently holds. A rating of 0 means "not chosen yet".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewDraft {
    pub username: String,
    pub repository: String,
    pub rating: u8,
    pub comment: String,
}

impl ReviewDraft {
    pub fn from_review(review: &Review) -> Self {
        ReviewDraft {
            username: review.username.clone(),
            repository: review.repository.clone(),
            rating: review.rating,
            comment: review.comment.clone().unwrap_or_default(),
        }
    }
}

/// Sort keys offered by the list view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Highest,
    Lowest,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::Newest,
        SortOrder::Oldest,
        SortOrder::Highest,
        SortOrder::Lowest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::Highest => "highest",
            SortOrder::Lowest => "lowest",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Newest => "Newest",
            SortOrder::Oldest => "Oldest",
            SortOrder::Highest => "Highest Rating",
            SortOrder::Lowest => "Lowest Rating",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort order: {0}")]
pub struct UnknownSortOrder(pub String);

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .into_iter()
            .find(|order| order.as_str() == s)
            .ok_or_else(|| UnknownSortOrder(s.to_string()))
    }
}
