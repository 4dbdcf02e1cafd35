//! Field rules for reviews.
//!
//! Two layers share the same error type: the store rules the server enforces
//! on every write, and the stricter form rules the front end checks before a
//! request leaves the browser.
use crate::models::review::{NewReview, ReviewDraft, ReviewInput, ReviewPatch};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;
pub const USERNAME_MIN: usize = 3;
pub const COMMENT_MIN: usize = 10;

static REPOSITORY_RE: OnceLock<Regex> = OnceLock::new();

fn repository_regex() -> &'static Regex {
    REPOSITORY_RE.get_or_init(|| {
        Regex::new("^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$")
            .unwrap_or_else(|error| panic!("repository regex failed to compile: {error}"))
    })
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Username,
    Repository,
    Rating,
    Comment,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Username => "username",
            Field::Repository => "repository",
            Field::Rating => "rating",
            Field::Comment => "comment",
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// Every failing field of one submission, in field order.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, field: Field, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("review validation failed: ")?;
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", error.field.as_str(), error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

fn required(errors: &mut ValidationErrors, field: Field, value: Option<&str>) -> Option<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            errors.push(field, format!("{} is required", field.as_str()));
            None
        }
    }
}

fn rating_in_range(errors: &mut ValidationErrors, rating: i64) -> Option<u8> {
    match u8::try_from(rating) {
        Ok(r) if (RATING_MIN..=RATING_MAX).contains(&rating) => Some(r),
        _ => {
            errors.push(
                Field::Rating,
                format!("rating ({rating}) must be between {RATING_MIN} and {RATING_MAX}"),
            );
            None
        }
    }
}

fn normalize_comment(comment: Option<&str>) -> Option<String> {
    comment
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// Store rules for a create: username, repository and rating are required.
pub fn validate_new(input: &ReviewInput) -> Result<NewReview, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let username = required(&mut errors, Field::Username, input.username.as_deref());
    let repository = required(&mut errors, Field::Repository, input.repository.as_deref());
    let rating = match input.rating {
        Some(r) => rating_in_range(&mut errors, r),
        None => {
            errors.push(Field::Rating, "rating is required");
            None
        }
    };

    match (username, repository, rating) {
        (Some(username), Some(repository), Some(rating)) => errors.into_result(NewReview {
            username,
            repository,
            rating,
            comment: normalize_comment(input.comment.as_deref()),
        }),
        _ => Err(errors),
    }
}

/// Store rules for a partial update: only the fields present are checked.
pub fn validate_patch(input: &ReviewInput) -> Result<ReviewPatch, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let username = input
        .username
        .as_deref()
        .and_then(|u| required(&mut errors, Field::Username, Some(u)));
    let repository = input
        .repository
        .as_deref()
        .and_then(|r| required(&mut errors, Field::Repository, Some(r)));
    let rating = input.rating.and_then(|r| rating_in_range(&mut errors, r));

    errors.into_result(ReviewPatch {
        username,
        repository,
        rating,
        comment: normalize_comment(input.comment.as_deref()),
    })
}

/// Form rules, checked in the browser before any request is made.
pub fn validate_draft(draft: &ReviewDraft) -> Result<ReviewInput, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let username = draft.username.trim();
    if username.chars().count() < USERNAME_MIN {
        errors.push(
            Field::Username,
            format!("Username must be at least {USERNAME_MIN} characters."),
        );
    }

    let repository = draft.repository.trim();
    if !repository_regex().is_match(repository) {
        errors.push(Field::Repository, "Repository must be in format owner/repo.");
    }

    let rating = i64::from(draft.rating);
    if !(RATING_MIN..=RATING_MAX).contains(&rating) {
        errors.push(
            Field::Rating,
            format!("Rating must be between {RATING_MIN} and {RATING_MAX}."),
        );
    }

    let comment = draft.comment.trim();
    if !comment.is_empty() && comment.chars().count() < COMMENT_MIN {
        errors.push(
            Field::Comment,
            format!("Comment must be at least {COMMENT_MIN} characters."),
        );
    }

    errors.into_result(ReviewInput {
        username: Some(username.to_string()),
        repository: Some(repository.to_string()),
        rating: Some(rating),
        comment: normalize_comment(Some(comment)),
    })
}
