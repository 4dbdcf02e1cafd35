//! Browser-side calls to the review API.
use crate::api::REVIEWS_PATH;
use crate::models::review::{Review, ReviewInput};
use gloo_net::http::{Request, Response};
use leptos::logging::log;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Network(#[from] gloo_net::Error),
    #[error("server answered {0} {1}")]
    Status(u16, String),
}

fn review_url(id: &str) -> String {
    format!("{REVIEWS_PATH}/{}", urlencoding::encode(id))
}

fn check(response: Response) -> Result<Response, ClientError> {
    if response.ok() {
        Ok(response)
    } else {
        Err(ClientError::Status(response.status(), response.status_text()))
    }
}

pub async fn fetch_reviews() -> Result<Vec<Review>, ClientError> {
    let response = check(Request::get(REVIEWS_PATH).send().await?)?;
    let reviews: Vec<Review> = response.json().await?;
    log!("[CLIENT] Fetched {} reviews", reviews.len());
    Ok(reviews)
}

pub async fn create_review(input: &ReviewInput) -> Result<Review, ClientError> {
    let response = check(Request::post(REVIEWS_PATH).json(input)?.send().await?)?;
    Ok(response.json().await?)
}

pub async fn update_review(id: &str, input: &ReviewInput) -> Result<Review, ClientError> {
    let response = check(Request::put(&review_url(id)).json(input)?.send().await?)?;
    Ok(response.json().await?)
}

pub async fn delete_review(id: &str) -> Result<(), ClientError> {
    check(Request::delete(&review_url(id)).send().await?)?;
    log!("[CLIENT] Deleted review {}", id);
    Ok(())
}
