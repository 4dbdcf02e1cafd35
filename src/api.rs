#[cfg(feature = "ssr")]
use crate::models::review::ReviewInput;
#[cfg(feature = "ssr")]
use crate::service::{ReviewService, ServiceError};
#[cfg(feature = "ssr")]
use actix_web::{error::InternalError, http::StatusCode, web, HttpResponse};
#[cfg(feature = "ssr")]
use leptos::logging::{error, log};
#[cfg(feature = "ssr")]
use serde_json::json;

/// Mount point of the review resource, shared with the browser client.
pub const REVIEWS_PATH: &str = "/api/reviews";

/// Registers the review routes on an app or scope.
#[cfg(feature = "ssr")]
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(json!({ "message": err.to_string() }));
        InternalError::from_response(err, response).into()
    }))
    .service(
        web::scope(REVIEWS_PATH)
            .route("", web::get().to(get_reviews)) // GET /api/reviews
            .route("", web::post().to(create_review)) // POST /api/reviews
            .route("/", web::get().to(get_reviews)) // GET /api/reviews/
            .route("/", web::post().to(create_review)) // POST /api/reviews/
            .route("/{id}", web::put().to(update_review)) // PUT /api/reviews/{id}
            .route("/{id}", web::delete().to(delete_review)), // DELETE /api/reviews/{id}
    );
}

// `store_status` differs per endpoint: reads and deletes report store failures
// as 500, while creates and updates fold them into 400.
#[cfg(feature = "ssr")]
fn error_response(err: &ServiceError, store_status: StatusCode) -> HttpResponse {
    match err {
        ServiceError::Validation(errors) => HttpResponse::BadRequest().json(json!({
            "message": err.to_string(),
            "errors": errors,
        })),
        ServiceError::NotFound(_) => {
            HttpResponse::NotFound().json(json!({ "message": "Review not found" }))
        }
        ServiceError::Store(_) => {
            HttpResponse::build(store_status).json(json!({ "message": err.to_string() }))
        }
    }
}

#[cfg(feature = "ssr")]
pub async fn get_reviews(service: web::Data<ReviewService>) -> HttpResponse {
    match service.list_all().await {
        Ok(reviews) => {
            log!("[API] Returning {} reviews", reviews.len());
            HttpResponse::Ok().json(reviews)
        }
        Err(err) => {
            error!("[API] Failed to fetch reviews: {:?}", err);
            error_response(&err, StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[cfg(feature = "ssr")]
pub async fn create_review(
    service: web::Data<ReviewService>,
    input: web::Json<ReviewInput>,
) -> HttpResponse {
    match service.create(&input).await {
        Ok(review) => {
            log!("[API] Created review {}", review.id);
            HttpResponse::Created().json(review)
        }
        Err(err) => {
            error!("[API] Failed to create review: {}", err);
            error_response(&err, StatusCode::BAD_REQUEST)
        }
    }
}

#[cfg(feature = "ssr")]
pub async fn update_review(
    service: web::Data<ReviewService>,
    id: web::Path<String>,
    input: web::Json<ReviewInput>,
) -> HttpResponse {
    match service.update(&id, &input).await {
        Ok(review) => {
            log!("[API] Update of review {} answered", review.id);
            HttpResponse::Ok().json(review)
        }
        Err(err) => {
            error!("[API] Failed to update review {}: {}", id, err);
            error_response(&err, StatusCode::BAD_REQUEST)
        }
    }
}

#[cfg(feature = "ssr")]
pub async fn delete_review(
    service: web::Data<ReviewService>,
    id: web::Path<String>,
) -> HttpResponse {
    match service.delete(&id).await {
        Ok(()) => {
            log!("[API] Deleted review {}", id);
            HttpResponse::Ok().json(json!({ "message": "Review deleted successfully" }))
        }
        Err(err) => {
            error!("[API] Failed to delete review {}: {}", id, err);
            error_response(&err, StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
