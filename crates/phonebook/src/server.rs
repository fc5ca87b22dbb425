use crate::contacts::cache::CachedContactRepository;
use crate::contacts::repository::SqliteContactRepository;
use crate::contacts::service::ContactService;
use crate::prelude::{eprintln, println, *};
use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use phonebook_core::contact::{Contact, ContactUpdate, NewContact};
use phonebook_core::country::CountryCode;
use phonebook_core::pagination::Page;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, clap::Args)]
pub struct ServeOptions {
    /// Port to listen on
    #[arg(short, long, env = "PHONEBOOK_PORT", default_value = "3000")]
    port: u16,

    /// Host to bind to
    #[arg(long, env = "PHONEBOOK_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Path to the SQLite database file
    #[arg(long, env = "PHONEBOOK_DB", default_value = "phonebook.db3")]
    db: std::path::PathBuf,

    /// Country applied when a create request omits countryCode
    #[arg(long, env = "PHONEBOOK_DEFAULT_COUNTRY", default_value = "IL")]
    default_country: CountryCode,

    /// Disable the in-process read-through cache
    #[arg(long, env = "PHONEBOOK_NO_CACHE", default_value = "false")]
    no_cache: bool,
}

#[derive(Clone)]
struct AppState {
    service: Arc<ContactService>,
}

pub async fn run(options: ServeOptions, global: crate::Global) -> Result<()> {
    use axum::routing::get;
    use tower_http::cors::{Any, CorsLayer};

    if global.verbose {
        eprintln!("Opening contact database at {}...", options.db.display());
    }

    let repository = SqliteContactRepository::open(&options.db)
        .map_err(|e| eyre!("Failed to open database at {}: {}", options.db.display(), e))?;

    let service = if options.no_cache {
        ContactService::new(Arc::new(repository), options.default_country)
    } else {
        ContactService::new(
            Arc::new(CachedContactRepository::new(repository)),
            options.default_country,
        )
    };

    let state = AppState {
        service: Arc::new(service),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app_router = axum::Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route("/contacts/search", get(search_contacts))
        .route(
            "/contacts/{id}",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", options.host, options.port);

    if global.verbose {
        eprintln!("Phonebook listening on http://{addr}");
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;

    axum::serve(listener, app_router)
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    Ok(())
}

#[derive(Debug, Deserialize)]
struct PageParams {
    page: Option<i64>,
    size: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(rename = "searchTerm")]
    search_term: String,
    page: Option<i64>,
    size: Option<i64>,
}

async fn list_contacts(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<Contact>>, ApiError> {
    state
        .service
        .list(params.page.unwrap_or(0), params.size.unwrap_or(10))
        .map(Json)
        .map_err(|error| ApiError::new(error, uri.path()))
}

async fn get_contact(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
) -> Result<Json<Contact>, ApiError> {
    state
        .service
        .get(id)
        .map(Json)
        .map_err(|error| ApiError::new(error, uri.path()))
}

async fn create_contact(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Json(request): Json<NewContact>,
) -> Result<Json<Contact>, ApiError> {
    state
        .service
        .create(&request)
        .map(Json)
        .map_err(|error| ApiError::new(error, uri.path()))
}

async fn update_contact(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
    Json(request): Json<ContactUpdate>,
) -> Result<Json<Contact>, ApiError> {
    state
        .service
        .update(id, &request)
        .map(Json)
        .map_err(|error| ApiError::new(error, uri.path()))
}

async fn delete_contact(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .delete(id)
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(|error| ApiError::new(error, uri.path()))
}

async fn search_contacts(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<SearchParams>,
) -> Result<Json<Page<Contact>>, ApiError> {
    state
        .service
        .search(
            &params.search_term,
            params.page.unwrap_or(0),
            params.size.unwrap_or(10),
        )
        .map(Json)
        .map_err(|error| ApiError::new(error, uri.path()))
}

/// A domain error bound to the request path it occurred on.
struct ApiError {
    error: Error,
    path: String,
}

impl ApiError {
    fn new(error: Error, path: &str) -> Self {
        Self {
            error,
            path: path.to_string(),
        }
    }
}

/// Uniform error body returned by every endpoint.
#[derive(Debug, Serialize)]
struct ErrorBody {
    status: u16,
    error: String,
    message: String,
    path: String,
    timestamp: String,
}

/// Map a domain error to its HTTP status and response body. Internal errors
/// keep their detail out of the body; callers get a generic message while the
/// cause is logged server-side.
fn error_body(error: &Error, path: &str) -> (StatusCode, ErrorBody) {
    let (status, label, message) = match error {
        Error::BadRequest(message) => (StatusCode::BAD_REQUEST, "Bad Request", message.clone()),
        Error::NotFound(message) => (StatusCode::NOT_FOUND, "Not Found", message.clone()),
        Error::Conflict(message) => (StatusCode::BAD_REQUEST, "Conflict", message.clone()),
        Error::Internal(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "An unexpected error occurred".to_string(),
        ),
    };

    let body = ErrorBody {
        status: status.as_u16(),
        error: label.to_string(),
        message,
        path: path.to_string(),
        timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    };

    (status, body)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.error {
            Error::Internal(detail) => {
                log::error!("An unexpected error occurred on {}: {detail}", self.path)
            }
            other => log::error!("Request to {} failed: {other}", self.path),
        }

        let (status, body) = error_body(&self.error, &self.path);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_body() {
        let (status, body) = error_body(
            &Error::BadRequest("The input phone number is not valid".to_string()),
            "/contacts",
        );

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.status, 400);
        assert_eq!(body.error, "Bad Request");
        assert_eq!(body.message, "The input phone number is not valid");
        assert_eq!(body.path, "/contacts");
    }

    #[test]
    fn test_not_found_body() {
        let (status, body) = error_body(
            &Error::NotFound("Contact not found with id: 42".to_string()),
            "/contacts/42",
        );

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Not Found");
        assert_eq!(body.message, "Contact not found with id: 42");
    }

    #[test]
    fn test_conflict_maps_to_bad_request_status() {
        let (status, body) = error_body(
            &Error::Conflict("Data restriction error: duplicate".to_string()),
            "/contacts",
        );

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Conflict");
    }

    #[test]
    fn test_internal_error_keeps_detail_out_of_the_body() {
        let (status, body) = error_body(
            &Error::Internal("disk I/O error at offset 4096".to_string()),
            "/contacts",
        );

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal Server Error");
        assert_eq!(body.message, "An unexpected error occurred");
        assert!(!body.message.contains("disk"));
    }

    #[test]
    fn test_timestamp_format() {
        let (_, body) = error_body(&Error::NotFound("missing".to_string()), "/contacts/1");

        // yyyy-MM-dd HH:mm:ss
        assert_eq!(body.timestamp.len(), 19);
        assert_eq!(&body.timestamp[4..5], "-");
        assert_eq!(&body.timestamp[10..11], " ");
        assert_eq!(&body.timestamp[13..14], ":");
    }

    #[test]
    fn test_error_body_serializes_expected_shape() {
        let (_, body) = error_body(&Error::NotFound("missing".to_string()), "/contacts/1");
        let json = serde_json::to_value(&body).unwrap();

        for key in ["status", "error", "message", "path", "timestamp"] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
    }
}
