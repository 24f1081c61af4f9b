//! Buch (catalogue) endpoints

use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{
        header::{ETAG, IF_MATCH, IF_NONE_MATCH, LOCATION},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::{
    error::{AppError, AppResult, CreateError, UpdateError},
    models::Buch,
};

/// Path of the collection resource, used for `Location` headers
pub const BUECHER_PATH: &str = "/api/v1/buecher";

fn etag(version: i32) -> String {
    format!("\"{}\"", version)
}

/// Strip optional weak marker and surrounding quotes from an entity tag
fn unquote(tag: &str) -> &str {
    let tag = tag.trim();
    let tag = tag.strip_prefix("W/").unwrap_or(tag);
    tag.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(tag)
}

/// Search books by query parameters; no parameters lists every book
pub async fn find_buecher(
    State(state): State<crate::AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Vec<Buch>>> {
    let buecher = state.services.buecher.find(&params).await?;
    Ok(Json(buecher))
}

/// Get a book by ID, honouring `If-None-Match`
pub async fn get_buch(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let buch = state
        .services
        .buecher
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Es gibt kein Buch mit der ID {}", id)))?;

    let tag = etag(buch.version);
    let not_modified = headers
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| unquote(v) == unquote(&tag));
    if not_modified {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let mut response = Json(buch).into_response();
    if let Ok(value) = HeaderValue::from_str(&tag) {
        response.headers_mut().insert(ETAG, value);
    }
    Ok(response)
}

/// Create a new book
pub async fn create_buch(
    State(state): State<crate::AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, Response> {
    let Json(candidate) = payload.map_err(|e| AppError::from(e).into_response())?;
    let id = state
        .services
        .buecher
        .create(&candidate)
        .await
        .map_err(CreateError::into_response)?;

    let mut response = StatusCode::CREATED.into_response();
    if let Ok(location) = HeaderValue::from_str(&format!("{}/{}", BUECHER_PATH, id)) {
        response.headers_mut().insert(LOCATION, location);
    }
    Ok(response)
}

/// Replace a book; the expected version is taken from `If-Match`
pub async fn update_buch(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, Response> {
    let Some(if_match) = headers.get(IF_MATCH) else {
        return Err(AppError::PreconditionRequired(
            "Header \"If-Match\" fehlt".to_string(),
        )
        .into_response());
    };
    let version = match if_match.to_str() {
        Ok(v) => unquote(v).to_string(),
        Err(_) => {
            return Err(UpdateError::VersionInvalid("<non-ascii>".to_string()).into_response())
        }
    };
    let Json(candidate) = payload.map_err(|e| AppError::from(e).into_response())?;

    let new_version = state
        .services
        .buecher
        .update(&candidate, &id, &version)
        .await
        .map_err(IntoResponse::into_response)?;

    let mut response = StatusCode::NO_CONTENT.into_response();
    if let Ok(value) = HeaderValue::from_str(&etag(new_version)) {
        response.headers_mut().insert(ETAG, value);
    }
    Ok(response)
}

/// Delete a book; succeeds whether or not the book existed
pub async fn delete_buch(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let deleted = state.services.buecher.delete(&id).await?;
    if !deleted {
        tracing::debug!("delete_buch: nothing deleted for id={}", id);
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"3\""), "3");
        assert_eq!(unquote("W/\"3\""), "3");
        assert_eq!(unquote("3"), "3");
        assert_eq!(unquote(" \"0\" "), "0");
    }
}
