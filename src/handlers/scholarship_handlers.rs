//! HTTP handlers for the scholarship catalog and the saved-scholarship
//! set. The catalog itself is immutable; saving and unsaving only touch
//! the id set in [`AppState`].

use crate::{
    errors::AppError,
    models::scholarship::{Category, SaveResponse, Scholarship},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

/// Query params accepted by `GET /api/scholarships`.
#[derive(Debug, Deserialize)]
pub struct ScholarshipListQuery {
    pub category: Option<String>,
}

/// List every catalog entry, optionally narrowed to one category.
pub async fn list_scholarships(
    State(state): State<AppState>,
    Query(query): Query<ScholarshipListQuery>,
) -> Result<Json<Vec<Scholarship>>, AppError> {
    match query.category.as_deref() {
        None => Ok(Json(state.catalog.all().to_vec())),
        Some(raw) => {
            let category = Category::parse(raw)
                .ok_or_else(|| AppError::bad_request("Invalid category filter."))?;
            Ok(Json(state.catalog.by_category(category)))
        }
    }
}

/// Fetch one catalog entry by id.
pub async fn get_scholarship(
    State(state): State<AppState>,
    Path(scholarship_id): Path<String>,
) -> Result<Json<Scholarship>, AppError> {
    state
        .catalog
        .by_id(&scholarship_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found("Scholarship not found."))
}

/// List saved entries in catalog order.
pub async fn list_saved_scholarships(
    State(state): State<AppState>,
) -> Result<Json<Vec<Scholarship>>, AppError> {
    let saved = state.saved();
    let entries = state
        .catalog
        .all()
        .iter()
        .filter(|entry| saved.contains(&entry.id))
        .cloned()
        .collect();
    Ok(Json(entries))
}

/// Mark a catalog entry as saved. Saving twice is fine.
pub async fn save_scholarship(
    State(state): State<AppState>,
    Path(scholarship_id): Path<String>,
) -> Result<Json<SaveResponse>, AppError> {
    if !state.catalog.contains(&scholarship_id) {
        return Err(AppError::not_found("Scholarship not found."));
    }
    state.saved().insert(scholarship_id.clone());
    Ok(Json(SaveResponse {
        success: true,
        scholarship_id,
    }))
}

/// Drop an entry from the saved set.
pub async fn remove_saved_scholarship(
    State(state): State<AppState>,
    Path(scholarship_id): Path<String>,
) -> Result<Json<SaveResponse>, AppError> {
    if state.saved().remove(&scholarship_id) {
        Ok(Json(SaveResponse {
            success: true,
            scholarship_id,
        }))
    } else {
        Err(AppError::not_found("Scholarship not saved."))
    }
}
