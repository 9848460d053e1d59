use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use validator::Validate;

use aittea_domain::persona::{ActualizarFamiliarInput, CrearFamiliarInput, Familiar, Kind};
use aittea_domain::repository::personas;

use crate::error::AppError;
use crate::routes::AppState;

const NO_ENCONTRADO: &str = "Familiar no encontrado";

/// GET /api/familiares - plain array, no pagination.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Familiar>>, AppError> {
    Ok(Json(personas::list_familiares(&state.pool).await?))
}

/// POST /api/familiares
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CrearFamiliarInput>,
) -> Result<Json<Value>, AppError> {
    input.validate().map_err(|_| {
        AppError::Validation("Todos los campos obligatorios deben ser proporcionados".into())
    })?;

    let familiar = personas::insert_familiar(&state.pool, input).await?;
    Ok(Json(json!({ "message": "Familiar creado", "familiar": familiar })))
}

/// GET /api/familiares/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Familiar>, AppError> {
    let familiar = personas::find_familiar(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ENCONTRADO.into()))?;

    Ok(Json(familiar))
}

/// PUT /api/familiares/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ActualizarFamiliarInput>,
) -> Result<Json<Value>, AppError> {
    input.validate()?;

    let familiar = personas::update_familiar(&state.pool, &id, input)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ENCONTRADO.into()))?;

    Ok(Json(json!({ "message": "Familiar actualizado", "familiar": familiar })))
}

/// DELETE /api/familiares/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !personas::delete(&state.pool, &id, Kind::Familiar).await? {
        return Err(AppError::NotFound(NO_ENCONTRADO.into()));
    }

    Ok(Json(json!({ "message": "Familiar eliminado" })))
}
