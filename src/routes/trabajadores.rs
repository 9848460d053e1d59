use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use aittea_domain::persona::{
    ActualizarTrabajadorInput, CrearTrabajadorInput, Kind, TipoTrabajador, Trabajador,
};
use aittea_domain::repository::personas;

use crate::error::AppError;
use crate::routes::AppState;

const NO_ENCONTRADO: &str = "Trabajador no encontrado";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub tipo: Option<String>,
}

/// GET /api/trabajadores - optional `?tipo=Auxiliar|Tecnico` filter.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Trabajador>>, AppError> {
    let tipo = match query.tipo.as_deref().filter(|t| !t.is_empty()) {
        Some(raw) => Some(raw.parse::<TipoTrabajador>().map_err(|_| {
            AppError::Validation("Tipo de trabajador no válido".into())
        })?),
        None => None,
    };

    Ok(Json(personas::list_trabajadores(&state.pool, tipo).await?))
}

/// POST /api/trabajadores
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CrearTrabajadorInput>,
) -> Result<Json<Value>, AppError> {
    input.validate().map_err(|_| {
        AppError::Validation("Todos los campos obligatorios deben ser proporcionados".into())
    })?;

    let trabajador = personas::insert_trabajador(&state.pool, input).await?;
    Ok(Json(json!({ "message": "Trabajador creado", "trabajador": trabajador })))
}

/// GET /api/trabajadores/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Trabajador>, AppError> {
    let trabajador = personas::find_trabajador(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ENCONTRADO.into()))?;

    Ok(Json(trabajador))
}

/// PUT /api/trabajadores/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ActualizarTrabajadorInput>,
) -> Result<Json<Value>, AppError> {
    input.validate()?;

    let trabajador = personas::update_trabajador(&state.pool, &id, input)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ENCONTRADO.into()))?;

    Ok(Json(json!({ "message": "Trabajador actualizado", "trabajador": trabajador })))
}

/// DELETE /api/trabajadores/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !personas::delete(&state.pool, &id, Kind::Trabajador).await? {
        return Err(AppError::NotFound(NO_ENCONTRADO.into()));
    }

    Ok(Json(json!({ "message": "Trabajador eliminado" })))
}
