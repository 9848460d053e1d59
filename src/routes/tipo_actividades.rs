use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::{Value, json};
use validator::Validate;

use aittea_domain::repository::{Pagina, tipo_actividades, total_pages};
use aittea_domain::tipo_actividad::{TipoActividad, TipoActividadInput};

use crate::error::AppError;
use crate::routes::{AppState, PageQuery};

const NO_ENCONTRADO: &str = "Tipo de actividad no encontrado";
const CAMPOS_OBLIGATORIOS: &str = "Los campos 'nombreTipo' y 'duracion' son obligatorios";

/// GET /api/tipo-actividades
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let pagina = Pagina::new(query.page(), query.limit());
    let items = tipo_actividades::list(&state.pool, query.search(), pagina).await?;
    let total = tipo_actividades::count(&state.pool, query.search()).await?;

    Ok(Json(json!({
        "tipoActividades": items,
        "totalTipoActividades": total,
        "totalPages": total_pages(total, query.limit()),
        "currentPage": query.page(),
    })))
}

/// POST /api/tipo-actividades
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<TipoActividadInput>,
) -> Result<Json<Value>, AppError> {
    input
        .validate()
        .map_err(|_| AppError::Validation(CAMPOS_OBLIGATORIOS.into()))?;

    let tipo = tipo_actividades::insert(&state.pool, input).await?;
    Ok(Json(json!({
        "message": "Tipo de actividad creado",
        "tipoActividad": tipo,
    })))
}

/// GET /api/tipo-actividades/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TipoActividad>, AppError> {
    let tipo = tipo_actividades::find(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ENCONTRADO.into()))?;

    Ok(Json(tipo))
}

/// PUT /api/tipo-actividades/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<TipoActividadInput>,
) -> Result<Json<Value>, AppError> {
    input
        .validate()
        .map_err(|_| AppError::Validation(CAMPOS_OBLIGATORIOS.into()))?;

    let tipo = tipo_actividades::update(&state.pool, &id, input)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ENCONTRADO.into()))?;

    Ok(Json(json!({
        "message": "Tipo de actividad actualizado",
        "tipoActividad": tipo,
    })))
}

/// DELETE /api/tipo-actividades/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !tipo_actividades::delete(&state.pool, &id).await? {
        return Err(AppError::NotFound(NO_ENCONTRADO.into()));
    }

    Ok(Json(json!({ "message": "Tipo de actividad eliminado" })))
}
