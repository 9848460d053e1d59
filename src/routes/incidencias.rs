use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::{Value, json};
use validator::Validate;

use aittea_domain::incidencia::{ActualizarIncidenciaInput, CrearIncidenciaInput, Incidencia};
use aittea_domain::persona::PersonaRef;
use aittea_domain::repository::{Pagina, incidencias, personas, total_pages};

use crate::error::AppError;
use crate::routes::{AppState, PageQuery, populate_ref};

const NO_ENCONTRADA: &str = "Incidencia no encontrada";

fn populate(refs: &HashMap<String, PersonaRef>, incidencia: &Incidencia) -> Result<Value, AppError> {
    let mut value =
        serde_json::to_value(incidencia).map_err(|e| AppError::Internal(e.to_string()))?;

    if let Some(obj) = value.as_object_mut() {
        for campo in ["usuario", "creadaPor"] {
            if let Some(id) = obj.get(campo).and_then(Value::as_str) {
                let populated = populate_ref(refs, id);
                obj.insert(campo.to_string(), populated);
            }
        }
    }

    Ok(value)
}

async fn populate_all(state: &AppState, items: &[Incidencia]) -> Result<Vec<Value>, AppError> {
    let mut ids: Vec<String> = Vec::new();
    for incidencia in items {
        ids.push(incidencia.usuario.clone());
        ids.push(incidencia.creada_por.clone());
    }
    ids.sort();
    ids.dedup();

    let refs = personas::refs(&state.pool, &ids).await?;
    items.iter().map(|i| populate(&refs, i)).collect()
}

/// GET /api/incidencias
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let pagina = Pagina::new(query.page(), query.limit());
    let items = incidencias::list(&state.pool, query.search(), pagina).await?;
    let total = incidencias::count(&state.pool, query.search()).await?;
    let populated = populate_all(&state, &items).await?;

    Ok(Json(json!({
        "incidencias": populated,
        "totalIncidencias": total,
        "totalPages": total_pages(total, query.limit()),
        "currentPage": query.page(),
    })))
}

/// POST /api/incidencias
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CrearIncidenciaInput>,
) -> Result<Json<Value>, AppError> {
    input
        .validate()
        .map_err(|_| AppError::Validation("Faltan campos obligatorios".into()))?;

    let incidencia = incidencias::insert(&state.pool, input).await?;
    let populated = populate_all(&state, std::slice::from_ref(&incidencia)).await?;

    Ok(Json(json!({
        "message": "Incidencia creada correctamente",
        "incidencia": populated.into_iter().next().unwrap_or(Value::Null),
    })))
}

/// GET /api/incidencias/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let incidencia = incidencias::find(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ENCONTRADA.into()))?;

    let populated = populate_all(&state, std::slice::from_ref(&incidencia)).await?;
    Ok(Json(populated.into_iter().next().unwrap_or(Value::Null)))
}

/// PUT /api/incidencias/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ActualizarIncidenciaInput>,
) -> Result<Json<Value>, AppError> {
    let incidencia = incidencias::update(&state.pool, &id, input)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ENCONTRADA.into()))?;

    let populated = populate_all(&state, std::slice::from_ref(&incidencia)).await?;
    Ok(Json(json!({
        "message": "Incidencia actualizada",
        "incidencia": populated.into_iter().next().unwrap_or(Value::Null),
    })))
}

/// DELETE /api/incidencias/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !incidencias::delete(&state.pool, &id).await? {
        return Err(AppError::NotFound(NO_ENCONTRADA.into()));
    }

    Ok(Json(json!({ "message": "Incidencia eliminada" })))
}
