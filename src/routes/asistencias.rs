use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use validator::Validate;

use aittea_domain::asistencia::{ActualizarAsistenciaInput, Asistencia, CrearAsistenciaInput};
use aittea_domain::persona::PersonaRef;
use aittea_domain::repository::{Pagina, asistencias, personas};

use crate::error::AppError;
use crate::routes::{AppState, PageQuery, populate_ref};

const NO_ENCONTRADA: &str = "Asistencia no encontrada";

fn populate(refs: &HashMap<String, PersonaRef>, asistencia: &Asistencia) -> Result<Value, AppError> {
    let mut value =
        serde_json::to_value(asistencia).map_err(|e| AppError::Internal(e.to_string()))?;

    if let Some(obj) = value.as_object_mut() {
        if let Some(id) = obj.get("usuario").and_then(Value::as_str) {
            let populated = populate_ref(refs, id);
            obj.insert("usuario".to_string(), populated);
        }
        if let Some(id) = obj.get("justificadaPor").and_then(Value::as_str) {
            let populated = populate_ref(refs, id);
            obj.insert("justificadaPor".to_string(), populated);
        }
    }

    Ok(value)
}

async fn populate_all(state: &AppState, items: &[Asistencia]) -> Result<Vec<Value>, AppError> {
    let mut ids: Vec<String> = Vec::new();
    for asistencia in items {
        ids.push(asistencia.usuario.clone());
        if let Some(justificada_por) = &asistencia.justificada_por {
            ids.push(justificada_por.clone());
        }
    }
    ids.sort();
    ids.dedup();

    let refs = personas::refs(&state.pool, &ids).await?;
    items.iter().map(|a| populate(&refs, a)).collect()
}

/// POST /api/asistencias
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CrearAsistenciaInput>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    input.validate()?;

    let asistencia = asistencias::insert(&state.pool, input).await?;
    let populated = populate_all(&state, std::slice::from_ref(&asistencia)).await?;

    Ok((
        StatusCode::CREATED,
        Json(populated.into_iter().next().unwrap_or(Value::Null)),
    ))
}

/// GET /api/asistencias - this listing's shape is `{total, asistencias}`.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let pagina = Pagina::new(query.page(), query.limit());
    let items = asistencias::list(&state.pool, query.search(), pagina).await?;
    let total = asistencias::count(&state.pool, query.search()).await?;
    let populated = populate_all(&state, &items).await?;

    Ok(Json(json!({
        "total": total,
        "asistencias": populated,
    })))
}

/// GET /api/asistencias/usuario/{usuario_id}
pub async fn by_usuario(
    State(state): State<AppState>,
    Path(usuario_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let items = asistencias::list_by_usuario(&state.pool, &usuario_id).await?;
    let populated = populate_all(&state, &items).await?;

    Ok(Json(Value::Array(populated)))
}

/// GET /api/asistencias/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let asistencia = asistencias::find(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ENCONTRADA.into()))?;

    let populated = populate_all(&state, std::slice::from_ref(&asistencia)).await?;
    Ok(Json(populated.into_iter().next().unwrap_or(Value::Null)))
}

/// PUT /api/asistencias/{id} - partial update.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ActualizarAsistenciaInput>,
) -> Result<Json<Value>, AppError> {
    let asistencia = asistencias::update(&state.pool, &id, input)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ENCONTRADA.into()))?;

    let populated = populate_all(&state, std::slice::from_ref(&asistencia)).await?;
    Ok(Json(populated.into_iter().next().unwrap_or(Value::Null)))
}
