use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use aittea_domain::actividad::{
    Actividad, ActualizarActividadInput, CrearActividadInput, FiltroActividades,
};
use aittea_domain::persona::PersonaRef;
use aittea_domain::repository::{Pagina, actividades, personas, total_pages};

use crate::error::AppError;
use crate::routes::{AppState, populate_ref};

const NO_ENCONTRADA: &str = "Actividad no encontrada";

fn populate(refs: &HashMap<String, PersonaRef>, actividad: &Actividad) -> Result<Value, AppError> {
    let mut value =
        serde_json::to_value(actividad).map_err(|e| AppError::Internal(e.to_string()))?;

    if let Some(obj) = value.as_object_mut() {
        if let Some(id) = obj.get("creadaPor").and_then(Value::as_str) {
            let populated = populate_ref(refs, id);
            obj.insert("creadaPor".to_string(), populated);
        }
        for campo in ["realizadaPor", "ejecutadaPor"] {
            if let Some(lista) = obj.get_mut(campo).and_then(Value::as_array_mut) {
                for item in lista.iter_mut() {
                    if let Some(id) = item.as_str() {
                        *item = populate_ref(refs, id);
                    }
                }
            }
        }
    }

    Ok(value)
}

async fn populate_all(state: &AppState, items: &[Actividad]) -> Result<Vec<Value>, AppError> {
    let mut ids: Vec<String> = Vec::new();
    for actividad in items {
        ids.push(actividad.creada_por.clone());
        ids.extend(actividad.realizada_por.iter().cloned());
        ids.extend(actividad.ejecutada_por.iter().cloned());
    }
    ids.sort();
    ids.dedup();

    let refs = personas::refs(&state.pool, &ids).await?;
    items.iter().map(|a| populate(&refs, a)).collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    /// Comma-separated TipoActividad ids.
    pub tipos: Option<String>,
    pub usuario_id: Option<String>,
}

impl ListQuery {
    fn filtro(&self) -> FiltroActividades {
        FiltroActividades {
            search: self.search.clone().filter(|s| !s.is_empty()),
            tipos: self
                .tipos
                .as_deref()
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_owned)
                        .collect()
                })
                .unwrap_or_default(),
            usuario: None,
        }
    }

    fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).max(1)
    }
}

async fn listado(
    state: &AppState,
    filtro: &FiltroActividades,
    page: i64,
    limit: i64,
) -> Result<Json<Value>, AppError> {
    let items = actividades::list(&state.pool, filtro, Pagina::new(page, limit)).await?;
    let total = actividades::count(&state.pool, filtro).await?;
    let populated = populate_all(state, &items).await?;

    Ok(Json(json!({
        "actividades": populated,
        "totalActividades": total,
        "totalPages": total_pages(total, limit),
        "currentPage": page,
    })))
}

/// GET /api/actividades
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let filtro = query.filtro();
    listado(&state, &filtro, query.page(), query.limit()).await
}

/// GET /api/actividades/usuario - same listing restricted to one usuario.
pub async fn list_usuario(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let usuario = query
        .usuario_id
        .clone()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::Validation("Falta el parámetro usuarioId".into()))?;

    let mut filtro = query.filtro();
    filtro.usuario = Some(usuario);
    listado(&state, &filtro, query.page(), query.limit()).await
}

#[derive(Debug, Deserialize)]
pub struct PorMesQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// GET /api/actividades/por-usuario/{id}
pub async fn por_usuario_mes(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PorMesQuery>,
) -> Result<Json<Value>, AppError> {
    let (year, month) = match (query.year, query.month) {
        (Some(year), Some(month)) if (1..=12).contains(&month) => (year, month),
        _ => {
            return Err(AppError::Validation(
                "Faltan parámetros de año o mes".into(),
            ));
        }
    };

    let desde = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| AppError::Validation("Fecha inválida".into()))?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let hasta = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| AppError::Validation("Fecha inválida".into()))?;

    let items = actividades::list_by_usuario_y_rango(&state.pool, &id, desde, hasta).await?;
    let populated = populate_all(&state, &items).await?;

    Ok(Json(Value::Array(populated)))
}

/// POST /api/actividades
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CrearActividadInput>,
) -> Result<Json<Value>, AppError> {
    input
        .validate()
        .map_err(|_| AppError::Validation("Faltan campos obligatorios".into()))?;

    let actividad = actividades::insert(&state.pool, input).await?;
    let populated = populate_all(&state, std::slice::from_ref(&actividad)).await?;

    Ok(Json(json!({
        "message": "Actividad creada correctamente",
        "actividad": populated.into_iter().next().unwrap_or(Value::Null),
    })))
}

/// GET /api/actividades/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let actividad = actividades::find(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ENCONTRADA.into()))?;

    let populated = populate_all(&state, std::slice::from_ref(&actividad)).await?;
    Ok(Json(populated.into_iter().next().unwrap_or(Value::Null)))
}

/// PUT /api/actividades/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ActualizarActividadInput>,
) -> Result<Json<Value>, AppError> {
    let actividad = actividades::update(&state.pool, &id, input)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ENCONTRADA.into()))?;

    let populated = populate_all(&state, std::slice::from_ref(&actividad)).await?;
    Ok(Json(json!({
        "message": "Actividad actualizada",
        "actividad": populated.into_iter().next().unwrap_or(Value::Null),
    })))
}

/// DELETE /api/actividades/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !actividades::delete(&state.pool, &id).await? {
        return Err(AppError::NotFound(NO_ENCONTRADA.into()));
    }

    Ok(Json(json!({ "message": "Actividad eliminada" })))
}
