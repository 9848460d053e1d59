use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use aittea_domain::evento::{ActualizarEventoInput, CrearEventoInput, Evento};
use aittea_domain::persona::PersonaRef;
use aittea_domain::repository::{Pagina, eventos, personas, total_pages};

use crate::error::AppError;
use crate::routes::{AppState, PageQuery, populate_ref};

const NO_ENCONTRADO: &str = "Evento no encontrado";

/// Replace stored persona ids with `{id, nombre, apellido}` references in
/// the serialized evento.
fn populate(refs: &HashMap<String, PersonaRef>, evento: &Evento) -> Result<Value, AppError> {
    let mut value = serde_json::to_value(evento).map_err(|e| AppError::Internal(e.to_string()))?;

    if let Some(obj) = value.as_object_mut() {
        if let Some(creado_por) = obj.get("creadoPor").and_then(Value::as_str) {
            let populated = populate_ref(refs, creado_por);
            obj.insert("creadoPor".to_string(), populated);
        }
        if let Some(participantes) = obj.get_mut("participantes").and_then(Value::as_array_mut) {
            for participante in participantes.iter_mut() {
                if let Some(id) = participante.as_str() {
                    *participante = populate_ref(refs, id);
                }
            }
        }
        if let Some(solicitadas) = obj
            .get_mut("entradasSolicitadas")
            .and_then(Value::as_array_mut)
        {
            for entrada in solicitadas.iter_mut() {
                if let Some(entrada_obj) = entrada.as_object_mut() {
                    if let Some(id) = entrada_obj.get("usuario").and_then(Value::as_str) {
                        let populated = populate_ref(refs, id);
                        entrada_obj.insert("usuario".to_string(), populated);
                    }
                }
            }
        }
    }

    Ok(value)
}

/// Persona ids referenced by a set of eventos, deduplicated.
fn ref_ids(eventos: &[Evento]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for evento in eventos {
        ids.push(evento.creado_por.clone());
        ids.extend(evento.participantes.iter().cloned());
        ids.extend(evento.entradas_solicitadas.iter().map(|e| e.usuario.clone()));
    }
    ids.sort();
    ids.dedup();
    ids
}

async fn populate_all(state: &AppState, items: &[Evento]) -> Result<Vec<Value>, AppError> {
    let refs = personas::refs(&state.pool, &ref_ids(items)).await?;
    items.iter().map(|e| populate(&refs, e)).collect()
}

/// GET /api/eventos
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let pagina = Pagina::new(query.page(), query.limit());
    let items = eventos::list(&state.pool, query.search(), pagina).await?;
    let total = eventos::count(&state.pool, query.search()).await?;
    let populated = populate_all(&state, &items).await?;

    Ok(Json(json!({
        "eventos": populated,
        "totalEventos": total,
        "totalPages": total_pages(total, query.limit()),
        "currentPage": query.page(),
    })))
}

/// GET /api/eventos/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let evento = eventos::find(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ENCONTRADO.into()))?;

    let populated = populate_all(&state, std::slice::from_ref(&evento)).await?;
    Ok(Json(populated.into_iter().next().unwrap_or(Value::Null)))
}

/// POST /api/eventos
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CrearEventoInput>,
) -> Result<Json<Value>, AppError> {
    input
        .validate()
        .map_err(|_| AppError::Validation("Faltan campos obligatorios".into()))?;

    let evento = eventos::insert(&state.pool, input).await?;
    let populated = populate_all(&state, std::slice::from_ref(&evento)).await?;

    Ok(Json(json!({
        "message": "Evento creado correctamente",
        "evento": populated.into_iter().next().unwrap_or(Value::Null),
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticiparInput {
    pub trabajador_id: String,
}

/// POST /api/eventos/{id}/participar
pub async fn participar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ParticiparInput>,
) -> Result<Json<Value>, AppError> {
    let mut evento = eventos::find(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ENCONTRADO.into()))?;

    evento.participar(&input.trabajador_id)?;
    let evento = eventos::replace_guarded(&state.pool, &evento).await?;

    let populated = populate_all(&state, std::slice::from_ref(&evento)).await?;
    Ok(Json(json!({
        "message": "Participación registrada",
        "evento": populated.into_iter().next().unwrap_or(Value::Null),
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolicitarEntradasInput {
    #[serde(default)]
    pub usuario_id: String,
    #[serde(default)]
    pub cantidad: i64,
}

/// POST /api/eventos/{id}/entradas
pub async fn solicitar_entradas(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<SolicitarEntradasInput>,
) -> Result<Json<Value>, AppError> {
    let mut evento = eventos::find(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ENCONTRADO.into()))?;

    evento.solicitar_entradas(&input.usuario_id, input.cantidad)?;
    let evento = eventos::replace_guarded(&state.pool, &evento).await?;

    let populated = populate_all(&state, std::slice::from_ref(&evento)).await?;
    Ok(Json(json!({
        "message": "Entradas solicitadas correctamente",
        "evento": populated.into_iter().next().unwrap_or(Value::Null),
    })))
}

/// PUT /api/eventos/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ActualizarEventoInput>,
) -> Result<Json<Value>, AppError> {
    let mut evento = eventos::find(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ENCONTRADO.into()))?;

    evento.actualizar(input)?;
    let evento = eventos::replace_guarded(&state.pool, &evento).await?;

    let populated = populate_all(&state, std::slice::from_ref(&evento)).await?;
    Ok(Json(json!({
        "message": "Evento actualizado correctamente",
        "evento": populated.into_iter().next().unwrap_or(Value::Null),
    })))
}

/// DELETE /api/eventos/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !eventos::delete(&state.pool, &id).await? {
        return Err(AppError::NotFound(NO_ENCONTRADO.into()));
    }

    Ok(Json(json!({ "message": "Evento eliminado correctamente" })))
}

#[derive(Debug, Deserialize)]
pub struct PorMesQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// GET /api/eventos/por-mes/listado
pub async fn por_mes(
    State(state): State<AppState>,
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

    let items = eventos::list_by_rango(&state.pool, desde, hasta).await?;
    let populated = populate_all(&state, &items).await?;

    Ok(Json(Value::Array(populated)))
}
