use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use validator::Validate;

use aittea_domain::persona::PersonaRef;
use aittea_domain::repository::{personas, solicitudes};
use aittea_domain::solicitud::{CrearSolicitudInput, EstadoSolicitud, SolicitudAsociacion};

use crate::error::AppError;
use crate::routes::{AppState, PageQuery, populate_ref};

const NO_ENCONTRADA: &str = "Solicitud no encontrada";

fn populate(
    refs: &HashMap<String, PersonaRef>,
    solicitud: &SolicitudAsociacion,
) -> Result<Value, AppError> {
    let mut value =
        serde_json::to_value(solicitud).map_err(|e| AppError::Internal(e.to_string()))?;

    if let Some(obj) = value.as_object_mut() {
        for campo in ["familiar", "usuario"] {
            if let Some(id) = obj.get(campo).and_then(Value::as_str) {
                let populated = populate_ref(refs, id);
                obj.insert(campo.to_string(), populated);
            }
        }
    }

    Ok(value)
}

/// POST /api/solicitudes - the usuario is addressed by DNI.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CrearSolicitudInput>,
) -> Result<(StatusCode, Json<SolicitudAsociacion>), AppError> {
    input.validate()?;

    let usuario = personas::find_usuario_by_dni(&state.pool, &input.dni_usuario)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".into()))?;

    let solicitud = solicitudes::insert(&state.pool, &input.familiar_id, &usuario.id).await?;

    Ok((StatusCode::CREATED, Json(solicitud)))
}

/// GET /api/solicitudes - pendientes only, paginated in memory after the
/// joined-usuario search.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let pendientes = solicitudes::list_pendientes(&state.pool, query.search()).await?;

    let total = pendientes.len() as i64;
    let limit = query.limit();
    let page = query.page();
    let offset = ((page - 1) * limit) as usize;

    let pagina: Vec<&SolicitudAsociacion> =
        pendientes.iter().skip(offset).take(limit as usize).collect();

    let mut ids: Vec<String> = Vec::new();
    for solicitud in &pagina {
        ids.push(solicitud.familiar.clone());
        ids.push(solicitud.usuario.clone());
    }
    ids.sort();
    ids.dedup();

    let refs = personas::refs(&state.pool, &ids).await?;
    let populated: Vec<Value> = pagina
        .iter()
        .map(|s| populate(&refs, s))
        .collect::<Result<_, _>>()?;

    // This listing has no minimum-one-page floor.
    Ok(Json(json!({
        "solicitudes": populated,
        "totalPages": (total + limit - 1) / limit,
        "currentPage": page,
    })))
}

/// PUT /api/solicitudes/{id}/aceptar
///
/// Appends the usuario to the familiar's association set (idempotently) and
/// marks the solicitud aceptada.
pub async fn aceptar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let solicitud = solicitudes::find(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ENCONTRADA.into()))?;

    personas::asociar_usuario(&state.pool, &solicitud.familiar, &solicitud.usuario).await?;
    solicitudes::update_estado(&state.pool, &id, EstadoSolicitud::Aceptada).await?;

    Ok(Json(json!({ "message": "Solicitud aceptada correctamente" })))
}

/// DELETE /api/solicitudes/{id} - rejection deletes the row.
pub async fn rechazar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !solicitudes::delete(&state.pool, &id).await? {
        return Err(AppError::NotFound(NO_ENCONTRADA.into()));
    }

    Ok(Json(json!({ "message": "Solicitud eliminada" })))
}
