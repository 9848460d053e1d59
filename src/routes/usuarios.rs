use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use aittea_domain::persona::{CrearUsuarioInput, Kind, Usuario};
use aittea_domain::repository::{Pagina, personas};

use crate::error::AppError;
use crate::routes::AppState;

const NO_ENCONTRADO: &str = "Usuario no encontrado";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub grupo_trabajo: Option<i64>,
}

/// GET /api/usuarios
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).max(1);

    let usuarios =
        personas::list_usuarios(&state.pool, query.grupo_trabajo, Pagina::new(page, limit))
            .await?;
    let total = personas::count_usuarios(&state.pool, query.grupo_trabajo).await?;

    Ok(Json(json!({
        "usuarios": usuarios,
        "totalUsuarios": total,
        // This listing has no minimum-one-page floor.
        "totalPages": (total + limit - 1) / limit,
        "currentPage": page,
    })))
}

/// POST /api/usuarios
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CrearUsuarioInput>,
) -> Result<Json<Value>, AppError> {
    input.validate()?;
    let usuario = personas::insert_usuario(&state.pool, input).await?;
    Ok(Json(json!({ "message": "Usuario creado", "usuario": usuario })))
}

/// GET /api/usuarios/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Usuario>, AppError> {
    let usuario = personas::find_usuario(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ENCONTRADO.into()))?;

    Ok(Json(usuario))
}

/// PUT /api/usuarios/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CrearUsuarioInput>,
) -> Result<Json<Value>, AppError> {
    input.validate()?;

    let usuario = personas::update_usuario(&state.pool, &id, input)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_ENCONTRADO.into()))?;

    // The update envelope keys the record as "user", unlike the create.
    Ok(Json(json!({ "message": "Usuario actualizado", "user": usuario })))
}

/// DELETE /api/usuarios/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !personas::delete(&state.pool, &id, Kind::Usuario).await? {
        return Err(AppError::NotFound(NO_ENCONTRADO.into()));
    }

    Ok(Json(json!({ "message": "Usuario eliminado" })))
}
