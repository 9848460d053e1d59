//! The `solicitudes_asociacion` table. A partial unique index keeps at
//! most one pendiente request per (familiar, usuario) pair.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{DomainError, Result};
use crate::repository::{map_unique, nuevo_id};
use crate::solicitud::{EstadoSolicitud, SolicitudAsociacion};

const SOLICITUD_DUPLICADA: &str = "Ya has enviado una solicitud para este usuario.";

pub async fn existe_pendiente(pool: &SqlitePool, familiar: &str, usuario: &str) -> Result<bool> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT id FROM solicitudes_asociacion \
         WHERE familiar = ?1 AND usuario = ?2 AND estado = 'pendiente' LIMIT 1",
    )
    .bind(familiar)
    .bind(usuario)
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

pub async fn insert(
    pool: &SqlitePool,
    familiar: &str,
    usuario: &str,
) -> Result<SolicitudAsociacion> {
    if existe_pendiente(pool, familiar, usuario).await? {
        return Err(DomainError::Conflict(SOLICITUD_DUPLICADA.into()));
    }

    let solicitud = SolicitudAsociacion {
        id: nuevo_id(),
        familiar: familiar.to_owned(),
        usuario: usuario.to_owned(),
        estado: EstadoSolicitud::Pendiente,
        fecha: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO solicitudes_asociacion (id, familiar, usuario, estado, fecha) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(&solicitud.id)
    .bind(&solicitud.familiar)
    .bind(&solicitud.usuario)
    .bind(solicitud.estado)
    .bind(solicitud.fecha)
    .execute(pool)
    .await
    .map_err(|e| map_unique(e, SOLICITUD_DUPLICADA))?;

    Ok(solicitud)
}

pub async fn find(pool: &SqlitePool, id: &str) -> Result<Option<SolicitudAsociacion>> {
    Ok(
        sqlx::query_as("SELECT * FROM solicitudes_asociacion WHERE id = ?1")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Pendientes, newest first, optionally filtered by the joined usuario's
/// nombre/apellido/dni.
pub async fn list_pendientes(
    pool: &SqlitePool,
    search: Option<&str>,
) -> Result<Vec<SolicitudAsociacion>> {
    Ok(sqlx::query_as(
        "SELECT solicitudes_asociacion.* FROM solicitudes_asociacion \
         JOIN personas ON personas.id = solicitudes_asociacion.usuario \
         WHERE solicitudes_asociacion.estado = 'pendiente' \
           AND (?1 IS NULL \
                OR personas.nombre LIKE '%' || ?1 || '%' \
                OR personas.apellido LIKE '%' || ?1 || '%' \
                OR personas.dni LIKE '%' || ?1 || '%') \
         ORDER BY solicitudes_asociacion.fecha DESC",
    )
    .bind(search)
    .fetch_all(pool)
    .await?)
}

pub async fn update_estado(
    pool: &SqlitePool,
    id: &str,
    estado: EstadoSolicitud,
) -> Result<Option<SolicitudAsociacion>> {
    let result = sqlx::query("UPDATE solicitudes_asociacion SET estado = ?1 WHERE id = ?2")
        .bind(estado)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    find(pool, id).await
}

pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM solicitudes_asociacion WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
