//! The `asistencias` table. Creation is duplicate-guarded per
//! (usuario, calendar day); a unique index on the day prefix backstops the
//! guard against concurrent creates.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::asistencia::{ActualizarAsistenciaInput, Asistencia, CrearAsistenciaInput};
use crate::error::{DomainError, Result};
use crate::repository::{Pagina, map_unique, nuevo_id};

const FALTA_DUPLICADA: &str = "Ya hay una falta para este usuario en ese día.";

/// True when the usuario already has a record on the same ISO calendar day.
pub async fn existe_para_dia(
    pool: &SqlitePool,
    usuario: &str,
    fecha: DateTime<Utc>,
) -> Result<bool> {
    let dia = fecha.format("%Y-%m-%d").to_string();
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT id FROM asistencias \
         WHERE usuario = ?1 AND substr(fecha, 1, 10) = ?2 LIMIT 1",
    )
    .bind(usuario)
    .bind(dia)
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

pub async fn insert(pool: &SqlitePool, input: CrearAsistenciaInput) -> Result<Asistencia> {
    if existe_para_dia(pool, &input.usuario, input.fecha).await? {
        return Err(DomainError::Conflict(FALTA_DUPLICADA.into()));
    }

    let now = Utc::now();
    let asistencia = Asistencia {
        id: nuevo_id(),
        fecha: input.fecha,
        presente: input.presente,
        justificada: input.justificada,
        descripcion: input.descripcion,
        usuario: input.usuario,
        justificada_por: input.justificada_por,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO asistencias \
         (id, fecha, presente, justificada, descripcion, usuario, justificada_por, \
          created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(&asistencia.id)
    .bind(asistencia.fecha)
    .bind(asistencia.presente)
    .bind(asistencia.justificada)
    .bind(&asistencia.descripcion)
    .bind(&asistencia.usuario)
    .bind(&asistencia.justificada_por)
    .bind(asistencia.created_at)
    .bind(asistencia.updated_at)
    .execute(pool)
    .await
    .map_err(|e| map_unique(e, FALTA_DUPLICADA))?;

    Ok(asistencia)
}

pub async fn find(pool: &SqlitePool, id: &str) -> Result<Option<Asistencia>> {
    Ok(sqlx::query_as("SELECT * FROM asistencias WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

pub async fn list(
    pool: &SqlitePool,
    search: Option<&str>,
    pagina: Pagina,
) -> Result<Vec<Asistencia>> {
    Ok(sqlx::query_as(
        "SELECT * FROM asistencias \
         WHERE (?1 IS NULL OR descripcion LIKE '%' || ?1 || '%') \
         ORDER BY fecha DESC \
         LIMIT ?2 OFFSET ?3",
    )
    .bind(search)
    .bind(pagina.limit)
    .bind(pagina.offset)
    .fetch_all(pool)
    .await?)
}

pub async fn count(pool: &SqlitePool, search: Option<&str>) -> Result<i64> {
    let (total,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM asistencias WHERE (?1 IS NULL OR descripcion LIKE '%' || ?1 || '%')",
    )
    .bind(search)
    .fetch_one(pool)
    .await?;

    Ok(total)
}

pub async fn list_by_usuario(pool: &SqlitePool, usuario: &str) -> Result<Vec<Asistencia>> {
    Ok(
        sqlx::query_as("SELECT * FROM asistencias WHERE usuario = ?1 ORDER BY fecha DESC")
            .bind(usuario)
            .fetch_all(pool)
            .await?,
    )
}

/// Partial update; absent fields keep their stored value.
pub async fn update(
    pool: &SqlitePool,
    id: &str,
    input: ActualizarAsistenciaInput,
) -> Result<Option<Asistencia>> {
    let result = sqlx::query(
        "UPDATE asistencias SET \
         fecha = COALESCE(?1, fecha), \
         presente = COALESCE(?2, presente), \
         justificada = COALESCE(?3, justificada), \
         descripcion = COALESCE(?4, descripcion), \
         usuario = COALESCE(?5, usuario), \
         justificada_por = COALESCE(?6, justificada_por), \
         updated_at = ?7 \
         WHERE id = ?8",
    )
    .bind(input.fecha)
    .bind(input.presente)
    .bind(input.justificada)
    .bind(&input.descripcion)
    .bind(&input.usuario)
    .bind(&input.justificada_por)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| map_unique(e, FALTA_DUPLICADA))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    find(pool, id).await
}
