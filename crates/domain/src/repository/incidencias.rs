//! The `incidencias` table. The paginated listing searches across the
//! incident type and the names of the usuario involved and the author.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::incidencia::{ActualizarIncidenciaInput, CrearIncidenciaInput, Incidencia};
use crate::repository::{Pagina, nuevo_id};

pub async fn insert(pool: &SqlitePool, input: CrearIncidenciaInput) -> Result<Incidencia> {
    let now = Utc::now();
    let incidencia = Incidencia {
        id: nuevo_id(),
        fecha: input.fecha,
        tipo_incidencia: input.tipo_incidencia,
        descripcion: input.descripcion,
        usuario: input.usuario,
        creada_por: input.creada_por,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO incidencias \
         (id, fecha, tipo_incidencia, descripcion, usuario, creada_por, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(&incidencia.id)
    .bind(incidencia.fecha)
    .bind(incidencia.tipo_incidencia)
    .bind(&incidencia.descripcion)
    .bind(&incidencia.usuario)
    .bind(&incidencia.creada_por)
    .bind(incidencia.created_at)
    .bind(incidencia.updated_at)
    .execute(pool)
    .await?;

    Ok(incidencia)
}

pub async fn find(pool: &SqlitePool, id: &str) -> Result<Option<Incidencia>> {
    Ok(sqlx::query_as("SELECT * FROM incidencias WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

pub async fn list(
    pool: &SqlitePool,
    search: Option<&str>,
    pagina: Pagina,
) -> Result<Vec<Incidencia>> {
    Ok(sqlx::query_as(
        "SELECT incidencias.* FROM incidencias \
         LEFT JOIN personas u ON u.id = incidencias.usuario \
         LEFT JOIN personas c ON c.id = incidencias.creada_por \
         WHERE (?1 IS NULL \
                OR incidencias.tipo_incidencia LIKE '%' || ?1 || '%' \
                OR u.nombre LIKE '%' || ?1 || '%' \
                OR u.apellido LIKE '%' || ?1 || '%' \
                OR c.nombre LIKE '%' || ?1 || '%' \
                OR c.apellido LIKE '%' || ?1 || '%') \
         ORDER BY incidencias.fecha DESC \
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
        "SELECT COUNT(*) FROM incidencias \
         LEFT JOIN personas u ON u.id = incidencias.usuario \
         LEFT JOIN personas c ON c.id = incidencias.creada_por \
         WHERE (?1 IS NULL \
                OR incidencias.tipo_incidencia LIKE '%' || ?1 || '%' \
                OR u.nombre LIKE '%' || ?1 || '%' \
                OR u.apellido LIKE '%' || ?1 || '%' \
                OR c.nombre LIKE '%' || ?1 || '%' \
                OR c.apellido LIKE '%' || ?1 || '%')",
    )
    .bind(search)
    .fetch_one(pool)
    .await?;

    Ok(total)
}

/// All incidencias recorded inside `[desde, hasta)` (notifier digests).
pub async fn list_by_rango(
    pool: &SqlitePool,
    desde: DateTime<Utc>,
    hasta: DateTime<Utc>,
) -> Result<Vec<Incidencia>> {
    Ok(sqlx::query_as(
        "SELECT * FROM incidencias WHERE fecha >= ?1 AND fecha < ?2 ORDER BY fecha ASC",
    )
    .bind(desde)
    .bind(hasta)
    .fetch_all(pool)
    .await?)
}

pub async fn update(
    pool: &SqlitePool,
    id: &str,
    input: ActualizarIncidenciaInput,
) -> Result<Option<Incidencia>> {
    let result = sqlx::query(
        "UPDATE incidencias SET \
         fecha = ?1, tipo_incidencia = ?2, descripcion = ?3, usuario = ?4, updated_at = ?5 \
         WHERE id = ?6",
    )
    .bind(input.fecha)
    .bind(input.tipo_incidencia)
    .bind(&input.descripcion)
    .bind(&input.usuario)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    find(pool, id).await
}

pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM incidencias WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
