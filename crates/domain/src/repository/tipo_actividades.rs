//! The activity type catalog.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::repository::{Pagina, nuevo_id};
use crate::tipo_actividad::{TipoActividad, TipoActividadInput};

pub async fn insert(pool: &SqlitePool, input: TipoActividadInput) -> Result<TipoActividad> {
    let now = Utc::now();
    let tipo = TipoActividad {
        id: nuevo_id(),
        nombre_tipo: input.nombre_tipo,
        descripcion: input.descripcion,
        duracion: input.duracion,
        materiales: input.materiales,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO tipo_actividades \
         (id, nombre_tipo, descripcion, duracion, materiales, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(&tipo.id)
    .bind(&tipo.nombre_tipo)
    .bind(&tipo.descripcion)
    .bind(tipo.duracion)
    .bind(&tipo.materiales)
    .bind(tipo.created_at)
    .bind(tipo.updated_at)
    .execute(pool)
    .await?;

    Ok(tipo)
}

pub async fn find(pool: &SqlitePool, id: &str) -> Result<Option<TipoActividad>> {
    Ok(sqlx::query_as("SELECT * FROM tipo_actividades WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

pub async fn list(
    pool: &SqlitePool,
    search: Option<&str>,
    pagina: Pagina,
) -> Result<Vec<TipoActividad>> {
    Ok(sqlx::query_as(
        "SELECT * FROM tipo_actividades \
         WHERE (?1 IS NULL \
                OR nombre_tipo LIKE '%' || ?1 || '%' \
                OR descripcion LIKE '%' || ?1 || '%' \
                OR materiales LIKE '%' || ?1 || '%') \
         ORDER BY nombre_tipo ASC \
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
        "SELECT COUNT(*) FROM tipo_actividades \
         WHERE (?1 IS NULL \
                OR nombre_tipo LIKE '%' || ?1 || '%' \
                OR descripcion LIKE '%' || ?1 || '%' \
                OR materiales LIKE '%' || ?1 || '%')",
    )
    .bind(search)
    .fetch_one(pool)
    .await?;

    Ok(total)
}

pub async fn update(
    pool: &SqlitePool,
    id: &str,
    input: TipoActividadInput,
) -> Result<Option<TipoActividad>> {
    let result = sqlx::query(
        "UPDATE tipo_actividades SET \
         nombre_tipo = ?1, descripcion = ?2, duracion = ?3, materiales = ?4, updated_at = ?5 \
         WHERE id = ?6",
    )
    .bind(&input.nombre_tipo)
    .bind(&input.descripcion)
    .bind(input.duracion)
    .bind(&input.materiales)
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
    let result = sqlx::query("DELETE FROM tipo_actividades WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
