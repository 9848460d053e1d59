//! The `eventos` table. Every write of a mutated row goes through
//! [`replace_guarded`], an optimistic-concurrency update keyed on the
//! document version read at fetch time: of two concurrent read-check-write
//! sequences against the same evento, exactly one commits.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::types::Json;

use crate::error::{DomainError, Result};
use crate::evento::{CrearEventoInput, Evento};
use crate::repository::{Pagina, nuevo_id};

pub async fn insert(pool: &SqlitePool, input: CrearEventoInput) -> Result<Evento> {
    let now = Utc::now();
    let evento = Evento {
        id: nuevo_id(),
        nombre: input.nombre,
        descripcion: input.descripcion,
        fecha: input.fecha,
        entradas_totales: input.entradas_totales,
        entradas_disponibles: input.entradas_totales,
        trabajadores_minimos: input.trabajadores_minimos,
        participantes: vec![],
        entradas_solicitadas: vec![],
        creado_por: input.creado_por,
        created_at: now,
        updated_at: now,
        version: 0,
    };

    sqlx::query(
        "INSERT INTO eventos \
         (id, nombre, descripcion, fecha, entradas_totales, entradas_disponibles, \
          trabajadores_minimos, participantes, entradas_solicitadas, creado_por, \
          created_at, updated_at, version) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 0)",
    )
    .bind(&evento.id)
    .bind(&evento.nombre)
    .bind(&evento.descripcion)
    .bind(evento.fecha)
    .bind(evento.entradas_totales)
    .bind(evento.entradas_disponibles)
    .bind(evento.trabajadores_minimos)
    .bind(Json(&evento.participantes))
    .bind(Json(&evento.entradas_solicitadas))
    .bind(&evento.creado_por)
    .bind(evento.created_at)
    .bind(evento.updated_at)
    .execute(pool)
    .await?;

    Ok(evento)
}

pub async fn find(pool: &SqlitePool, id: &str) -> Result<Option<Evento>> {
    Ok(sqlx::query_as("SELECT * FROM eventos WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

pub async fn list(
    pool: &SqlitePool,
    search: Option<&str>,
    pagina: Pagina,
) -> Result<Vec<Evento>> {
    Ok(sqlx::query_as(
        "SELECT * FROM eventos \
         WHERE (?1 IS NULL OR nombre LIKE '%' || ?1 || '%') \
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
        "SELECT COUNT(*) FROM eventos WHERE (?1 IS NULL OR nombre LIKE '%' || ?1 || '%')",
    )
    .bind(search)
    .fetch_one(pool)
    .await?;

    Ok(total)
}

/// Eventos with `desde <= fecha < hasta`, ascending.
pub async fn list_by_rango(
    pool: &SqlitePool,
    desde: DateTime<Utc>,
    hasta: DateTime<Utc>,
) -> Result<Vec<Evento>> {
    Ok(
        sqlx::query_as(
            "SELECT * FROM eventos WHERE fecha >= ?1 AND fecha < ?2 ORDER BY fecha ASC",
        )
        .bind(desde)
        .bind(hasta)
        .fetch_all(pool)
        .await?,
    )
}

/// Persist a mutated document. Fails with Conflict when the stored version
/// no longer matches the fetch-time basis (a concurrent writer won).
pub async fn replace_guarded(pool: &SqlitePool, evento: &Evento) -> Result<Evento> {
    let updated_at = Utc::now();
    let result = sqlx::query(
        "UPDATE eventos SET nombre = ?1, descripcion = ?2, fecha = ?3, \
         entradas_totales = ?4, entradas_disponibles = ?5, trabajadores_minimos = ?6, \
         participantes = ?7, entradas_solicitadas = ?8, updated_at = ?9, \
         version = version + 1 \
         WHERE id = ?10 AND version = ?11",
    )
    .bind(&evento.nombre)
    .bind(&evento.descripcion)
    .bind(evento.fecha)
    .bind(evento.entradas_totales)
    .bind(evento.entradas_disponibles)
    .bind(evento.trabajadores_minimos)
    .bind(Json(&evento.participantes))
    .bind(Json(&evento.entradas_solicitadas))
    .bind(updated_at)
    .bind(&evento.id)
    .bind(evento.version)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DomainError::Conflict(
            "El evento ha sido modificado por otra operación. Inténtalo de nuevo.".into(),
        ));
    }

    let mut committed = evento.clone();
    committed.updated_at = updated_at;
    committed.version += 1;
    Ok(committed)
}

pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM eventos WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
