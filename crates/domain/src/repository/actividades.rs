//! The `actividades` table. Listings filter on name, tipo and usuario
//! membership; membership is checked with `json_each` over the JSON array
//! columns.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::actividad::{
    Actividad, ActualizarActividadInput, CrearActividadInput, FiltroActividades,
};
use crate::error::Result;
use crate::repository::{Pagina, nuevo_id};

pub async fn insert(pool: &SqlitePool, input: CrearActividadInput) -> Result<Actividad> {
    let now = Utc::now();
    let actividad = Actividad {
        id: nuevo_id(),
        nombre: input.nombre,
        fecha: input.fecha,
        realizada_por: input.realizada_por,
        ejecutada_por: input.ejecutada_por,
        tipo_actividad: input.tipo_actividad,
        creada_por: input.creada_por,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO actividades \
         (id, nombre, fecha, realizada_por, ejecutada_por, tipo_actividad, creada_por, \
          created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(&actividad.id)
    .bind(&actividad.nombre)
    .bind(actividad.fecha)
    .bind(Json(&actividad.realizada_por))
    .bind(Json(&actividad.ejecutada_por))
    .bind(&actividad.tipo_actividad)
    .bind(&actividad.creada_por)
    .bind(actividad.created_at)
    .bind(actividad.updated_at)
    .execute(pool)
    .await?;

    Ok(actividad)
}

pub async fn find(pool: &SqlitePool, id: &str) -> Result<Option<Actividad>> {
    Ok(sqlx::query_as("SELECT * FROM actividades WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

fn push_filtro(builder: &mut QueryBuilder<'_, Sqlite>, filtro: &FiltroActividades) {
    if let Some(search) = &filtro.search {
        builder
            .push(" AND nombre LIKE '%' || ")
            .push_bind(search.clone())
            .push(" || '%'");
    }

    if !filtro.tipos.is_empty() {
        builder.push(" AND tipo_actividad IN (");
        {
            let mut separated = builder.separated(", ");
            for tipo in &filtro.tipos {
                separated.push_bind(tipo.clone());
            }
        }
        builder.push(")");
    }

    if let Some(usuario) = &filtro.usuario {
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM json_each(actividades.realizada_por) \
                 WHERE json_each.value = ",
            )
            .push_bind(usuario.clone())
            .push(")");
    }
}

pub async fn list(
    pool: &SqlitePool,
    filtro: &FiltroActividades,
    pagina: Pagina,
) -> Result<Vec<Actividad>> {
    let mut builder = QueryBuilder::new("SELECT * FROM actividades WHERE 1 = 1");
    push_filtro(&mut builder, filtro);
    builder
        .push(" ORDER BY fecha DESC LIMIT ")
        .push_bind(pagina.limit)
        .push(" OFFSET ")
        .push_bind(pagina.offset);

    Ok(builder.build_query_as().fetch_all(pool).await?)
}

pub async fn count(pool: &SqlitePool, filtro: &FiltroActividades) -> Result<i64> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM actividades WHERE 1 = 1");
    push_filtro(&mut builder, filtro);

    let (total,): (i64,) = builder.build_query_as().fetch_one(pool).await?;
    Ok(total)
}

/// Actividades scheduled inside `[desde, hasta)` for a given usuario.
pub async fn list_by_usuario_y_rango(
    pool: &SqlitePool,
    usuario: &str,
    desde: DateTime<Utc>,
    hasta: DateTime<Utc>,
) -> Result<Vec<Actividad>> {
    Ok(sqlx::query_as(
        "SELECT * FROM actividades \
         WHERE fecha >= ?1 AND fecha < ?2 \
           AND EXISTS (SELECT 1 FROM json_each(actividades.realizada_por) \
                       WHERE json_each.value = ?3) \
         ORDER BY fecha ASC",
    )
    .bind(desde)
    .bind(hasta)
    .bind(usuario)
    .fetch_all(pool)
    .await?)
}

/// All actividades scheduled inside `[desde, hasta)` (notifier digests).
pub async fn list_by_rango(
    pool: &SqlitePool,
    desde: DateTime<Utc>,
    hasta: DateTime<Utc>,
) -> Result<Vec<Actividad>> {
    Ok(sqlx::query_as(
        "SELECT * FROM actividades WHERE fecha >= ?1 AND fecha < ?2 ORDER BY fecha ASC",
    )
    .bind(desde)
    .bind(hasta)
    .fetch_all(pool)
    .await?)
}

pub async fn update(
    pool: &SqlitePool,
    id: &str,
    input: ActualizarActividadInput,
) -> Result<Option<Actividad>> {
    let result = sqlx::query(
        "UPDATE actividades SET \
         nombre = ?1, fecha = ?2, realizada_por = ?3, ejecutada_por = ?4, \
         tipo_actividad = ?5, updated_at = ?6 \
         WHERE id = ?7",
    )
    .bind(&input.nombre)
    .bind(input.fecha)
    .bind(Json(&input.realizada_por))
    .bind(Json(&input.ejecutada_por))
    .bind(&input.tipo_actividad)
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
    let result = sqlx::query("DELETE FROM actividades WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
