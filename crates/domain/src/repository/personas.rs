//! The `personas` table: usuarios, familiares and trabajadores share one
//! table discriminated by `kind`, so the email-uniqueness domain
//! (Familiar ∪ Trabajador) is covered by a single partial unique index.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::types::Json;

use crate::error::{DomainError, Result};
use crate::password;
use crate::persona::{
    ActualizarFamiliarInput, ActualizarTrabajadorInput, CrearFamiliarInput, CrearTrabajadorInput,
    CrearUsuarioInput, Familiar, Kind, Persona, PersonaRef, TipoTrabajador, Trabajador, Usuario,
};
use crate::repository::{Pagina, map_unique, nuevo_id, placeholders};

const EMAIL_EN_USO: &str = "El email ya está registrado";
const DNI_EN_USO: &str = "El DNI ya está registrado";

/// True when another persona (of any kind) already holds this email.
pub async fn email_en_uso(
    pool: &SqlitePool,
    email: &str,
    excluir: Option<&str>,
) -> Result<bool> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT id FROM personas WHERE email = ?1 AND (?2 IS NULL OR id != ?2) LIMIT 1",
    )
    .bind(email)
    .bind(excluir)
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

pub async fn insert_usuario(pool: &SqlitePool, input: CrearUsuarioInput) -> Result<Usuario> {
    let now = Utc::now();
    let usuario = Usuario {
        id: nuevo_id(),
        nombre: input.nombre,
        apellido: input.apellido,
        telefono: input.telefono,
        dni: input.dni,
        fecha_nacimiento: input.fecha_nacimiento,
        tipo_autismo: input.tipo_autismo,
        grado_autismo: input.grado_autismo,
        grupo_trabajo: input.grupo_trabajo,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO personas \
         (id, kind, nombre, apellido, telefono, dni, fecha_nacimiento, tipo_autismo, \
          grado_autismo, grupo_trabajo, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )
    .bind(&usuario.id)
    .bind(Kind::Usuario)
    .bind(&usuario.nombre)
    .bind(&usuario.apellido)
    .bind(usuario.telefono)
    .bind(&usuario.dni)
    .bind(usuario.fecha_nacimiento)
    .bind(usuario.tipo_autismo)
    .bind(usuario.grado_autismo)
    .bind(usuario.grupo_trabajo)
    .bind(usuario.created_at)
    .bind(usuario.updated_at)
    .execute(pool)
    .await
    .map_err(|e| map_unique(e, DNI_EN_USO))?;

    Ok(usuario)
}

pub async fn find_usuario(pool: &SqlitePool, id: &str) -> Result<Option<Usuario>> {
    Ok(
        sqlx::query_as("SELECT * FROM personas WHERE id = ?1 AND kind = 'Usuario'")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn find_usuario_by_dni(pool: &SqlitePool, dni: &str) -> Result<Option<Usuario>> {
    Ok(
        sqlx::query_as("SELECT * FROM personas WHERE dni = ?1 AND kind = 'Usuario'")
            .bind(dni)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn list_usuarios(
    pool: &SqlitePool,
    grupo_trabajo: Option<i64>,
    pagina: Pagina,
) -> Result<Vec<Usuario>> {
    Ok(sqlx::query_as(
        "SELECT * FROM personas \
         WHERE kind = 'Usuario' AND (?1 IS NULL OR grupo_trabajo = ?1) \
         LIMIT ?2 OFFSET ?3",
    )
    .bind(grupo_trabajo)
    .bind(pagina.limit)
    .bind(pagina.offset)
    .fetch_all(pool)
    .await?)
}

pub async fn count_usuarios(pool: &SqlitePool, grupo_trabajo: Option<i64>) -> Result<i64> {
    let (total,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM personas \
         WHERE kind = 'Usuario' AND (?1 IS NULL OR grupo_trabajo = ?1)",
    )
    .bind(grupo_trabajo)
    .fetch_one(pool)
    .await?;

    Ok(total)
}

pub async fn update_usuario(
    pool: &SqlitePool,
    id: &str,
    input: CrearUsuarioInput,
) -> Result<Option<Usuario>> {
    let result = sqlx::query(
        "UPDATE personas SET nombre = ?1, apellido = ?2, telefono = ?3, dni = ?4, \
         fecha_nacimiento = ?5, tipo_autismo = ?6, grado_autismo = ?7, grupo_trabajo = ?8, \
         updated_at = ?9 \
         WHERE id = ?10 AND kind = 'Usuario'",
    )
    .bind(&input.nombre)
    .bind(&input.apellido)
    .bind(input.telefono)
    .bind(&input.dni)
    .bind(input.fecha_nacimiento)
    .bind(input.tipo_autismo)
    .bind(input.grado_autismo)
    .bind(input.grupo_trabajo)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| map_unique(e, DNI_EN_USO))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    find_usuario(pool, id).await
}

pub async fn insert_familiar(pool: &SqlitePool, input: CrearFamiliarInput) -> Result<Familiar> {
    if email_en_uso(pool, &input.email, None).await? {
        return Err(DomainError::Conflict(EMAIL_EN_USO.into()));
    }

    let now = Utc::now();
    let familiar = Familiar {
        id: nuevo_id(),
        nombre: input.nombre,
        apellido: input.apellido,
        telefono: input.telefono,
        dni: input.dni,
        tipo_de_relacion_con_usuario: input.tipo_de_relacion_con_usuario,
        email: input.email,
        contrasena: password::hash(&input.contrasena)?,
        usuarios_asociados: vec![],
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO personas \
         (id, kind, nombre, apellido, telefono, dni, tipo_de_relacion_con_usuario, email, \
          contrasena, usuarios_asociados, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )
    .bind(&familiar.id)
    .bind(Kind::Familiar)
    .bind(&familiar.nombre)
    .bind(&familiar.apellido)
    .bind(familiar.telefono)
    .bind(&familiar.dni)
    .bind(&familiar.tipo_de_relacion_con_usuario)
    .bind(&familiar.email)
    .bind(&familiar.contrasena)
    .bind(Json(&familiar.usuarios_asociados))
    .bind(familiar.created_at)
    .bind(familiar.updated_at)
    .execute(pool)
    .await
    .map_err(|e| map_unique(e, EMAIL_EN_USO))?;

    Ok(familiar)
}

pub async fn find_familiar(pool: &SqlitePool, id: &str) -> Result<Option<Familiar>> {
    Ok(
        sqlx::query_as("SELECT * FROM personas WHERE id = ?1 AND kind = 'Familiar'")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn find_familiar_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Familiar>> {
    Ok(
        sqlx::query_as("SELECT * FROM personas WHERE email = ?1 AND kind = 'Familiar'")
            .bind(email)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn list_familiares(pool: &SqlitePool) -> Result<Vec<Familiar>> {
    Ok(
        sqlx::query_as("SELECT * FROM personas WHERE kind = 'Familiar' ORDER BY created_at")
            .fetch_all(pool)
            .await?,
    )
}

pub async fn update_familiar(
    pool: &SqlitePool,
    id: &str,
    input: ActualizarFamiliarInput,
) -> Result<Option<Familiar>> {
    if find_familiar(pool, id).await?.is_none() {
        return Ok(None);
    }

    // Keeping one's own email is fine; taking another record's is not.
    if email_en_uso(pool, &input.email, Some(id)).await? {
        return Err(DomainError::Conflict(EMAIL_EN_USO.into()));
    }

    let contrasena = match input.contrasena.as_deref() {
        Some(plain) if !plain.is_empty() => Some(password::hash(plain)?),
        _ => None,
    };

    sqlx::query(
        "UPDATE personas SET nombre = ?1, apellido = ?2, telefono = ?3, dni = ?4, \
         tipo_de_relacion_con_usuario = ?5, email = ?6, \
         contrasena = COALESCE(?7, contrasena), updated_at = ?8 \
         WHERE id = ?9 AND kind = 'Familiar'",
    )
    .bind(&input.nombre)
    .bind(&input.apellido)
    .bind(input.telefono)
    .bind(&input.dni)
    .bind(&input.tipo_de_relacion_con_usuario)
    .bind(&input.email)
    .bind(contrasena)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| map_unique(e, EMAIL_EN_USO))?;

    find_familiar(pool, id).await
}

/// Familiares whose associated-usuario set contains the given usuario.
pub async fn familiares_de_usuario(pool: &SqlitePool, usuario_id: &str) -> Result<Vec<Familiar>> {
    Ok(sqlx::query_as(
        "SELECT * FROM personas \
         WHERE kind = 'Familiar' AND EXISTS ( \
             SELECT 1 FROM json_each(personas.usuarios_asociados) \
             WHERE json_each.value = ?1)",
    )
    .bind(usuario_id)
    .fetch_all(pool)
    .await?)
}

/// Idempotent append to a familiar's associated-usuario set.
pub async fn asociar_usuario(pool: &SqlitePool, familiar_id: &str, usuario_id: &str) -> Result<()> {
    let Some(mut familiar) = find_familiar(pool, familiar_id).await? else {
        return Err(DomainError::NotFound("Familiar no encontrado".into()));
    };

    if familiar.usuarios_asociados.iter().any(|u| u == usuario_id) {
        return Ok(());
    }

    familiar.usuarios_asociados.push(usuario_id.to_owned());

    sqlx::query(
        "UPDATE personas SET usuarios_asociados = ?1, updated_at = ?2 \
         WHERE id = ?3 AND kind = 'Familiar'",
    )
    .bind(Json(&familiar.usuarios_asociados))
    .bind(Utc::now())
    .bind(familiar_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn insert_trabajador(
    pool: &SqlitePool,
    input: CrearTrabajadorInput,
) -> Result<Trabajador> {
    if email_en_uso(pool, &input.email, None).await? {
        return Err(DomainError::Conflict(EMAIL_EN_USO.into()));
    }

    let now = Utc::now();
    let trabajador = Trabajador {
        id: nuevo_id(),
        nombre: input.nombre,
        apellido: input.apellido,
        telefono: input.telefono,
        dni: input.dni,
        fecha_incorporacion: input.fecha_incorporacion,
        email: input.email,
        contrasena: password::hash(&input.contrasena)?,
        tipo: input.tipo,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO personas \
         (id, kind, nombre, apellido, telefono, dni, fecha_incorporacion, email, contrasena, \
          tipo, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )
    .bind(&trabajador.id)
    .bind(Kind::Trabajador)
    .bind(&trabajador.nombre)
    .bind(&trabajador.apellido)
    .bind(trabajador.telefono)
    .bind(&trabajador.dni)
    .bind(trabajador.fecha_incorporacion)
    .bind(&trabajador.email)
    .bind(&trabajador.contrasena)
    .bind(trabajador.tipo)
    .bind(trabajador.created_at)
    .bind(trabajador.updated_at)
    .execute(pool)
    .await
    .map_err(|e| map_unique(e, EMAIL_EN_USO))?;

    Ok(trabajador)
}

pub async fn find_trabajador(pool: &SqlitePool, id: &str) -> Result<Option<Trabajador>> {
    Ok(
        sqlx::query_as("SELECT * FROM personas WHERE id = ?1 AND kind = 'Trabajador'")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn find_trabajador_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<Trabajador>> {
    Ok(
        sqlx::query_as("SELECT * FROM personas WHERE email = ?1 AND kind = 'Trabajador'")
            .bind(email)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn list_trabajadores(
    pool: &SqlitePool,
    tipo: Option<TipoTrabajador>,
) -> Result<Vec<Trabajador>> {
    Ok(sqlx::query_as(
        "SELECT * FROM personas \
         WHERE kind = 'Trabajador' AND (?1 IS NULL OR tipo = ?1) \
         ORDER BY created_at",
    )
    .bind(tipo)
    .fetch_all(pool)
    .await?)
}

pub async fn update_trabajador(
    pool: &SqlitePool,
    id: &str,
    input: ActualizarTrabajadorInput,
) -> Result<Option<Trabajador>> {
    if find_trabajador(pool, id).await?.is_none() {
        return Ok(None);
    }

    if email_en_uso(pool, &input.email, Some(id)).await? {
        return Err(DomainError::Conflict(EMAIL_EN_USO.into()));
    }

    let contrasena = match input.contrasena.as_deref() {
        Some(plain) if !plain.is_empty() => Some(password::hash(plain)?),
        _ => None,
    };

    sqlx::query(
        "UPDATE personas SET nombre = ?1, apellido = ?2, telefono = ?3, dni = ?4, \
         fecha_incorporacion = ?5, email = ?6, contrasena = COALESCE(?7, contrasena), \
         tipo = ?8, updated_at = ?9 \
         WHERE id = ?10 AND kind = 'Trabajador'",
    )
    .bind(&input.nombre)
    .bind(&input.apellido)
    .bind(input.telefono)
    .bind(&input.dni)
    .bind(input.fecha_incorporacion)
    .bind(&input.email)
    .bind(contrasena)
    .bind(input.tipo)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| map_unique(e, EMAIL_EN_USO))?;

    find_trabajador(pool, id).await
}

pub async fn delete(pool: &SqlitePool, id: &str, kind: Kind) -> Result<bool> {
    let result = sqlx::query("DELETE FROM personas WHERE id = ?1 AND kind = ?2")
        .bind(id)
        .bind(kind)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load a persona of whatever kind, for token validation.
pub async fn find_persona(pool: &SqlitePool, id: &str) -> Result<Option<Persona>> {
    let kind: Option<(Kind,)> = sqlx::query_as("SELECT kind FROM personas WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(match kind {
        Some((Kind::Usuario,)) => find_usuario(pool, id).await?.map(Persona::Usuario),
        Some((Kind::Familiar,)) => find_familiar(pool, id).await?.map(Persona::Familiar),
        Some((Kind::Trabajador,)) => find_trabajador(pool, id).await?.map(Persona::Trabajador),
        None => None,
    })
}

/// Shallow `{id, nombre, apellido}` references for populating links.
pub async fn refs(pool: &SqlitePool, ids: &[String]) -> Result<HashMap<String, PersonaRef>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let sql = format!(
        "SELECT id, nombre, apellido FROM personas WHERE id IN ({})",
        placeholders(ids.len())
    );

    let mut query = sqlx::query_as::<_, PersonaRef>(&sql);
    for id in ids {
        query = query.bind(id);
    }

    Ok(query
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|r| (r.id.clone(), r))
        .collect())
}
