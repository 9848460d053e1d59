//! Plain-sqlx repositories, one module per table.

pub mod actividades;
pub mod asistencias;
pub mod eventos;
pub mod incidencias;
pub mod personas;
pub mod solicitudes;
pub mod tipo_actividades;

use ulid::Ulid;

use crate::error::DomainError;

pub(crate) fn nuevo_id() -> String {
    Ulid::new().to_string()
}

/// `?` placeholders for a dynamic `IN (...)` clause.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Map a storage-level unique violation to the guard's Conflict message.
/// The indexes backstop the write-time checks against concurrent creates.
pub(crate) fn map_unique(err: sqlx::Error, message: &str) -> DomainError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DomainError::Conflict(message.to_owned())
        }
        _ => DomainError::Database(err),
    }
}

/// Pagination window, 1-based pages as exposed by the API.
#[derive(Debug, Clone, Copy)]
pub struct Pagina {
    pub limit: i64,
    pub offset: i64,
}

impl Pagina {
    pub fn new(page: i64, limit: i64) -> Self {
        let page = page.max(1);
        let limit = limit.max(1);
        Self {
            limit,
            offset: (page - 1) * limit,
        }
    }
}

/// `ceil(total / limit)`, floored at one page so empty listings still page.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    let pages = (total + limit - 1) / limit.max(1);
    pages.max(1)
}
