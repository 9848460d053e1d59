//! Association requests linking a familiar to a usuario.
//!
//! At most one *pendiente* request may exist per (familiar, usuario) pair;
//! accepted/rejected history can coexist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EstadoSolicitud {
    Pendiente,
    Aceptada,
    Rechazada,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SolicitudAsociacion {
    pub id: String,
    pub familiar: String,
    pub usuario: String,
    pub estado: EstadoSolicitud,
    pub fecha: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CrearSolicitudInput {
    #[validate(length(min = 1))]
    pub dni_usuario: String,
    #[validate(length(min = 1))]
    pub familiar_id: String,
}
