//! Attendance records: one per (usuario, calendar day).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Asistencia {
    pub id: String,
    pub fecha: DateTime<Utc>,
    pub presente: bool,
    pub justificada: bool,
    pub descripcion: Option<String>,
    pub usuario: String,
    pub justificada_por: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CrearAsistenciaInput {
    pub fecha: DateTime<Utc>,
    pub presente: bool,
    pub justificada: bool,
    pub descripcion: Option<String>,
    #[validate(length(min = 1))]
    pub usuario: String,
    pub justificada_por: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ActualizarAsistenciaInput {
    pub fecha: Option<DateTime<Utc>>,
    pub presente: Option<bool>,
    pub justificada: Option<bool>,
    pub descripcion: Option<String>,
    pub usuario: Option<String>,
    pub justificada_por: Option<String>,
}
