//! Behavioral incidents reported by auxiliares.

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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoIncidencia {
    Agitacion,
    AgresionVerbal,
    AgresionFisica,
    Autolesion,
    SobrecargaSensorial,
    Otro,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Incidencia {
    pub id: String,
    pub fecha: DateTime<Utc>,
    pub tipo_incidencia: TipoIncidencia,
    pub descripcion: Option<String>,
    pub usuario: String,
    pub creada_por: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CrearIncidenciaInput {
    pub fecha: DateTime<Utc>,
    pub tipo_incidencia: TipoIncidencia,
    pub descripcion: Option<String>,
    #[validate(length(min = 1))]
    pub usuario: String,
    #[validate(length(min = 1))]
    pub creada_por: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualizarIncidenciaInput {
    pub fecha: DateTime<Utc>,
    pub tipo_incidencia: TipoIncidencia,
    pub descripcion: Option<String>,
    pub usuario: String,
}
