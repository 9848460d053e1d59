//! Scheduled activities, linked to the usuarios who take part and the staff
//! who run them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Actividad {
    pub id: String,
    pub nombre: String,
    pub fecha: DateTime<Utc>,
    /// Usuarios taking part.
    #[sqlx(json)]
    pub realizada_por: Vec<String>,
    /// Auxiliares running the activity.
    #[sqlx(json)]
    pub ejecutada_por: Vec<String>,
    pub tipo_actividad: String,
    pub creada_por: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CrearActividadInput {
    #[validate(length(min = 1))]
    pub nombre: String,
    pub fecha: DateTime<Utc>,
    #[serde(default)]
    pub realizada_por: Vec<String>,
    #[serde(default)]
    pub ejecutada_por: Vec<String>,
    #[validate(length(min = 1))]
    pub tipo_actividad: String,
    #[validate(length(min = 1))]
    pub creada_por: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualizarActividadInput {
    pub nombre: String,
    pub fecha: DateTime<Utc>,
    #[serde(default)]
    pub realizada_por: Vec<String>,
    #[serde(default)]
    pub ejecutada_por: Vec<String>,
    pub tipo_actividad: String,
}

/// Filters for the paginated listings.
#[derive(Debug, Default, Clone)]
pub struct FiltroActividades {
    pub search: Option<String>,
    pub tipos: Vec<String>,
    /// Restrict to actividades whose `realizada_por` contains this usuario.
    pub usuario: Option<String>,
}
