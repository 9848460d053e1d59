//! Activity type catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TipoActividad {
    pub id: String,
    pub nombre_tipo: String,
    pub descripcion: Option<String>,
    /// Duration in minutes.
    pub duracion: i64,
    pub materiales: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TipoActividadInput {
    #[validate(length(min = 1))]
    pub nombre_tipo: String,
    pub descripcion: Option<String>,
    #[validate(range(min = 1))]
    pub duracion: i64,
    pub materiales: Option<String>,
}
