//! Person hierarchy stored in the single `personas` table, discriminated
//! by a `kind` tag (Usuario, Familiar, Trabajador).

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
pub enum Kind {
    Usuario,
    Familiar,
    Trabajador,
}

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
pub enum TipoTrabajador {
    Auxiliar,
    Tecnico,
}

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
pub enum TipoAutismo {
    AutismoClasico,
    Asperger,
    TgdNe,
    TrastornoDesintegrativo,
    AutismoAltoFuncionamiento,
}

/// Client of the center ("usuario" in the domain language).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub id: String,
    pub nombre: String,
    pub apellido: String,
    pub telefono: Option<i64>,
    pub dni: String,
    pub fecha_nacimiento: DateTime<Utc>,
    pub tipo_autismo: TipoAutismo,
    pub grado_autismo: i64,
    pub grupo_trabajo: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Family member with credentials and an owned set of associated usuarios.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Familiar {
    pub id: String,
    pub nombre: String,
    pub apellido: String,
    pub telefono: Option<i64>,
    pub dni: Option<String>,
    pub tipo_de_relacion_con_usuario: Option<String>,
    pub email: String,
    // Hash, never leaves the server.
    #[serde(skip_serializing)]
    #[serde(default)]
    pub contrasena: String,
    #[sqlx(json)]
    pub usuarios_asociados: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Staff member, subtyped Auxiliar or Tecnico.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Trabajador {
    pub id: String,
    pub nombre: String,
    pub apellido: String,
    pub telefono: Option<i64>,
    pub dni: Option<String>,
    pub fecha_incorporacion: Option<DateTime<Utc>>,
    pub email: String,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub contrasena: String,
    pub tipo: TipoTrabajador,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A persona of any kind, for token validation lookups.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Persona {
    Usuario(Usuario),
    Familiar(Familiar),
    Trabajador(Trabajador),
}

/// Shallow reference used when populating cross-table links
/// (`{id, nombre, apellido}`).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PersonaRef {
    pub id: String,
    pub nombre: String,
    pub apellido: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CrearUsuarioInput {
    #[validate(length(min = 1))]
    pub nombre: String,
    #[validate(length(min = 1))]
    pub apellido: String,
    pub telefono: Option<i64>,
    #[validate(length(min = 1))]
    pub dni: String,
    pub fecha_nacimiento: DateTime<Utc>,
    pub tipo_autismo: TipoAutismo,
    #[validate(range(min = 1, max = 100))]
    pub grado_autismo: i64,
    pub grupo_trabajo: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CrearFamiliarInput {
    #[validate(length(min = 1))]
    pub nombre: String,
    #[validate(length(min = 1))]
    pub apellido: String,
    pub telefono: Option<i64>,
    pub dni: Option<String>,
    pub tipo_de_relacion_con_usuario: Option<String>,
    #[validate(email)]
    pub email: String,
    #[serde(rename = "contraseña")]
    #[validate(length(min = 1))]
    pub contrasena: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActualizarFamiliarInput {
    #[validate(length(min = 1))]
    pub nombre: String,
    #[validate(length(min = 1))]
    pub apellido: String,
    pub telefono: Option<i64>,
    pub dni: Option<String>,
    pub tipo_de_relacion_con_usuario: Option<String>,
    #[validate(email)]
    pub email: String,
    // Re-hashed only when provided.
    #[serde(rename = "contraseña")]
    pub contrasena: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CrearTrabajadorInput {
    #[validate(length(min = 1))]
    pub nombre: String,
    #[validate(length(min = 1))]
    pub apellido: String,
    pub telefono: Option<i64>,
    pub dni: Option<String>,
    pub fecha_incorporacion: Option<DateTime<Utc>>,
    #[validate(email)]
    pub email: String,
    #[serde(rename = "contraseña")]
    #[validate(length(min = 1))]
    pub contrasena: String,
    pub tipo: TipoTrabajador,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActualizarTrabajadorInput {
    #[validate(length(min = 1))]
    pub nombre: String,
    #[validate(length(min = 1))]
    pub apellido: String,
    pub telefono: Option<i64>,
    pub dni: Option<String>,
    pub fecha_incorporacion: Option<DateTime<Utc>>,
    #[validate(email)]
    pub email: String,
    #[serde(rename = "contraseña")]
    pub contrasena: Option<String>,
    pub tipo: TipoTrabajador,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tipo_autismo_wire_format() {
        let json = serde_json::to_string(&TipoAutismo::TgdNe).unwrap();
        assert_eq!(json, "\"TGD_NE\"");
        let parsed: TipoAutismo = serde_json::from_str("\"AUTISMO_CLASICO\"").unwrap();
        assert_eq!(parsed, TipoAutismo::AutismoClasico);
    }

    #[test]
    fn tipo_trabajador_parses_from_query_string() {
        assert_eq!(
            "Auxiliar".parse::<TipoTrabajador>().unwrap(),
            TipoTrabajador::Auxiliar
        );
        assert!("Gerente".parse::<TipoTrabajador>().is_err());
    }

    #[test]
    fn familiar_never_serializes_contrasena() {
        let familiar = Familiar {
            id: "01ARZ3NDEKTSV4RRFFQ69G5FAV".into(),
            nombre: "Ana".into(),
            apellido: "García".into(),
            telefono: None,
            dni: None,
            tipo_de_relacion_con_usuario: Some("madre".into()),
            email: "ana@example.com".into(),
            contrasena: "$argon2id$...".into(),
            usuarios_asociados: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&familiar).unwrap();
        assert!(json.get("contrasena").is_none());
        assert!(json.get("contraseña").is_none());
        assert_eq!(json["email"], "ana@example.com");
    }
}
