use axum::{Json, extract::State, http::HeaderMap, http::header::AUTHORIZATION};
use serde::Deserialize;
use serde_json::{Value, json};

use aittea_domain::password;
use aittea_domain::repository::personas;

use crate::auth::{generate_token, validate_token as verify_jwt};
use crate::error::AppError;
use crate::routes::AppState;

const CREDENCIALES_INVALIDAS: &str = "Credenciales inválidas";

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    #[serde(rename = "contraseña")]
    pub contrasena: String,
}

/// POST /api/auth/login
///
/// Familiares are looked up before trabajadores; the same message covers an
/// unknown email and a wrong password.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<Value>, AppError> {
    let (persona_id, rol, hash, usuario): (String, String, String, Value) =
        if let Some(familiar) = personas::find_familiar_by_email(&state.pool, &input.email).await? {
            let hash = familiar.contrasena.clone();
            (
                familiar.id.clone(),
                "Familiar".to_string(),
                hash,
                serde_json::to_value(&familiar).map_err(|e| AppError::Internal(e.to_string()))?,
            )
        } else if let Some(trabajador) =
            personas::find_trabajador_by_email(&state.pool, &input.email).await?
        {
            let hash = trabajador.contrasena.clone();
            (
                trabajador.id.clone(),
                trabajador.tipo.to_string(),
                hash,
                serde_json::to_value(&trabajador).map_err(|e| AppError::Internal(e.to_string()))?,
            )
        } else {
            return Err(AppError::Validation(CREDENCIALES_INVALIDAS.into()));
        };

    if !password::verify(&input.contrasena, &hash) {
        return Err(AppError::Validation(CREDENCIALES_INVALIDAS.into()));
    }

    let token = generate_token(
        persona_id,
        rol.clone(),
        &state.config.jwt.secret,
        state.config.jwt.expiration_secs,
    )?;

    let mut usuario = usuario;
    if let Some(obj) = usuario.as_object_mut() {
        obj.insert("rol".to_string(), Value::String(rol));
    }

    Ok(Json(json!({ "token": token, "usuario": usuario })))
}

/// GET /api/auth/validate-token
///
/// Verifies the bearer token itself and loads the persona it names.
pub async fn validate_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("No se proporcionó token".into()))?;

    let claims = verify_jwt(token, &state.config.jwt.secret)
        .map_err(|_| AppError::Unauthorized("Token inválido".into()))?;

    let persona = personas::find_persona(&state.pool, &claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Token inválido".into()))?;

    Ok(Json(json!({
        "message": "Token válido",
        "usuario": persona,
    })))
}
