use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::validate_token;
use crate::error::AppError;
use crate::routes::AppState;

/// Auth extension extracted from the bearer token.
#[derive(Clone, Debug)]
pub struct Auth {
    pub persona_id: String,
    pub rol: String,
}

/// Validates the `Authorization: Bearer` header and inserts an [`Auth`]
/// extension. Rejects with 401 when the header is missing, malformed or the
/// token does not verify.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("No se proporcionó token".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("No se proporcionó token".into()))?;

    let claims = validate_token(token, &state.config.jwt.secret).map_err(|e| {
        tracing::warn!(error = %e, "invalid bearer token");
        AppError::Unauthorized("Token inválido".into())
    })?;

    req.extensions_mut().insert(Auth {
        persona_id: claims.sub,
        rol: claims.rol,
    });

    Ok(next.run(req).await)
}
