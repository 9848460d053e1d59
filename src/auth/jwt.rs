//! JWT token generation and validation.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// JWT claims payload.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Persona id.
    pub sub: String,
    /// `Familiar`, `Auxiliar` or `Tecnico`.
    pub rol: String,
    /// Expiration timestamp.
    pub exp: u64,
}

/// Generate a token for an authenticated persona.
pub fn generate_token(
    persona_id: String,
    rol: String,
    secret: &str,
    lifetime_seconds: u64,
) -> anyhow::Result<String> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

    let claims = Claims {
        sub: persona_id,
        rol,
        exp: now + lifetime_seconds,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Validate and decode a token.
pub fn validate_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-which-is-long-enough!!";

    #[test]
    fn round_trip() {
        let token =
            generate_token("01ARZ3".into(), "Familiar".into(), SECRET, 3600).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "01ARZ3");
        assert_eq!(claims.rol, "Familiar");
    }

    #[test]
    fn rejects_wrong_secret() {
        let token =
            generate_token("01ARZ3".into(), "Auxiliar".into(), SECRET, 3600).unwrap();
        assert!(validate_token(&token, "another-secret-also-long-enough!!").is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        let claims = Claims {
            sub: "01ARZ3".into(),
            rol: "Tecnico".into(),
            exp: now - 120,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(validate_token(&token, SECRET).is_err());
    }
}
