//! Persona CRUD: email uniqueness across kinds, password handling, filters.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{request_json, setup_app, test_token};

fn familiar_body(email: &str) -> serde_json::Value {
    json!({
        "nombre": "Ana",
        "apellido": "García",
        "email": email,
        "contraseña": "secreta123",
    })
}

fn trabajador_body(email: &str, tipo: &str) -> serde_json::Value {
    json!({
        "nombre": "Luis",
        "apellido": "Pérez",
        "email": email,
        "contraseña": "secreta123",
        "tipo": tipo,
    })
}

#[tokio::test]
async fn email_is_unique_across_familiares_and_trabajadores() -> anyhow::Result<()> {
    let (app, _pool) = setup_app().await?;
    let token = test_token("admin", "Tecnico");

    request_json(
        &app,
        "POST",
        "/api/familiares",
        Some(&token),
        Some(familiar_body("compartido@example.com")),
        StatusCode::OK,
    )
    .await;

    // Same address for a trabajador is rejected.
    let rejected = request_json(
        &app,
        "POST",
        "/api/trabajadores",
        Some(&token),
        Some(trabajador_body("compartido@example.com", "Auxiliar")),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(rejected["message"], "El email ya está registrado");

    // And for a second familiar.
    let rejected = request_json(
        &app,
        "POST",
        "/api/familiares",
        Some(&token),
        Some(familiar_body("compartido@example.com")),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(rejected["message"], "El email ya está registrado");

    Ok(())
}

#[tokio::test]
async fn updating_to_own_email_succeeds_to_anothers_conflicts() -> anyhow::Result<()> {
    let (app, _pool) = setup_app().await?;
    let token = test_token("admin", "Tecnico");

    let ana = request_json(
        &app,
        "POST",
        "/api/familiares",
        Some(&token),
        Some(familiar_body("ana@example.com")),
        StatusCode::OK,
    )
    .await;
    assert_eq!(ana["message"], "Familiar creado");
    let ana_id = ana["familiar"]["id"].as_str().expect("id").to_string();

    request_json(
        &app,
        "POST",
        "/api/familiares",
        Some(&token),
        Some(familiar_body("otra@example.com")),
        StatusCode::OK,
    )
    .await;

    // Keeping her own email is fine; no contraseña means no rehash.
    let updated = request_json(
        &app,
        "PUT",
        &format!("/api/familiares/{ana_id}"),
        Some(&token),
        Some(json!({
            "nombre": "Ana María",
            "apellido": "García",
            "email": "ana@example.com",
        })),
        StatusCode::OK,
    )
    .await;
    assert_eq!(updated["message"], "Familiar actualizado");
    assert_eq!(updated["familiar"]["nombre"], "Ana María");

    // Taking the other record's address conflicts.
    let rejected = request_json(
        &app,
        "PUT",
        &format!("/api/familiares/{ana_id}"),
        Some(&token),
        Some(json!({
            "nombre": "Ana",
            "apellido": "García",
            "email": "otra@example.com",
        })),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(rejected["message"], "El email ya está registrado");

    Ok(())
}

#[tokio::test]
async fn trabajadores_filter_validates_tipo() -> anyhow::Result<()> {
    let (app, _pool) = setup_app().await?;
    let token = test_token("admin", "Tecnico");

    request_json(
        &app,
        "POST",
        "/api/trabajadores",
        Some(&token),
        Some(trabajador_body("aux@example.com", "Auxiliar")),
        StatusCode::OK,
    )
    .await;
    request_json(
        &app,
        "POST",
        "/api/trabajadores",
        Some(&token),
        Some(trabajador_body("tec@example.com", "Tecnico")),
        StatusCode::OK,
    )
    .await;

    let auxiliares = request_json(
        &app,
        "GET",
        "/api/trabajadores?tipo=Auxiliar",
        Some(&token),
        None,
        StatusCode::OK,
    )
    .await;
    let auxiliares = auxiliares.as_array().expect("array");
    assert_eq!(auxiliares.len(), 1);
    assert_eq!(auxiliares[0]["email"], "aux@example.com");

    let rejected = request_json(
        &app,
        "GET",
        "/api/trabajadores?tipo=Gerente",
        Some(&token),
        None,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(rejected["message"], "Tipo de trabajador no válido");

    Ok(())
}

#[tokio::test]
async fn usuarios_crud_and_grupo_filter() -> anyhow::Result<()> {
    let (app, _pool) = setup_app().await?;
    let token = test_token("admin", "Tecnico");

    let body = |dni: &str, grupo: i64| {
        json!({
            "nombre": "Pablo",
            "apellido": "Ruiz",
            "dni": dni,
            "fechaNacimiento": "2012-05-01T00:00:00Z",
            "tipoAutismo": "ASPERGER",
            "gradoAutismo": 40,
            "grupoTrabajo": grupo,
        })
    };

    let creado = request_json(
        &app,
        "POST",
        "/api/usuarios",
        Some(&token),
        Some(body("11111111A", 1)),
        StatusCode::OK,
    )
    .await;
    assert_eq!(creado["message"], "Usuario creado");
    let id = creado["usuario"]["id"].as_str().expect("id").to_string();

    request_json(
        &app,
        "POST",
        "/api/usuarios",
        Some(&token),
        Some(body("22222222B", 2)),
        StatusCode::OK,
    )
    .await;

    let grupo_uno = request_json(
        &app,
        "GET",
        "/api/usuarios?grupoTrabajo=1",
        Some(&token),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(grupo_uno["totalUsuarios"], 1);
    assert_eq!(grupo_uno["usuarios"][0]["dni"], "11111111A");

    // The update envelope keys the record as "user".
    let actualizado = request_json(
        &app,
        "PUT",
        &format!("/api/usuarios/{id}"),
        Some(&token),
        Some(body("11111111A", 3)),
        StatusCode::OK,
    )
    .await;
    assert_eq!(actualizado["message"], "Usuario actualizado");
    assert_eq!(actualizado["user"]["grupoTrabajo"], 3);

    let borrado = request_json(
        &app,
        "DELETE",
        &format!("/api/usuarios/{id}"),
        Some(&token),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(borrado["message"], "Usuario eliminado");

    request_json(
        &app,
        "GET",
        &format!("/api/usuarios/{id}"),
        Some(&token),
        None,
        StatusCode::NOT_FOUND,
    )
    .await;

    Ok(())
}
