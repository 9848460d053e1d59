//! Attendance records: one per usuario and calendar day.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{request_json, setup_app, test_token};

fn body(usuario: &str, fecha: &str) -> serde_json::Value {
    json!({
        "fecha": fecha,
        "presente": false,
        "justificada": false,
        "descripcion": "Falta sin justificar",
        "usuario": usuario,
    })
}

#[tokio::test]
async fn rejects_second_record_same_usuario_and_day() -> anyhow::Result<()> {
    let (app, _pool) = setup_app().await?;
    let token = test_token("aux-1", "Auxiliar");

    request_json(
        &app,
        "POST",
        "/api/asistencias",
        Some(&token),
        Some(body("usuario-a", "2026-08-29T09:00:00Z")),
        StatusCode::CREATED,
    )
    .await;

    // Same usuario, same day, different time of day.
    let rejected = request_json(
        &app,
        "POST",
        "/api/asistencias",
        Some(&token),
        Some(body("usuario-a", "2026-08-29T17:30:00Z")),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(rejected["message"], "Ya hay una falta para este usuario en ese día.");

    // Different day succeeds.
    request_json(
        &app,
        "POST",
        "/api/asistencias",
        Some(&token),
        Some(body("usuario-a", "2026-08-30T09:00:00Z")),
        StatusCode::CREATED,
    )
    .await;

    // Different usuario on the original day succeeds.
    request_json(
        &app,
        "POST",
        "/api/asistencias",
        Some(&token),
        Some(body("usuario-b", "2026-08-29T09:00:00Z")),
        StatusCode::CREATED,
    )
    .await;

    Ok(())
}

#[tokio::test]
async fn listing_uses_total_and_asistencias_shape() -> anyhow::Result<()> {
    let (app, _pool) = setup_app().await?;
    let token = test_token("aux-1", "Auxiliar");

    for (usuario, fecha) in [
        ("usuario-a", "2026-08-27T09:00:00Z"),
        ("usuario-a", "2026-08-28T09:00:00Z"),
        ("usuario-b", "2026-08-28T09:00:00Z"),
    ] {
        request_json(
            &app,
            "POST",
            "/api/asistencias",
            Some(&token),
            Some(body(usuario, fecha)),
            StatusCode::CREATED,
        )
        .await;
    }

    let listado = request_json(
        &app,
        "GET",
        "/api/asistencias?page=1&limit=2",
        Some(&token),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(listado["total"], 3);
    assert_eq!(listado["asistencias"].as_array().expect("array").len(), 2);

    let por_usuario = request_json(
        &app,
        "GET",
        "/api/asistencias/usuario/usuario-a",
        Some(&token),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(por_usuario.as_array().expect("array").len(), 2);

    Ok(())
}

#[tokio::test]
async fn partial_update_keeps_absent_fields() -> anyhow::Result<()> {
    let (app, _pool) = setup_app().await?;
    let token = test_token("aux-1", "Auxiliar");

    let creada = request_json(
        &app,
        "POST",
        "/api/asistencias",
        Some(&token),
        Some(body("usuario-a", "2026-08-29T09:00:00Z")),
        StatusCode::CREATED,
    )
    .await;
    let id = creada["id"].as_str().expect("id").to_string();

    let actualizada = request_json(
        &app,
        "PUT",
        &format!("/api/asistencias/{id}"),
        Some(&token),
        Some(json!({"justificada": true, "justificadaPor": "familiar-1"})),
        StatusCode::OK,
    )
    .await;
    assert_eq!(actualizada["justificada"], true);
    assert_eq!(actualizada["descripcion"], "Falta sin justificar");
    assert_eq!(actualizada["presente"], false);

    request_json(
        &app,
        "PUT",
        "/api/asistencias/ausente",
        Some(&token),
        Some(json!({"justificada": true})),
        StatusCode::NOT_FOUND,
    )
    .await;

    Ok(())
}
