//! Event ticket allocation through the HTTP surface.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{request_json, setup_app, test_token};

use aittea_domain::evento::CrearEventoInput;
use aittea_domain::repository::eventos;
use chrono::Utc;

fn crear_evento_body(total: i64) -> serde_json::Value {
    json!({
        "nombre": "Excursión al parque",
        "descripcion": "Salida de un día",
        "fecha": Utc::now().to_rfc3339(),
        "entradasTotales": total,
        "trabajadoresMinimos": 2,
        "creadoPor": "trabajador-1",
    })
}

#[tokio::test]
async fn ticket_allocation_end_to_end() -> anyhow::Result<()> {
    let (app, _pool) = setup_app().await?;
    let token = test_token("trabajador-1", "Tecnico");

    // Create with 10 tickets.
    let created = request_json(
        &app,
        "POST",
        "/api/eventos",
        Some(&token),
        Some(crear_evento_body(10)),
        StatusCode::OK,
    )
    .await;
    assert_eq!(created["message"], "Evento creado correctamente");
    let id = created["evento"]["id"].as_str().expect("id").to_string();
    assert_eq!(created["evento"]["entradasDisponibles"], 10);

    // A requests 4.
    let after_four = request_json(
        &app,
        "POST",
        &format!("/api/eventos/{id}/entradas"),
        Some(&token),
        Some(json!({"usuarioId": "usuario-a", "cantidad": 4})),
        StatusCode::OK,
    )
    .await;
    assert_eq!(after_four["evento"]["entradasDisponibles"], 6);

    // A requests 2 more: single accumulated ledger entry of 6.
    let after_six = request_json(
        &app,
        "POST",
        &format!("/api/eventos/{id}/entradas"),
        Some(&token),
        Some(json!({"usuarioId": "usuario-a", "cantidad": 2})),
        StatusCode::OK,
    )
    .await;
    assert_eq!(after_six["evento"]["entradasDisponibles"], 4);
    let ledger = after_six["evento"]["entradasSolicitadas"]
        .as_array()
        .expect("ledger");
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0]["cantidad"], 6);

    // Shrinking capacity to 5 is rejected: 6 already committed.
    let rejected = request_json(
        &app,
        "PUT",
        &format!("/api/eventos/{id}"),
        Some(&token),
        Some(json!({
            "nombre": "Excursión al parque",
            "descripcion": "Salida de un día",
            "fecha": Utc::now().to_rfc3339(),
            "entradasTotales": 5,
            "trabajadoresMinimos": 2,
        })),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(
        rejected["message"],
        "Ya se han solicitado 6 entradas. No puedes establecer un total menor."
    );

    // Shrinking to exactly 6 is allowed and leaves zero availability.
    let shrunk = request_json(
        &app,
        "PUT",
        &format!("/api/eventos/{id}"),
        Some(&token),
        Some(json!({
            "nombre": "Excursión al parque",
            "descripcion": "Salida de un día",
            "fecha": Utc::now().to_rfc3339(),
            "entradasTotales": 6,
            "trabajadoresMinimos": 2,
        })),
        StatusCode::OK,
    )
    .await;
    assert_eq!(shrunk["evento"]["entradasTotales"], 6);
    assert_eq!(shrunk["evento"]["entradasDisponibles"], 0);

    // Any further request fails for lack of tickets.
    let exhausted = request_json(
        &app,
        "POST",
        &format!("/api/eventos/{id}/entradas"),
        Some(&token),
        Some(json!({"usuarioId": "usuario-b", "cantidad": 1})),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(exhausted["message"], "No hay suficientes entradas disponibles");

    Ok(())
}

#[tokio::test]
async fn rejects_invalid_ticket_requests() -> anyhow::Result<()> {
    let (app, _pool) = setup_app().await?;
    let token = test_token("trabajador-1", "Tecnico");

    let created = request_json(
        &app,
        "POST",
        "/api/eventos",
        Some(&token),
        Some(crear_evento_body(3)),
        StatusCode::OK,
    )
    .await;
    let id = created["evento"]["id"].as_str().expect("id").to_string();

    for body in [
        json!({"usuarioId": "", "cantidad": 2}),
        json!({"usuarioId": "usuario-a", "cantidad": 0}),
        json!({"usuarioId": "usuario-a", "cantidad": -1}),
    ] {
        let rejected = request_json(
            &app,
            "POST",
            &format!("/api/eventos/{id}/entradas"),
            Some(&token),
            Some(body),
            StatusCode::BAD_REQUEST,
        )
        .await;
        assert_eq!(rejected["message"], "Cantidad o usuario inválido");
    }

    // The failed attempts changed nothing.
    let detail = request_json(
        &app,
        "GET",
        &format!("/api/eventos/{id}"),
        Some(&token),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(detail["entradasDisponibles"], 3);
    assert_eq!(detail["entradasSolicitadas"].as_array().expect("ledger").len(), 0);

    Ok(())
}

#[tokio::test]
async fn participar_rejects_duplicates() -> anyhow::Result<()> {
    let (app, _pool) = setup_app().await?;
    let token = test_token("trabajador-1", "Auxiliar");

    let created = request_json(
        &app,
        "POST",
        "/api/eventos",
        Some(&token),
        Some(crear_evento_body(5)),
        StatusCode::OK,
    )
    .await;
    let id = created["evento"]["id"].as_str().expect("id").to_string();

    request_json(
        &app,
        "POST",
        &format!("/api/eventos/{id}/participar"),
        Some(&token),
        Some(json!({"trabajadorId": "trabajador-2"})),
        StatusCode::OK,
    )
    .await;

    let rejected = request_json(
        &app,
        "POST",
        &format!("/api/eventos/{id}/participar"),
        Some(&token),
        Some(json!({"trabajadorId": "trabajador-2"})),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(rejected["message"], "Ya estás apuntado como participante");

    Ok(())
}

#[tokio::test]
async fn create_requires_all_fields() -> anyhow::Result<()> {
    let (app, _pool) = setup_app().await?;
    let token = test_token("trabajador-1", "Tecnico");

    let rejected = request_json(
        &app,
        "POST",
        "/api/eventos",
        Some(&token),
        Some(json!({
            "nombre": "Sin entradas",
            "descripcion": "x",
            "fecha": Utc::now().to_rfc3339(),
            "entradasTotales": 0,
            "trabajadoresMinimos": 2,
            "creadoPor": "trabajador-1",
        })),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(rejected["message"], "Faltan campos obligatorios");

    Ok(())
}

#[tokio::test]
async fn stale_write_loses_the_race() -> anyhow::Result<()> {
    let (_app, pool) = setup_app().await?;

    let evento = eventos::insert(
        &pool,
        CrearEventoInput {
            nombre: "Concierto".into(),
            descripcion: "Benéfico".into(),
            fecha: Utc::now(),
            entradas_totales: 10,
            trabajadores_minimos: 1,
            creado_por: "trabajador-1".into(),
        },
    )
    .await?;

    // Two handlers load the same snapshot.
    let mut first = evento.clone();
    let mut second = evento;

    first.solicitar_entradas("usuario-a", 4)?;
    second.solicitar_entradas("usuario-b", 9)?;

    // First write wins and bumps the version.
    let committed = eventos::replace_guarded(&pool, &first).await?;
    assert_eq!(committed.entradas_disponibles, 6);

    // The second write is based on the stale snapshot and must conflict.
    let err = eventos::replace_guarded(&pool, &second).await.unwrap_err();
    assert!(matches!(err, aittea_domain::DomainError::Conflict(_)));

    // Storage still satisfies the conservation invariant.
    let stored = eventos::find(&pool, &committed.id).await?.expect("stored");
    assert_eq!(
        stored.entradas_disponibles,
        stored.entradas_totales - stored.entradas_comprometidas()
    );

    Ok(())
}

#[tokio::test]
async fn listing_searches_sorts_and_pages() -> anyhow::Result<()> {
    let (app, _pool) = setup_app().await?;
    let token = test_token("trabajador-1", "Tecnico");

    // An empty listing still reports one page.
    let vacio = request_json(&app, "GET", "/api/eventos", Some(&token), None, StatusCode::OK).await;
    assert_eq!(vacio["eventos"].as_array().expect("array").len(), 0);
    assert_eq!(vacio["totalEventos"], 0);
    assert_eq!(vacio["totalPages"], 1);
    assert_eq!(vacio["currentPage"], 1);

    for (nombre, fecha) in [
        ("Mercadillo solidario", "2026-05-10T10:00:00Z"),
        ("Concierto benéfico", "2026-05-20T10:00:00Z"),
        ("Mercadillo de verano", "2026-06-01T10:00:00Z"),
    ] {
        request_json(
            &app,
            "POST",
            "/api/eventos",
            Some(&token),
            Some(json!({
                "nombre": nombre,
                "descripcion": "x",
                "fecha": fecha,
                "entradasTotales": 5,
                "trabajadoresMinimos": 1,
                "creadoPor": "trabajador-1",
            })),
            StatusCode::OK,
        )
        .await;
    }

    // Search filters on nombre; results come back fecha desc.
    let filtrado = request_json(
        &app,
        "GET",
        "/api/eventos?search=Mercadillo",
        Some(&token),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(filtrado["totalEventos"], 2);
    let eventos = filtrado["eventos"].as_array().expect("array");
    assert_eq!(eventos[0]["nombre"], "Mercadillo de verano");
    assert_eq!(eventos[1]["nombre"], "Mercadillo solidario");

    let segunda = request_json(
        &app,
        "GET",
        "/api/eventos?page=2&limit=2",
        Some(&token),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(segunda["eventos"].as_array().expect("array").len(), 1);
    assert_eq!(segunda["totalPages"], 2);
    assert_eq!(segunda["currentPage"], 2);

    Ok(())
}

#[tokio::test]
async fn por_mes_requires_year_and_month() -> anyhow::Result<()> {
    let (app, _pool) = setup_app().await?;
    let token = test_token("trabajador-1", "Tecnico");

    request_json(
        &app,
        "GET",
        "/api/eventos/por-mes/listado?year=2026",
        Some(&token),
        None,
        StatusCode::BAD_REQUEST,
    )
    .await;

    let listado = request_json(
        &app,
        "GET",
        "/api/eventos/por-mes/listado?year=2026&month=8",
        Some(&token),
        None,
        StatusCode::OK,
    )
    .await;
    assert!(listado.as_array().expect("array").is_empty());

    Ok(())
}
