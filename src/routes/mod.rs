use std::collections::HashMap;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::SqlitePool;

use aittea_domain::persona::PersonaRef;

use crate::middleware::auth_middleware;

mod actividades;
mod asistencias;
mod auth;
mod eventos;
mod familiares;
mod health;
mod incidencias;
mod solicitudes;
mod tipo_actividades;
mod trabajadores;
mod usuarios;

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub pool: SqlitePool,
}

/// Common `?page&limit&search` query.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).max(1)
    }

    /// Treat an empty search string as absent.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }
}

/// Replace a stored persona id with its populated `{id, nombre, apellido}`
/// reference; ids with no matching persona stay as plain strings.
pub(crate) fn populate_ref(refs: &HashMap<String, PersonaRef>, id: &str) -> Value {
    match refs.get(id) {
        Some(r) => json!({ "id": r.id, "nombre": r.nombre, "apellido": r.apellido }),
        None => Value::String(id.to_owned()),
    }
}

pub fn router(app_state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/api/eventos",
            get(eventos::list).post(eventos::create),
        )
        .route("/api/eventos/por-mes/listado", get(eventos::por_mes))
        .route(
            "/api/eventos/{id}",
            get(eventos::detail)
                .put(eventos::update)
                .delete(eventos::delete),
        )
        .route("/api/eventos/{id}/participar", post(eventos::participar))
        .route("/api/eventos/{id}/entradas", post(eventos::solicitar_entradas))
        .route(
            "/api/usuarios",
            get(usuarios::list).post(usuarios::create),
        )
        .route(
            "/api/usuarios/{id}",
            get(usuarios::detail)
                .put(usuarios::update)
                .delete(usuarios::delete),
        )
        .route(
            "/api/familiares",
            get(familiares::list).post(familiares::create),
        )
        .route(
            "/api/familiares/{id}",
            get(familiares::detail)
                .put(familiares::update)
                .delete(familiares::delete),
        )
        .route(
            "/api/trabajadores",
            get(trabajadores::list).post(trabajadores::create),
        )
        .route(
            "/api/trabajadores/{id}",
            get(trabajadores::detail)
                .put(trabajadores::update)
                .delete(trabajadores::delete),
        )
        .route(
            "/api/asistencias",
            get(asistencias::list).post(asistencias::create),
        )
        .route(
            "/api/asistencias/usuario/{usuario_id}",
            get(asistencias::by_usuario),
        )
        .route(
            "/api/asistencias/{id}",
            get(asistencias::detail).put(asistencias::update),
        )
        .route(
            "/api/solicitudes",
            get(solicitudes::list).post(solicitudes::create),
        )
        .route("/api/solicitudes/{id}/aceptar", put(solicitudes::aceptar))
        .route("/api/solicitudes/{id}", delete(solicitudes::rechazar))
        .route(
            "/api/actividades",
            get(actividades::list).post(actividades::create),
        )
        .route("/api/actividades/usuario", get(actividades::list_usuario))
        .route(
            "/api/actividades/por-usuario/{id}",
            get(actividades::por_usuario_mes),
        )
        .route(
            "/api/actividades/{id}",
            get(actividades::detail)
                .put(actividades::update)
                .delete(actividades::delete),
        )
        .route(
            "/api/incidencias",
            get(incidencias::list).post(incidencias::create),
        )
        .route(
            "/api/incidencias/{id}",
            get(incidencias::detail)
                .put(incidencias::update)
                .delete(incidencias::delete),
        )
        .route(
            "/api/tipo-actividades",
            get(tipo_actividades::list).post(tipo_actividades::create),
        )
        .route(
            "/api/tipo-actividades/{id}",
            get(tipo_actividades::detail)
                .put(tipo_actividades::update)
                .delete(tipo_actividades::delete),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    Router::new()
        // Health check endpoints (no auth required)
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .with_state(app_state.pool.clone())
        .merge(
            Router::new()
                // Auth routes (public)
                .route("/api/auth/login", post(auth::login))
                .route("/api/auth/validate-token", get(auth::validate_token))
                .merge(protected)
                .with_state(app_state),
        )
}
