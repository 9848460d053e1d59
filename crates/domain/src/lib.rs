//! Domain model and persistence for the day-care backend: the persona
//! hierarchy, activities, attendance, incidents, events with a ticket ledger
//! and association requests.

pub mod actividad;
pub mod asistencia;
pub mod error;
pub mod evento;
pub mod incidencia;
pub mod password;
pub mod persona;
pub mod repository;
pub mod solicitud;
pub mod tipo_actividad;

pub use error::{DomainError, Result};
