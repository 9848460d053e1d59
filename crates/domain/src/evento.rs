//! Eventos and their embedded ticket ledger.
//!
//! The ledger (`entradas_solicitadas`) is owned by the Evento document: rows
//! have no identity of their own and only change through the methods below.
//! Invariant held after every successful mutation:
//! `entradas_disponibles == entradas_totales - entradas_comprometidas()`,
//! with `entradas_disponibles >= 0`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::error::{DomainError, Result};

/// One ledger row: how many tickets a usuario has been allocated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntradaSolicitada {
    pub usuario: String,
    pub cantidad: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Evento {
    pub id: String,
    pub nombre: String,
    pub descripcion: String,
    pub fecha: DateTime<Utc>,
    pub entradas_totales: i64,
    pub entradas_disponibles: i64,
    pub trabajadores_minimos: i64,
    #[sqlx(json)]
    pub participantes: Vec<String>,
    #[sqlx(json)]
    pub entradas_solicitadas: Vec<EntradaSolicitada>,
    pub creado_por: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency counter, storage-only.
    #[serde(skip)]
    pub version: i64,
}

impl Evento {
    /// Sum of ticket quantities already committed to the ledger.
    pub fn entradas_comprometidas(&self) -> i64 {
        self.entradas_solicitadas.iter().map(|e| e.cantidad).sum()
    }

    /// Allocate `cantidad` tickets to a usuario.
    ///
    /// An existing ledger entry for the usuario accumulates; there is never
    /// more than one entry per usuario. The usuario id is only checked for
    /// presence, not for existence in the personas table.
    pub fn solicitar_entradas(&mut self, usuario_id: &str, cantidad: i64) -> Result<()> {
        if usuario_id.is_empty() || cantidad <= 0 {
            return Err(DomainError::Validation(
                "Cantidad o usuario inválido".into(),
            ));
        }

        if cantidad > self.entradas_disponibles {
            return Err(DomainError::Conflict(
                "No hay suficientes entradas disponibles".into(),
            ));
        }

        match self
            .entradas_solicitadas
            .iter_mut()
            .find(|e| e.usuario == usuario_id)
        {
            Some(entrada) => entrada.cantidad += cantidad,
            None => self.entradas_solicitadas.push(EntradaSolicitada {
                usuario: usuario_id.to_owned(),
                cantidad,
            }),
        }

        self.entradas_disponibles -= cantidad;
        Ok(())
    }

    /// Join the participant set. Rejected when already present.
    pub fn participar(&mut self, trabajador_id: &str) -> Result<()> {
        if self.participantes.iter().any(|p| p == trabajador_id) {
            return Err(DomainError::Conflict(
                "Ya estás apuntado como participante".into(),
            ));
        }

        self.participantes.push(trabajador_id.to_owned());
        Ok(())
    }

    /// Administrative update. The capacity can never shrink below the
    /// tickets already committed; availability is recomputed from the ledger.
    pub fn actualizar(&mut self, input: ActualizarEventoInput) -> Result<()> {
        let comprometidas = self.entradas_comprometidas();

        if input.entradas_totales < comprometidas {
            return Err(DomainError::Conflict(format!(
                "Ya se han solicitado {comprometidas} entradas. \
                 No puedes establecer un total menor."
            )));
        }

        self.nombre = input.nombre;
        self.descripcion = input.descripcion;
        self.fecha = input.fecha;
        self.entradas_totales = input.entradas_totales;
        self.entradas_disponibles = input.entradas_totales - comprometidas;
        self.trabajadores_minimos = input.trabajadores_minimos;
        Ok(())
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CrearEventoInput {
    #[validate(length(min = 1))]
    pub nombre: String,
    #[validate(length(min = 1))]
    pub descripcion: String,
    pub fecha: DateTime<Utc>,
    // A zero total is rejected at creation time.
    #[validate(range(min = 1))]
    pub entradas_totales: i64,
    #[validate(range(min = 1))]
    pub trabajadores_minimos: i64,
    #[validate(length(min = 1))]
    pub creado_por: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualizarEventoInput {
    pub nombre: String,
    pub descripcion: String,
    pub fecha: DateTime<Utc>,
    pub entradas_totales: i64,
    pub trabajadores_minimos: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evento(total: i64) -> Evento {
        Evento {
            id: "01ARZ3NDEKTSV4RRFFQ69G5FAV".into(),
            nombre: "Excursión".into(),
            descripcion: "Salida al parque".into(),
            fecha: Utc::now(),
            entradas_totales: total,
            entradas_disponibles: total,
            trabajadores_minimos: 2,
            participantes: vec![],
            entradas_solicitadas: vec![],
            creado_por: "trabajador-1".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            version: 0,
        }
    }

    fn invariante(e: &Evento) {
        assert_eq!(
            e.entradas_disponibles,
            e.entradas_totales - e.entradas_comprometidas()
        );
        assert!(e.entradas_disponibles >= 0);
    }

    #[test]
    fn solicitar_entradas_descuenta_disponibles() {
        let mut e = evento(10);
        e.solicitar_entradas("usuario-a", 4).unwrap();
        assert_eq!(e.entradas_disponibles, 6);
        assert_eq!(e.entradas_solicitadas.len(), 1);
        invariante(&e);
    }

    #[test]
    fn solicitudes_repetidas_acumulan_en_una_entrada() {
        let mut e = evento(10);
        e.solicitar_entradas("usuario-a", 4).unwrap();
        e.solicitar_entradas("usuario-a", 2).unwrap();

        assert_eq!(e.entradas_solicitadas.len(), 1);
        assert_eq!(e.entradas_solicitadas[0].cantidad, 6);
        assert_eq!(e.entradas_disponibles, 4);
        invariante(&e);
    }

    #[test]
    fn solicitud_sin_disponibles_no_modifica_el_documento() {
        let mut e = evento(3);
        e.solicitar_entradas("usuario-a", 2).unwrap();
        let antes = e.clone();

        let err = e.solicitar_entradas("usuario-b", 2).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(e.entradas_disponibles, antes.entradas_disponibles);
        assert_eq!(e.entradas_solicitadas, antes.entradas_solicitadas);
        invariante(&e);
    }

    #[test]
    fn cantidad_no_positiva_es_invalida() {
        let mut e = evento(5);
        assert!(matches!(
            e.solicitar_entradas("usuario-a", 0),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            e.solicitar_entradas("usuario-a", -3),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            e.solicitar_entradas("", 1),
            Err(DomainError::Validation(_))
        ));
        invariante(&e);
    }

    #[test]
    fn participar_es_rechazado_si_ya_apuntado() {
        let mut e = evento(5);
        e.participar("trabajador-2").unwrap();
        assert!(matches!(
            e.participar("trabajador-2"),
            Err(DomainError::Conflict(_))
        ));
        assert_eq!(e.participantes, vec!["trabajador-2".to_string()]);
    }

    #[test]
    fn actualizar_no_puede_bajar_de_lo_comprometido() {
        let mut e = evento(10);
        e.solicitar_entradas("usuario-a", 6).unwrap();

        let err = e
            .actualizar(ActualizarEventoInput {
                nombre: e.nombre.clone(),
                descripcion: e.descripcion.clone(),
                fecha: e.fecha,
                entradas_totales: 5,
                trabajadores_minimos: 2,
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(e.entradas_totales, 10);
        invariante(&e);
    }

    #[test]
    fn actualizar_recalcula_disponibles() {
        let mut e = evento(10);
        e.solicitar_entradas("usuario-a", 6).unwrap();

        e.actualizar(ActualizarEventoInput {
            nombre: "Excursión larga".into(),
            descripcion: e.descripcion.clone(),
            fecha: e.fecha,
            entradas_totales: 6,
            trabajadores_minimos: 3,
        })
        .unwrap();

        assert_eq!(e.entradas_totales, 6);
        assert_eq!(e.entradas_disponibles, 0);
        invariante(&e);
    }

    #[test]
    fn escenario_completo_de_inventario() {
        let mut e = evento(10);
        e.solicitar_entradas("usuario-a", 4).unwrap();
        assert_eq!(e.entradas_disponibles, 6);

        e.solicitar_entradas("usuario-a", 2).unwrap();
        assert_eq!(e.entradas_solicitadas[0].cantidad, 6);
        assert_eq!(e.entradas_disponibles, 4);

        let shrink = ActualizarEventoInput {
            nombre: e.nombre.clone(),
            descripcion: e.descripcion.clone(),
            fecha: e.fecha,
            entradas_totales: 5,
            trabajadores_minimos: 2,
        };
        assert!(e.actualizar(shrink).is_err());

        e.actualizar(ActualizarEventoInput {
            nombre: e.nombre.clone(),
            descripcion: e.descripcion.clone(),
            fecha: e.fecha,
            entradas_totales: 6,
            trabajadores_minimos: 2,
        })
        .unwrap();
        assert_eq!(e.entradas_disponibles, 0);
        invariante(&e);
    }
}
