//! Scheduled daily digests for familiares.
//!
//! The morning run summarizes the day's actividades; the evening run adds
//! the day's incidencias. One email per familiar, one block per associated
//! usuario. A failed send is logged and never stops the remaining sends.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use aittea_domain::repository::{actividades, incidencias, personas};

use crate::config::{EmailConfig, NotifierConfig};
use crate::email::{DigestEntry, build_mailer, send_digest};

pub async fn scheduler(
    notifier: &NotifierConfig,
    email: &EmailConfig,
    pool: &SqlitePool,
) -> Result<JobScheduler, JobSchedulerError> {
    let sched = JobScheduler::new().await?;

    {
        let email = email.clone();
        let pool = pool.clone();
        sched
            .add(Job::new_async(
                notifier.morning_cron.as_str(),
                move |_uuid, _l| {
                    let email = email.clone();
                    let pool = pool.clone();
                    Box::pin(async move {
                        if let Err(err) = run_digest(&pool, &email, false).await {
                            tracing::error!(err = %err, "failed to send morning digests");
                        }
                    })
                },
            )?)
            .await?;
    }

    {
        let email = email.clone();
        let pool = pool.clone();
        sched
            .add(Job::new_async(
                notifier.evening_cron.as_str(),
                move |_uuid, _l| {
                    let email = email.clone();
                    let pool = pool.clone();
                    Box::pin(async move {
                        if let Err(err) = run_digest(&pool, &email, true).await {
                            tracing::error!(err = %err, "failed to send evening digests");
                        }
                    })
                },
            )?)
            .await?;
    }

    Ok(sched)
}

/// Digest rows for one familiar, keyed by usuario id.
type PorFamiliar = BTreeMap<String, (String, BTreeMap<String, DigestEntry>)>;

/// Collect today's digest entries grouped per familiar email.
///
/// The read is lock-free; records written while the digest is being
/// assembled may or may not appear.
pub async fn collect_digests(
    pool: &SqlitePool,
    include_incidencias: bool,
) -> anyhow::Result<Vec<(String, Vec<DigestEntry>)>> {
    let hoy = Utc::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now);
    let manana = hoy + Duration::days(1);

    let del_dia = actividades::list_by_rango(pool, hoy, manana).await?;

    // usuario -> (actividad names, incidencia types)
    let mut por_usuario: BTreeMap<String, (Vec<String>, Vec<String>)> = BTreeMap::new();

    for actividad in &del_dia {
        for usuario in &actividad.realizada_por {
            por_usuario
                .entry(usuario.clone())
                .or_default()
                .0
                .push(actividad.nombre.clone());
        }
    }

    if include_incidencias {
        for incidencia in incidencias::list_by_rango(pool, hoy, manana).await? {
            por_usuario
                .entry(incidencia.usuario.clone())
                .or_default()
                .1
                .push(incidencia.tipo_incidencia.to_string());
        }
    }

    let usuario_ids: Vec<String> = por_usuario.keys().cloned().collect();
    let nombres = personas::refs(pool, &usuario_ids).await?;

    let mut por_familiar: PorFamiliar = BTreeMap::new();

    for (usuario_id, (acts, incs)) in por_usuario {
        let usuario_nombre = nombres
            .get(&usuario_id)
            .map(|r| format!("{} {}", r.nombre, r.apellido))
            .unwrap_or_else(|| usuario_id.clone());

        for familiar in personas::familiares_de_usuario(pool, &usuario_id).await? {
            let (_, entries) = por_familiar
                .entry(familiar.id.clone())
                .or_insert_with(|| (familiar.email.clone(), BTreeMap::new()));

            let entry = entries.entry(usuario_id.clone()).or_insert_with(|| DigestEntry {
                usuario_nombre: usuario_nombre.clone(),
                actividades: Vec::new(),
                incidencias: Vec::new(),
            });
            entry.actividades.extend(acts.iter().cloned());
            entry.incidencias.extend(incs.iter().cloned());
        }
    }

    Ok(por_familiar
        .into_values()
        .map(|(email, entries)| (email, entries.into_values().collect()))
        .collect())
}

/// Assemble and send one digest run. Per-familiar failures are logged and
/// skipped.
pub async fn run_digest(
    pool: &SqlitePool,
    email: &EmailConfig,
    include_incidencias: bool,
) -> anyhow::Result<()> {
    let digests = collect_digests(pool, include_incidencias).await?;

    if digests.is_empty() {
        tracing::debug!("no digests to send");
        return Ok(());
    }

    let mailer = build_mailer(email)?;
    let subject = if include_incidencias {
        "Resumen del día: actividades e incidencias"
    } else {
        "Actividades programadas para hoy"
    };

    for (to_email, entries) in digests {
        if let Err(err) = send_digest(&mailer, email, &to_email, subject, &entries) {
            tracing::error!(err = %err, to = %to_email, "failed to send digest, continuing");
        }
    }

    Ok(())
}
