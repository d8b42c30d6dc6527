//! Background jobs for periodic maintenance tasks.
//!
//! Confidence documents are recomputed on demand elsewhere; this periodic
//! pass keeps them from going stale for learners whose activity happens
//! entirely through the external attempt-ingestion pipeline.

use sqlx::PgPool;
use std::time::Duration;
use tokio::time::interval;

use eklan_db::repositories::assignment;

use crate::confidence::service as confidence_service;

/// Start all background jobs
///
/// Returns a vector of join handles that can be awaited on shutdown
pub fn start_background_jobs(pool: PgPool) -> Vec<tokio::task::JoinHandle<()>> {
    vec![tokio::spawn(periodic_confidence_refresh_job(pool))]
}

/// Recompute every assigned learner's confidence document every 6 hours
///
/// One learner failing does not stop the pass; failures are counted and
/// logged.
async fn periodic_confidence_refresh_job(pool: PgPool) {
    // Wait 10 minutes before first run to avoid startup contention
    tokio::time::sleep(Duration::from_secs(600)).await;

    let mut interval = interval(Duration::from_secs(21600)); // 6 hours

    loop {
        interval.tick().await;

        match refresh_all_learners(&pool).await {
            Ok((refreshed, failed)) if failed > 0 => {
                tracing::warn!(
                    "Confidence refresh pass complete: {} refreshed, {} failed",
                    refreshed,
                    failed
                );
            }
            Ok((refreshed, _)) => {
                tracing::info!("Confidence refresh pass complete: {} refreshed", refreshed);
            }
            Err(e) => {
                tracing::error!("Failed to run confidence refresh pass: {}", e);
            }
        }
    }
}

/// Recompute confidence for every learner holding at least one assignment.
///
/// Returns (refreshed, failed) counts.
async fn refresh_all_learners(pool: &PgPool) -> Result<(usize, usize), sqlx::Error> {
    let learners = assignment::learners_with_assignments(pool).await?;

    let mut refreshed = 0;
    let mut failed = 0;
    for learner_id in learners {
        match confidence_service::compute_confidence(pool, learner_id, "periodic").await {
            Ok(_) => refreshed += 1,
            Err(e) => {
                failed += 1;
                tracing::error!("Confidence refresh failed for learner {learner_id}: {e}");
            }
        }
    }

    Ok((refreshed, failed))
}
