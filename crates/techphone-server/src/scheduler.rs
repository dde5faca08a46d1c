//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring dashboard-stats refresh.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use techphone_db::DashboardStats;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<techphone_core::AppConfig>,
    stats: Arc<RwLock<Option<DashboardStats>>>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_stats_refresh_job(&scheduler, pool, &config.stats_refresh_cron, stats).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the dashboard-stats refresh job.
///
/// The schedule comes from `TECHPHONE_STATS_REFRESH_CRON` (default: every
/// five minutes). Each run recomputes the storefront-wide aggregates and
/// swaps the shared snapshot that `/api/admin/stats` serves.
async fn register_stats_refresh_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    cron: &str,
    stats: Arc<RwLock<Option<DashboardStats>>>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let stats = Arc::clone(&stats);

        Box::pin(async move {
            refresh_stats_snapshot(&pool, &stats).await;
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Recompute the dashboard aggregates and replace the shared snapshot.
///
/// A failed run keeps the previous snapshot in place; the endpoint keeps
/// serving slightly stale numbers rather than erroring.
pub async fn refresh_stats_snapshot(pool: &PgPool, stats: &RwLock<Option<DashboardStats>>) {
    match techphone_db::dashboard_stats(pool).await {
        Ok(fresh) => {
            tracing::debug!(
                active_products = fresh.active_products,
                total_orders = fresh.total_orders,
                "scheduler: dashboard stats refreshed"
            );
            let mut snapshot = stats.write().await;
            *snapshot = Some(fresh);
        }
        Err(e) => {
            tracing::error!(error = %e, "scheduler: dashboard stats refresh failed");
        }
    }
}
