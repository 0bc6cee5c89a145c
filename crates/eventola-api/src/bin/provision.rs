// Administrative provisioning binary
//
// Connects to the database named by DATABASE_URL and runs every schema and
// bucket step. Individual step failures are logged and do not stop the run;
// only a connection failure aborts.

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eventola_storage::{run_provisioning, Database};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "provision=info,eventola_storage=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL environment variable required")?;
    let db = Database::from_url(&database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database, provisioning...");

    let report = run_provisioning(db.pool()).await;

    for step in &report.succeeded {
        tracing::info!(step = %step, "ok");
    }
    for (step, error) in &report.failed {
        tracing::warn!(step = %step, error = %error, "failed");
    }
    tracing::info!(
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        "Provisioning complete"
    );

    if !report.all_ok() {
        // Partial failure is reported but not fatal; re-runs are expected
        // to converge on an already-provisioned database
        tracing::warn!("Some provisioning steps failed; see log above");
    }

    Ok(())
}
