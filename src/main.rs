use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;

use globalnews::application::ports::{JobRepository, TranslationProvider};
use globalnews::application::services::{
    JobScheduler, OrchestratorSettings, PhaseWeights, TranslationOrchestrator, TranslationWorker,
};
use globalnews::infrastructure::decorators::{TimeoutJobRepository, TimeoutTranslationProvider};
use globalnews::infrastructure::observability::{TracingConfig, init_tracing};
use globalnews::infrastructure::persistence::{InMemoryJobRepository, PgJobRepository, create_pool};
use globalnews::infrastructure::translation::{HttpTranslationClient, ScaffoldTranslationProvider};
use globalnews::presentation::{AppState, Environment, ScaffoldConfig, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load configuration")?;

    init_tracing(&TracingConfig::new(
        environment.as_str(),
        settings.logging.enable_json,
        settings.logging.level.clone(),
    ));

    let job_repository = build_job_repository(&settings).await?;
    let provider = build_provider(&settings)?;

    let scheduler = Arc::new(JobScheduler::new(
        Arc::clone(&job_repository),
        settings.worker.estimated_seconds_per_task,
    ));
    let orchestrator = Arc::new(TranslationOrchestrator::new(
        Arc::clone(&provider),
        Arc::clone(&job_repository),
        OrchestratorSettings {
            weights: PhaseWeights::default(),
            summary_max_length: settings.translation.summary_max_length,
            summary_style: settings.translation.summary_style,
        },
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let workers: Vec<_> = (1..=settings.worker.count)
        .map(|n| {
            let worker = TranslationWorker::new(
                format!("worker-{}-{}", std::process::id(), n),
                Arc::clone(&scheduler),
                Arc::clone(&orchestrator),
                Arc::clone(&job_repository),
                settings.worker.poll_interval(),
            );
            tokio::spawn(worker.run(shutdown_rx.clone()))
        })
        .collect();
    tracing::info!(count = workers.len(), "Translation workers spawned");

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    let router = create_router(AppState::new(job_repository, provider, settings));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    shutdown_tx.send(true).ok();
    for result in futures::future::join_all(workers).await {
        if let Err(e) = result {
            tracing::error!(error = %e, "Translation worker panicked");
        }
    }
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn build_job_repository(settings: &Settings) -> anyhow::Result<Arc<dyn JobRepository>> {
    let store_timeout = settings.worker.store_timeout();

    let inner: Arc<dyn JobRepository> = match settings.database.url.as_deref() {
        Some(url) => {
            let pool = create_pool(url, settings.database.max_connections, store_timeout)
                .await
                .context("Failed to connect to PostgreSQL")?;
            Arc::new(PgJobRepository::new(pool))
        }
        None => {
            tracing::warn!("No database configured, jobs are kept in memory only");
            Arc::new(InMemoryJobRepository::new())
        }
    };

    Ok(Arc::new(TimeoutJobRepository::new(inner, store_timeout)))
}

fn build_provider(settings: &Settings) -> anyhow::Result<Arc<TimeoutTranslationProvider>> {
    let scaffold = ScaffoldConfig::from_env();
    let timeout = settings.translation.request_timeout();

    let inner: Arc<dyn TranslationProvider> = if scaffold.enabled {
        tracing::info!(
            delay_ms = scaffold.mock_response_delay.as_millis() as u64,
            "Scaffold mode enabled, using offline translation provider"
        );
        Arc::new(ScaffoldTranslationProvider::new(scaffold.mock_response_delay))
    } else {
        Arc::new(
            HttpTranslationClient::new(settings.translation.base_url.clone(), timeout)
                .context("Failed to build translation client")?,
        )
    };

    // Just past the client's own timeout.
    Ok(Arc::new(TimeoutTranslationProvider::new(
        inner,
        timeout + Duration::from_secs(1),
    )))
}
