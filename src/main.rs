use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use whispai::application::services::{
    DeliveryHandler, ModelCache, OutputFormatter, TranscriptionPipeline,
};
use whispai::infrastructure::audio::{ModelLoaderFactory, SymphoniaProbe};
use whispai::infrastructure::llm::ChatCompletionsClient;
use whispai::infrastructure::messaging::{AmqpJobConsumer, QueueTopology, connect_with_retry};
use whispai::infrastructure::observability::{TracingConfig, init_tracing};
use whispai::infrastructure::persistence::{PgJobRepository, create_pool, run_migrations};
use whispai::infrastructure::storage::AudioStoreFactory;
use whispai::presentation::config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (environment, settings) = Settings::load().context("failed to load settings")?;

    init_tracing(
        &TracingConfig::from_settings(environment.as_str(), &settings.logging),
        &settings.broker.queue,
    );

    let pool = create_pool(&settings.database).await?;
    run_migrations(&pool).await?;
    let job_repository = Arc::new(PgJobRepository::new(pool));

    let audio_store = AudioStoreFactory::create(&settings.storage)?;

    let loader = ModelLoaderFactory::create(&settings.transcription)?;
    let models = Arc::new(ModelCache::new(loader));
    if settings.worker.preload_default_tier {
        let lease = models.acquire(settings.transcription.default_tier).await?;
        tracing::info!(tier = %lease.tier(), "Default transcription model preloaded");
    }

    let llm_client = Arc::new(ChatCompletionsClient::new(&settings.llm)?);

    let scratch_dir = settings
        .worker
        .scratch_dir
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);
    tokio::fs::create_dir_all(&scratch_dir)
        .await
        .with_context(|| format!("failed to create scratch dir {}", scratch_dir.display()))?;

    let pipeline = Arc::new(TranscriptionPipeline::new(
        audio_store,
        job_repository,
        models,
        Arc::new(SymphoniaProbe),
        OutputFormatter::new(llm_client),
        scratch_dir,
    ));
    let handler = Arc::new(DeliveryHandler::new(
        pipeline,
        settings.broker.requeue_malformed,
    ));

    let connection = connect_with_retry(
        &settings.broker.amqp_uri(),
        settings.broker.connect_retries,
    )
    .await
    .context("failed to connect to the message broker")?;

    let topology = QueueTopology::new(&settings.broker.queue)
        .with_dead_letter_exchange(settings.broker.dead_letter_exchange.clone());
    let consumer = AmqpJobConsumer::new(
        connection,
        topology,
        settings.broker.prefetch,
        &settings.broker.consumer_tag,
        handler,
    );

    consumer.run(shutdown_signal()).await?;

    tracing::info!("Worker stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
