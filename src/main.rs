// letter-rendering-service/src/main.rs

use anyhow::Context;
use letter_rendering::batch::BatchRenderer;
use letter_rendering::config::Config;
use letter_rendering::{DocumentAssembler, LetterNumberGenerator};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Print to stderr BEFORE logging initialization to catch early failures
    eprintln!("Starting letter-rendering-service...");

    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("FATAL: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.service.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!(
        service = %config.service.name,
        version = env!("CARGO_PKG_VERSION"),
        input = %config.batch.input_path,
        "Starting Letter Rendering Service"
    );

    let numbers = LetterNumberGenerator::new(
        config.rendering.default_letter_code.clone(),
        config.rendering.default_number_pattern.clone(),
    );
    let assembler = DocumentAssembler::new(config.rendering.render_options(), numbers)
        .context("Failed to register letter template")?;
    let renderer = BatchRenderer::new(assembler, config.batch.max_concurrent_renders);

    let input = tokio::fs::read(&config.batch.input_path)
        .await
        .with_context(|| format!("Failed to read batch file {}", config.batch.input_path))?;

    let response = renderer.handle_message(&input).await;
    let output = serde_json::to_vec_pretty(&response).context("Failed to serialize batch response")?;

    match &config.batch.output_path {
        Some(path) => tokio::fs::write(path, &output)
            .await
            .with_context(|| format!("Failed to write batch results to {}", path))?,
        None => println!("{}", String::from_utf8_lossy(&output)),
    }

    if response.status == "error" {
        error!(batch_id = %response.batch_id, "No letters were rendered");
        std::process::exit(2);
    }

    info!(batch_id = %response.batch_id, status = %response.status, "Batch complete");
    Ok(())
}
