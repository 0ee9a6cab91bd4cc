mod cli;
mod render;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

use slotgrab_core::{
    load_config, validate_config, AcquisitionOrchestrator, CaptchaSolver, Config, Nj12320Portal,
    OrchestratorConfig, PortalCipher, SanitizedConfig, TesseractSolver,
};

use cli::Args;

type FilterHandle = reload::Handle<EnvFilter, Registry>;

#[tokio::main]
async fn main() {
    // Logging comes first so config load failures are reported too.
    let filter = init_logging();

    if let Err(e) = run(filter).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn default_directive(debug: bool) -> &'static str {
    if debug {
        "info,slotgrab_core=debug,slotgrab=debug"
    } else {
        "info"
    }
}

fn env_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive(debug).into())
}

/// Install the subscriber at `info`; the filter can be raised once the
/// config says `debugMode`.
fn init_logging() -> FilterHandle {
    let (filter, handle) = reload::Layer::new(env_filter(false));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
    handle
}

/// Load and validate the config, applying command line overrides.
fn startup_config(args: &Args) -> Result<Config> {
    let mut config = load_config(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;
    if args.debug {
        config.debug_mode = true;
    }
    if args.once {
        config.loop_enabled = false;
    }

    validate_config(&config).with_context(|| format!("Invalid config in {:?}", args.config))?;
    Ok(config)
}

async fn run(filter: FilterHandle) -> Result<()> {
    let args = Args::parse();

    let config = startup_config(&args)?;
    if config.debug_mode {
        filter
            .reload(env_filter(true))
            .context("Failed to raise log level")?;
    }
    info!("Loaded configuration from {:?}", args.config);

    if config.debug_mode {
        let sanitized = SanitizedConfig::from(&config);
        debug!(
            config = %serde_json::to_string(&sanitized).unwrap_or_default(),
            "Configuration"
        );
    }

    let portal = Nj12320Portal::new(
        config.base_url.clone(),
        Duration::from_secs(u64::from(config.timeout_secs)),
    )
    .context("Failed to create portal client")?;
    info!("Using portal at {}", config.base_url);

    let solver = TesseractSolver::new(config.tesseract.clone());
    solver
        .validate()
        .await
        .context("Captcha solver is not usable")?;

    let cipher = PortalCipher::new().context("Failed to load portal public key")?;

    let orchestrator = AcquisitionOrchestrator::new(
        OrchestratorConfig::from(&config),
        Arc::new(portal),
        Arc::new(solver),
        Arc::new(cipher),
    );

    if config.loop_enabled {
        println!(
            "Polling every {} ms until a slot is found (mode: {})",
            config.interval, config.mode
        );
    } else {
        println!("Single acquisition (mode: {})", config.mode);
    }

    let outcome = orchestrator.run().await;
    print!("{}", render::render_outcome(&outcome));

    Ok(())
}
