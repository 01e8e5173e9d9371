//! # Main Entry Point
//!
//! Loads configuration, sets up logging, connects the bus, starts a session
//! and runs the requested command until it finishes or Ctrl-C is pressed.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use marionette::application::logging;
use marionette::application::session::{Session, Setup};
use marionette::domain::config::{AppConfig, BusBackend};
use marionette::domain::traits::Bus;
use marionette::infrastructure::memory::MemoryBus;
use marionette::interface::cli::{Cli, Command};
use marionette::interface::commands::{greet, listen, say};
use marionette::interface::event_log::EventLog;
use marionette::strings::logs;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration (defaults when the file is absent)
    let config = if cli.config.exists() {
        AppConfig::load(&cli.config)?
    } else {
        AppConfig::default()
    };

    // 2. Logging Setup
    let _guard = logging::init(&config.logging)?;
    tracing::info!("{}", logs::STARTING);

    // 3. Bus
    let bus = connect_bus(&cli, &config).await?;

    // 4. Session
    let event_log = Arc::new(EventLog::new(matches!(cli.command, Command::Listen { .. })));
    let session = Session::start(bus, event_log.clone(), &config)
        .await
        .context("Failed to start dispatch loop")?;

    let shutdown = session.cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("{}", logs::SHUTDOWN);
            shutdown.cancel();
        }
    });

    let dialogflow_key = match &config.dialogflow.key_file {
        Some(path) => Some(
            std::fs::read_to_string(path).with_context(|| logs::key_file_read_fail(path))?,
        ),
        None => None,
    };
    session
        .setup(&Setup::from_config(&config, dialogflow_key))
        .await?;

    // 5. Run Command
    let result = match &cli.command {
        Command::Greet => greet::handle_greet(session.dialogue(), &config.dialogue)
            .await
            .map(|_| ()),
        Command::Say {
            text,
            emotion,
            animated,
        } => say::handle_say(session.robot(), text, *emotion, *animated)
            .await
            .map(|_| ()),
        Command::Listen { seconds } => listen::handle_listen(
            &event_log,
            &session.cancellation(),
            seconds.map(Duration::from_secs),
        )
        .await
        .map(|_| ()),
    };

    // A dead bus outranks whatever the command made of it.
    session.stop().await.context(logs::DISPATCH_FAILED)?;
    result
}

async fn connect_bus(cli: &Cli, config: &AppConfig) -> Result<Arc<dyn Bus>> {
    if cli.simulate || config.bus.backend == BusBackend::Memory {
        tracing::info!("{}", logs::BUS_SIMULATED);
        let bus = MemoryBus::echoing().with_answers(cli.answers.iter().cloned());
        return Ok(Arc::new(bus));
    }

    tracing::info!("{}", logs::bus_connecting(&config.bus.url));
    #[cfg(feature = "redis")]
    {
        let bus = marionette::infrastructure::redis_bus::RedisBus::connect(&config.bus.url)
            .await
            .with_context(|| logs::bus_connecting(&config.bus.url))?;
        Ok(Arc::new(bus))
    }
    #[cfg(not(feature = "redis"))]
    {
        anyhow::bail!("built without the redis feature, run with --simulate")
    }
}
