#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions)]
//! `barpanel` binary: config loading, logging setup, and command dispatch.

mod cli;
mod error_fmt;
mod input;
mod term;

use std::path::Path;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel as xch;
use eyre::WrapErr;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use barpanel_client::{HttpActions, NotificationFeed, SimulatedActions};
use barpanel_config::Config;
use barpanel_core::{OperatorInput, Panel, PanelCfg};
use barpanel_traits::{DeviceActions, HOSE_COUNT, MonotonicClock};

use crate::cli::{Cli, Commands, FILE_GUARD};
use crate::error_fmt::{format_error_json, humanize};
use crate::term::TermPresentation;

fn main() {
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error reporting: {e}");
    }
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        if cli.json {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> eyre::Result<()> {
    let cfg = load_config(&cli.config)?;
    init_tracing(cli.json, &effective_level(cli, &cfg), cfg.logging.file.as_deref());
    tracing::debug!(config = %cli.config.display(), "configuration loaded");

    match &cli.cmd {
        Commands::Run { simulate, no_resync } => run_panel(&cfg, *simulate, *no_resync),
        Commands::Hoses => cmd_hoses(&cfg),
        Commands::SelfCheck => cmd_self_check(&cfg),
    }
}

fn load_config(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = barpanel_config::load_toml(&text)
        .wrap_err_with(|| format!("parse config {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// RUST_LOG wins, then the config file, then --log-level.
fn effective_level(cli: &Cli, cfg: &Config) -> String {
    std::env::var("RUST_LOG")
        .ok()
        .or_else(|| cfg.logging.level.clone())
        .unwrap_or_else(|| cli.log_level.clone())
}

fn init_tracing(json: bool, level: &str, log_file: Option<&str>) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    // Log file output is always JSON lines; the console follows --json.
    let file_writer = log_file.map(|p| {
        let p = Path::new(p);
        let dir = p
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = p
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("barpanel.log"));
        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
        let _ = FILE_GUARD.set(guard);
        writer
    });

    let registry = tracing_subscriber::registry().with(filter);
    match (json, file_writer) {
        (true, Some(w)) => registry
            .with(fmt::layer().json().with_target(false).with_writer(std::io::stderr))
            .with(fmt::layer().json().with_ansi(false).with_writer(w))
            .init(),
        (true, None) => registry
            .with(fmt::layer().json().with_target(false).with_writer(std::io::stderr))
            .init(),
        (false, Some(w)) => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .with(fmt::layer().json().with_ansi(false).with_writer(w))
            .init(),
        (false, None) => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init(),
    }
}

fn run_panel(cfg: &Config, simulate: bool, no_resync: bool) -> eyre::Result<()> {
    let panel_cfg = PanelCfg::from(cfg);
    let poll_on_start = cfg.panel.hose_display;
    let (input_tx, input_rx) = xch::unbounded();

    // Ctrl-C means "stop the machine, then exit", matching the physical
    // emergency-stop button.
    let ctrlc_tx = input_tx.clone();
    ctrlc::set_handler(move || {
        let _ = ctrlc_tx.send(OperatorInput::EmergencyStop);
        let _ = ctrlc_tx.send(OperatorInput::Shutdown);
    })
    .wrap_err("install Ctrl-C handler")?;

    let _stdin = input::spawn_stdin_reader(input_tx);
    println!("{}", input::USAGE);

    if simulate {
        tracing::info!("running against the simulated backend");
        let (event_tx, event_rx) = xch::unbounded();
        // Keep the sender alive for the whole run; a closed event channel
        // reads as a dead feed and stops the loop.
        let _feed_tx = event_tx;
        let mut panel = Panel::new(
            panel_cfg,
            SimulatedActions::new(),
            TermPresentation::new(),
            MonotonicClock,
            event_rx,
            input_rx,
        );
        if !no_resync {
            panel.resync();
        }
        if poll_on_start {
            panel.handle_poll_tick();
        }
        panel.run()
    } else {
        let actions = HttpActions::new(
            &cfg.server.base_url,
            Duration::from_millis(cfg.server.timeout_ms),
        )?;
        let feed = NotificationFeed::connect(
            &cfg.server.base_url,
            &cfg.feed.path,
            Duration::from_millis(cfg.feed.reconnect_ms),
        );
        let mut panel = Panel::new(
            panel_cfg,
            actions,
            TermPresentation::new(),
            MonotonicClock,
            feed.events(),
            input_rx,
        );
        if !no_resync {
            panel.resync();
        }
        if poll_on_start {
            panel.handle_poll_tick();
        }
        panel.run()
    }
}

fn cmd_hoses(cfg: &Config) -> eyre::Result<()> {
    let mut actions = HttpActions::new(
        &cfg.server.base_url,
        Duration::from_millis(cfg.server.timeout_ms),
    )?;
    let snapshot = actions
        .hose_status()
        .map_err(|e| eyre::eyre!("Hose status refresh failed: {e}"))?;
    for hose in 1..=HOSE_COUNT {
        match snapshot.get(hose) {
            Some(pct) => {
                let marker = if pct < cfg.panel.low_threshold_pct {
                    "  LOW"
                } else {
                    ""
                };
                println!("hose {hose}: {pct:>5.1}%{marker}");
            }
            None => println!("hose {hose}:   n/a"),
        }
    }
    Ok(())
}

fn cmd_self_check(cfg: &Config) -> eyre::Result<()> {
    let mut actions = HttpActions::new(
        &cfg.server.base_url,
        Duration::from_millis(cfg.server.timeout_ms),
    )?;
    let report = actions
        .mixing_status()
        .map_err(|e| eyre::eyre!("Self check failed: {e}"))?;
    println!(
        "backend at {} answers; mixing={}",
        cfg.server.base_url, report.is_mixing
    );
    Ok(())
}
