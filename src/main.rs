use radarloop::cli::Args;
use radarloop::console::{self, ConsoleRenderer};
use radarloop::core::{Endpoints, Epoch, FrameController, FrameStore, HttpClient, ManifestFetcher, Workers};
use radarloop::paths::{self, PathConfig};
use radarloop::server::FrameServer;
use radarloop::settings::{SETTINGS_FILE, Settings};

use anyhow::Context;
use clap::Parser;
use log::{debug, info, warn};
use std::io::BufReader;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Create path configuration from CLI args and environment
    let path_config = PathConfig::from_env_and_cli(args.config_dir.clone(), args.cache_dir.clone());

    init_logging(&args, &path_config)?;
    info!("Radarloop {} starting...", env!("CARGO_PKG_VERSION"));
    debug!("Command-line args: {:?}", args);

    // Frame server mode needs neither settings nor cache
    if let Some(root) = &args.serve {
        let addr = format!("0.0.0.0:{}", args.port);
        println!("Serving {} on http://{}", root.display(), addr);
        FrameServer::new(root).run(&addr);
    }

    let settings_path = paths::config_file(SETTINGS_FILE, &path_config);
    info!("Config path: {}", settings_path.display());
    let mut settings = match Settings::load(&settings_path) {
        Ok(s) => s,
        Err(e) => {
            warn!("{:#}, using defaults", e);
            Settings::default()
        }
    };

    // CLI overrides
    if let Some(url) = &args.manifest_url {
        settings.manifest_url = url.clone();
    }
    if let Some(url) = &args.base_url {
        settings.base_url = url.clone();
    }
    if let Some(dir) = &args.cache_dir {
        settings.cache_dir = Some(dir.clone());
    }
    if let Some(n) = args.workers {
        settings.workers_override = n;
    }
    if args.save_settings {
        settings.save(&settings_path)?;
        info!("Settings saved to {}", settings_path.display());
    }

    let path_config = PathConfig {
        cache_dir: settings.cache_dir.clone(),
        ..path_config
    };
    if let Err(e) = paths::ensure_dirs(&path_config) {
        warn!("Failed to create application directories: {:#}", e);
    }
    let cache_dir = paths::frame_cache_dir(&path_config);
    info!("Frame cache: {}", cache_dir.display());

    let http = Arc::new(HttpClient::new(settings.connect_timeout(), settings.read_timeout()));
    let store = Arc::new(FrameStore::new(cache_dir, http.clone()));
    let epoch = Epoch::new();
    let workers = Arc::new(
        Workers::new(settings.worker_count(), epoch.shared()).context("Failed to start worker threads")?,
    );

    let mut controller = FrameController::new(
        Endpoints {
            manifest_url: settings.manifest_url.clone(),
            base_url: settings.base_url.clone(),
        },
        ManifestFetcher::new(http),
        store,
        workers,
        epoch,
    );
    controller.surface_ready(Box::new(ConsoleRenderer::new(std::io::stdout())));

    println!("n = next, p = previous, s = status, r = reload, q = quit");
    let commands = console::spawn_input(BufReader::new(std::io::stdin()));
    console::run(&mut controller, commands);

    let stats = controller.store().stats();
    info!(
        "Exiting: {} hit(s), {} download(s), {} failure(s), hit rate {:.0}%",
        stats.hits(),
        stats.downloads(),
        stats.failures(),
        stats.hit_rate() * 100.0
    );
    Ok(())
}

/// 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
fn init_logging(args: &Args, path_config: &PathConfig) -> anyhow::Result<()> {
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .as_ref()
            .cloned()
            .unwrap_or_else(|| paths::data_file("radarloop.log", path_config));
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .filter_module("rouille", log::LevelFilter::Info)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Respects RUST_LOG if set
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level.as_str()))
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}
