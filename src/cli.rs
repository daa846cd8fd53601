//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use crate::adapters::alpha_vantage_adapter::AlphaVantageAdapter;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::env_config_adapter::EnvConfigAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::memory_cache_adapter::MemoryCacheAdapter;
use crate::adapters::svg_chart::SvgChartAdapter;
#[cfg(feature = "sqlite")]
use crate::adapters::unavailable_cache_adapter::UnavailableCacheAdapter;
use crate::adapters::CacheBackend;
use crate::domain::config::AppConfig;
use crate::domain::error::StockviewError;
use crate::domain::frame::SplitFrame;
use crate::domain::series_service::SeriesService;
use crate::ports::cache_port::CachePort;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "stockview", about = "Daily stock prices with moving averages")]
pub struct Cli {
    /// INI file consulted for keys not set in the environment
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the web server
    Serve {
        /// Address to listen on, overriding BIND
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Print the enriched series for a symbol as split JSON
    Series {
        symbol: String,
        #[arg(long)]
        pretty: bool,
    },
    /// Render the chart for a symbol and print its path
    Render { symbol: String },
    /// Drop the cached series for a symbol
    Invalidate { symbol: String },
    /// Print the effective configuration
    Config,
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match load_config(cli.config.as_ref()) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let app = match AppConfig::from_port(&config) {
        Ok(app) => app,
        Err(e) => return report(&e),
    };

    match cli.command {
        Command::Serve { bind } => run_serve(&app, &config, bind),
        Command::Series { symbol, pretty } => run_series(&app, &config, &symbol, pretty),
        Command::Render { symbol } => run_render(&app, &config, &symbol),
        Command::Invalidate { symbol } => run_invalidate(&app, &config, &symbol),
        Command::Config => run_show_config(&app),
    }
}

/// Environment variables, falling back to the INI file when one is given.
pub fn load_config(path: Option<&PathBuf>) -> Result<EnvConfigAdapter, ExitCode> {
    let env = EnvConfigAdapter::from_env();
    let Some(path) = path else {
        return Ok(env);
    };
    match FileConfigAdapter::from_file(path) {
        Ok(file) => Ok(env.with_fallback(Box::new(file))),
        Err(e) => {
            let err = StockviewError::ConfigInvalid {
                key: "--config".to_string(),
                reason: format!("{}: {e}", path.display()),
            };
            Err(report(&err))
        }
    }
}

/// Wire the configured data source, cache and chart adapters.
pub fn build_service(
    app: &AppConfig,
    config: &dyn ConfigPort,
) -> Result<SeriesService, StockviewError> {
    let data: Arc<dyn DataPort + Send + Sync> = match &app.data_dir {
        Some(dir) => Arc::new(CsvAdapter::new(dir.clone())),
        None => Arc::new(AlphaVantageAdapter::new(
            &app.api_base_url,
            app.api_key.as_deref(),
            app.fetch_timeout,
        )?),
    };
    let cache = build_cache(&app.cache_url, config)?;
    let chart = Arc::new(SvgChartAdapter::new(app.images_dir.clone()));

    tracing::info!(
        source = data.name(),
        cache = %app.cache_url,
        images = %app.images_dir.display(),
        "service configured"
    );
    Ok(SeriesService::new(data, cache, chart, app.service.clone()))
}

fn build_cache(
    url: &str,
    config: &dyn ConfigPort,
) -> Result<Arc<dyn CachePort + Send + Sync>, StockviewError> {
    match CacheBackend::parse(url)? {
        CacheBackend::Memory => Ok(Arc::new(MemoryCacheAdapter::new())),
        #[cfg(feature = "sqlite")]
        CacheBackend::SqliteMemory => Ok(degrade_on_failure(
            url,
            crate::adapters::sqlite_cache_adapter::SqliteCacheAdapter::in_memory(),
        )),
        #[cfg(feature = "sqlite")]
        CacheBackend::SqliteFile(path) => Ok(degrade_on_failure(
            url,
            crate::adapters::sqlite_cache_adapter::SqliteCacheAdapter::open(path, config),
        )),
        #[cfg(not(feature = "sqlite"))]
        _ => {
            let _ = config;
            Err(StockviewError::ConfigInvalid {
                key: "CACHE_URL".to_string(),
                reason: "sqlite support not compiled in; use memory://".to_string(),
            })
        }
    }
}

/// A store that cannot be opened is served as an always-failing cache so
/// lookups degrade to upstream fetches.
#[cfg(feature = "sqlite")]
fn degrade_on_failure<C>(
    url: &str,
    opened: Result<C, StockviewError>,
) -> Arc<dyn CachePort + Send + Sync>
where
    C: CachePort + Send + Sync + 'static,
{
    match opened {
        Ok(cache) => Arc::new(cache),
        Err(err) => {
            tracing::warn!(cache = %url, error = %err, "cache store unavailable, every lookup will miss");
            Arc::new(UnavailableCacheAdapter::new(err.to_string()))
        }
    }
}

fn report(err: &StockviewError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

fn run_series(app: &AppConfig, config: &dyn ConfigPort, symbol: &str, pretty: bool) -> ExitCode {
    let result = build_service(app, config).and_then(|service| service.get_series(symbol));
    let series = match result {
        Ok(s) => s,
        Err(e) => return report(&e),
    };

    let frame = SplitFrame::from_series(&series);
    let json = if pretty {
        serde_json::to_string_pretty(&frame).map_err(|e| StockviewError::data(e.to_string()))
    } else {
        frame.to_json()
    };
    match json {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn run_render(app: &AppConfig, config: &dyn ConfigPort, symbol: &str) -> ExitCode {
    match build_service(app, config).and_then(|service| service.render(symbol)) {
        Ok(artifact) => {
            println!("{}", artifact.path.display());
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn run_invalidate(app: &AppConfig, config: &dyn ConfigPort, symbol: &str) -> ExitCode {
    match build_service(app, config).and_then(|service| service.invalidate(symbol)) {
        Ok(true) => {
            println!("Removed cached series for {}", symbol.trim().to_uppercase());
            ExitCode::SUCCESS
        }
        Ok(false) => {
            println!("No cached series for {}", symbol.trim().to_uppercase());
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn run_show_config(app: &AppConfig) -> ExitCode {
    println!("API_KEY              = {}", app.masked_api_key());
    println!("API_BASE_URL         = {}", app.api_base_url);
    println!("DATA_DIR             = {}", app
        .data_dir
        .as_ref()
        .map(|d| d.display().to_string())
        .unwrap_or_else(|| "(unset)".to_string()));
    println!("CACHE_URL            = {}", app.cache_url);
    println!("CACHE_TTL_SECONDS    = {}", app.service.cache_ttl.as_secs());
    println!("SHORT_WINDOW         = {}", app.service.short_window);
    println!("LONG_WINDOW          = {}", app.service.long_window);
    println!("PLOT_LOOKBACK_POINTS = {}", app.service.plot_lookback);
    println!("IMAGES_DIR           = {}", app.images_dir.display());
    println!("FETCH_TIMEOUT_SECONDS= {}", app.fetch_timeout.as_secs());
    println!("BIND                 = {}", app.bind);
    ExitCode::SUCCESS
}

#[cfg(feature = "web")]
fn run_serve(app: &AppConfig, config: &dyn ConfigPort, bind: Option<String>) -> ExitCode {
    use crate::adapters::web::{serve, AppState};

    // The blocking HTTP client must be built before the runtime starts.
    let service = match build_service(app, config) {
        Ok(s) => Arc::new(s),
        Err(e) => return report(&e),
    };
    let state = AppState::new(service, app.images_dir.clone());
    let addr = bind.unwrap_or_else(|| app.bind.clone());

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => return report(&StockviewError::Io(e)),
    };
    match rt.block_on(serve(state, &addr)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

#[cfg(not(feature = "web"))]
fn run_serve(_app: &AppConfig, _config: &dyn ConfigPort, _bind: Option<String>) -> ExitCode {
    eprintln!("error: web feature not enabled. Rebuild with --features web");
    ExitCode::from(1)
}
