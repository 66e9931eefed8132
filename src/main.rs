use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use taskd::{cli, config::ServerConfig, rest, store::TaskStore, AppContext};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "taskd",
    about = "taskd — task-list service with an HTTP API and terminal client",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port
    #[arg(long, env = "TASKD_PORT")]
    port: Option<u16>,

    /// Data directory for config.toml and log files
    #[arg(long, env = "TASKD_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TASKD_LOG")]
    log: Option<String>,

    /// Bind address for the HTTP server (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "TASKD_BIND")]
    bind_address: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "TASKD_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the backend server (default when no subcommand given).
    ///
    /// Runs taskd in the foreground. The store starts empty unless --seed
    /// is passed.
    ///
    /// Examples:
    ///   taskd serve
    ///   taskd serve --seed
    ///   taskd
    Serve {
        /// Preload the store with the three demo tasks
        #[arg(long)]
        seed: bool,
    },
    /// Interactive terminal client against a running backend.
    ///
    /// Fetches backend health and the task list on startup, then accepts
    /// add/toggle/refresh commands. The target URL comes from TASKD_API_URL
    /// or `api_base_url` in config.toml.
    ///
    /// Examples:
    ///   taskd ui
    ///   TASKD_API_URL=http://localhost:3001 taskd ui
    Ui,
    /// Show backend status (reachable, task count).
    ///
    /// Queries /api/health and /api/tasks and prints a summary line.
    /// Exits 0 if healthy, 1 if unreachable.
    ///
    /// Examples:
    ///   taskd status
    ///   taskd status --json
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // ── Logging setup ────────────────────────────────────────────────────────
    // Init once — must happen before any tracing calls.
    let log_level = args.log.as_deref().unwrap_or("info").to_owned();
    let log_format =
        std::env::var("TASKD_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let _file_guard = setup_logging(&log_level, args.log_file.as_deref(), &log_format);

    match args.command {
        Some(Command::Ui) => {
            let config = ServerConfig::new(args.port, args.data_dir, args.log, args.bind_address);
            cli::ui::run_ui(&config).await?;
        }
        Some(Command::Status { json }) => {
            let config = ServerConfig::new(
                args.port,
                args.data_dir,
                Some("error".to_string()),
                args.bind_address,
            );
            let exit_code = run_status(&config, json).await;
            std::process::exit(exit_code);
        }
        Some(Command::Serve { seed }) => {
            run_server(args.port, args.data_dir, args.log, args.bind_address, seed).await?;
        }
        None => {
            run_server(args.port, args.data_dir, args.log, args.bind_address, false).await?;
        }
    }

    Ok(())
}

async fn run_server(
    port: Option<u16>,
    data_dir: Option<std::path::PathBuf>,
    log: Option<String>,
    bind_address: Option<String>,
    seed: bool,
) -> Result<()> {
    let config = Arc::new(ServerConfig::new(port, data_dir, log, bind_address));
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.port,
        "starting taskd"
    );

    let store = Arc::new(TaskStore::new());
    if seed {
        store.seed_demo().await;
        info!(count = store.list().await.len(), "seeded demo tasks");
    }

    let ctx = Arc::new(AppContext::new(config, store));
    rest::start_server(ctx).await
}

/// One-shot backend probe for `taskd status`. Returns the process exit code.
async fn run_status(config: &ServerConfig, json: bool) -> i32 {
    let client = match cli::client::ApiClient::new(&config.api_base_url) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e:#}");
            return 1;
        }
    };

    let (health, list) = tokio::join!(client.health(), client.list_tasks());
    match health {
        Ok(h) => {
            let count = list.map(|l| l.count).ok();
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "status": "ok",
                        "message": h.message,
                        "tasks": count,
                        "url": client.base_url(),
                    })
                );
            } else {
                let tasks = count
                    .map(|c| format!("{c} task{}", if c == 1 { "" } else { "s" }))
                    .unwrap_or_else(|| "task count unavailable".to_string());
                println!("taskd: {} — {} — {}", h.status, tasks, client.base_url());
            }
            0
        }
        Err(e) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "status": "stopped", "url": client.base_url() })
                );
            } else {
                eprintln!("taskd: unreachable at {} ({e:#})", client.base_url());
            }
            1
        }
    }
}

/// Initialize the tracing subscriber.
/// If `log_file` is set, logs go to both stdout and a daily-rolling file.
/// Returns a `WorkerGuard` that must stay alive for the process lifetime.
///
/// `log_format` may be `"pretty"` (default, human-readable compact format) or
/// `"json"` (structured JSON for log aggregators).
///
/// If the log directory cannot be created, falls back to stdout-only logging
/// with a warning — never panics.
fn setup_logging(
    log_level: &str,
    log_file: Option<&std::path::Path>,
    log_format: &str,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let use_json = log_format == "json";

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("taskd.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            // Fall back to stdout-only — don't panic on a bad log path.
            eprintln!(
                "warn: could not create log directory '{}': {e} — falling back to stdout",
                dir.display()
            );
            if use_json {
                tracing_subscriber::fmt().json().with_env_filter(log_level).init();
            } else {
                tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
            }
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        if use_json {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().json())
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().compact())
                .with(fmt::layer().with_writer(non_blocking))
                .init();
        }

        Some(guard)
    } else if use_json {
        tracing_subscriber::fmt().json().with_env_filter(log_level).init();
        None
    } else {
        tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
        None
    }
}
