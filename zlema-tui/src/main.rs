//! ZLEMA Trader TUI entry point: config, file logging, worker thread and the
//! render/input loop.

use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use zlema_core::api::{ApiClient, HttpTransport};
use zlema_core::config::{DashboardConfig, APP_DIR};
use zlema_core::dashboard::DashboardService;

use zlema_tui::app::AppState;
use zlema_tui::worker::{self, WorkerCommand};
use zlema_tui::{input, persistence, ui};

#[derive(Parser, Debug)]
#[command(name = "zlema-tui", version, about = "Terminal dashboard for the ZLEMA trading backend")]
struct Args {
    /// Config file (defaults to <config dir>/zlema-trader/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides config and ZLEMA_API_URL
    #[arg(long)]
    api_url: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Restore the terminal before the default hook prints the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let config_root = dirs::config_dir();
    let mut config = DashboardConfig::load(args.config.as_deref(), config_root.as_deref())
        .context("load dashboard config")?;
    if let Some(url) = args.api_url {
        config.api.base_url = url;
    }
    config.validate().context("invalid dashboard config")?;

    let log_dir = config.log_dir.clone().unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("logs")
    });
    let _log_guard = init_logging(&log_dir)?;
    info!(base_url = %config.api.base_url, "starting zlema-tui");

    let state_path = config_root
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("state.json");
    let persisted = persistence::load(&state_path);

    let transport = HttpTransport::new(config.api.base_url.clone(), config.api.timeout())
        .context("build HTTP transport")?;
    let service = DashboardService::new(Arc::new(ApiClient::new(transport)));

    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(service, cmd_rx, resp_tx)?;

    let mut app = AppState::new(cmd_tx.clone(), resp_rx, &config);
    persistence::apply(&mut app, persisted);

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    if let Err(e) = persistence::save(&state_path, &persistence::extract(&app)) {
        tracing::warn!(error = %e, "failed to save UI state");
    }

    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("zlema-tui exited");
    result
}

/// Daily rolling log file. Stdout belongs to the terminal UI.
fn init_logging(dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create log directory {}", dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(dir, "zlema-tui.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    Ok(guard)
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        while let Ok(resp) = app.worker_rx.try_recv() {
            app.handle_response(resp);
        }

        // Parameter watch and polling timers.
        app.tick(Instant::now());

        // 50ms poll keeps the countdown and timers ticking at ~20 FPS.
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        if !app.running {
            break;
        }
    }
    Ok(())
}
