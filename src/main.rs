//! loan-wizard - Terminal Loan Application
//!
//! A three-step loan application wizard for the terminal. Answers are kept
//! between runs, every step is validated before moving on, and the finished
//! application is posted to a remote endpoint.

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use loan_wizard::application::{App, JobRunner};
use loan_wizard::domain::step_for_path;
use loan_wizard::infrastructure::{
    default_config_path, init_logging, CategoryCatalog, Config, DraftStore, FileStore,
    HttpGateway, SystemClock,
};
use loan_wizard::presentation::{render_ui, InputHandler};

const TICK: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "loan-wizard", version, about = "Terminal loan application wizard")]
struct Cli {
    /// Path to a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding the saved draft, category cache and log
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Base URL of the categories and submission API
    #[arg(long)]
    api_base_url: Option<String>,
    /// Step to open, as a route: "/", "/address" or "/loan"
    #[arg(long, default_value = "/")]
    route: String,
    /// Log level for the log file (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

/// Entry point for the loan wizard.
///
/// Loads configuration, opens local storage, sets up the terminal interface
/// and runs the event loop until the user quits.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the HTTP client cannot
/// be built, or terminal setup fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = Config::load(&config_path)?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(url) = cli.api_base_url {
        config.api_base_url = url;
    }

    if let Err(e) = init_logging(&config.log_path(), cli.log_level.as_deref()) {
        eprintln!("logging disabled: {e}");
    }
    tracing::info!(data_dir = %config.data_dir.display(), api = %config.api_base_url, "starting loan-wizard");

    let storage = FileStore::new(&config.data_dir);
    let store = DraftStore::open(Box::new(storage.clone()));
    let catalog = CategoryCatalog::new(Box::new(storage), config.category_ttl_ms);
    let gateway = HttpGateway::new(&config.api_base_url, config.request_timeout())?;
    let runner = JobRunner::new(Arc::new(gateway));

    let mut app = App::new(store, catalog, Box::new(SystemClock));
    app.navigate(step_for_path(&cli.route));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal loop failed");
        println!("{err:?}");
    }
    tracing::info!("exiting");

    Ok(())
}

/// Main event loop.
///
/// Hands queued network jobs to the runner, applies finished ones, redraws,
/// and waits briefly for a key. Ctrl+Q or Ctrl+C quits.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, runner: &JobRunner) -> io::Result<()> {
    loop {
        for job in app.take_jobs() {
            runner.spawn(job);
        }
        for outcome in runner.poll() {
            app.apply_outcome(outcome);
        }

        terminal.draw(|f| render_ui(f, app))?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Char('c')
                    if key.modifiers.contains(KeyModifiers::CONTROL) =>
                {
                    return Ok(());
                }
                _ => InputHandler::handle_key_event(app, key.code, key.modifiers),
            }
        }
    }
}
