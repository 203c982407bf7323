//! mir-dash: terminal dashboard for replica status.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::Mutex;
use tracing::{info, warn};

use mir_dash::api::{CommandDispatcher, StatusClient, StatusProvider};
use mir_dash::demo::DemoCluster;
use mir_dash::telemetry::{self, LogSink};
use mir_dash::{ui, App, AutoProcess, Controller, DashConfig};
use mir_matrix::{render_model, CheckpointKeyRule, DetailExpansion, SchemaVersion};

/// Requests proposed into the demo cluster at startup.
const DEMO_PREFILL: usize = 8;

/// mir-dash: watch replicas order requests
#[derive(Parser, Debug)]
#[command(name = "mir-dash")]
#[command(about = "TUI for replica status: aligned sequence matrix, checkpoints and peer progress")]
struct Args {
    /// Status server base URL (serves GET /status)
    #[arg(short, long, default_value = "http://127.0.0.1:10000")]
    endpoint: String,

    /// Poll interval in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    refresh_ms: u64,

    /// Sequence state code schema: v1 or v2
    #[arg(long, default_value = "v1")]
    schema: SchemaVersion,

    /// Checkpoint column rule: absolute, node-relative or bucket-divisor
    #[arg(long, default_value = "absolute")]
    checkpoint_keys: CheckpointKeyRule,

    /// Run against an in-process demo cluster (no server required)
    #[arg(long)]
    demo: bool,

    /// Print one rendered matrix as JSON and exit
    #[arg(long)]
    dump: bool,

    /// Log file for interactive runs
    #[arg(long, default_value = "mir-dash.log")]
    log_file: PathBuf,

    /// Auto-process busy nodes: off, 0, 50, 500 or 1500 (ms delay)
    #[arg(long, default_value = "off")]
    auto_process: AutoProcess,
}

impl Args {
    fn into_config(self) -> DashConfig {
        DashConfig {
            endpoint: self.endpoint,
            refresh: Duration::from_millis(self.refresh_ms.max(50)),
            schema: self.schema,
            checkpoint_keys: self.checkpoint_keys,
            demo: self.demo,
            dump: self.dump,
            log_file: self.log_file,
            auto_process: self.auto_process,
            ..DashConfig::from_env()
        }
    }
}

type Backends = (Arc<dyn StatusProvider>, Arc<dyn CommandDispatcher>);

fn backends(config: &DashConfig) -> anyhow::Result<Backends> {
    if config.demo {
        let cluster = Arc::new(DemoCluster::default());
        cluster
            .prefill(DEMO_PREFILL)
            .context("Failed to seed demo cluster")?;
        let provider: Arc<dyn StatusProvider> = cluster.clone();
        let dispatcher: Arc<dyn CommandDispatcher> = cluster;
        Ok((provider, dispatcher))
    } else {
        let client = Arc::new(
            StatusClient::new(&config.endpoint)
                .with_context(|| format!("Failed to create client for {}", config.endpoint))?,
        );
        let provider: Arc<dyn StatusProvider> = client.clone();
        let dispatcher: Arc<dyn CommandDispatcher> = client;
        Ok((provider, dispatcher))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Args::parse().into_config();

    let sink = if config.dump {
        LogSink::Stderr
    } else {
        LogSink::File(&config.log_file)
    };
    telemetry::init_logging(&config.log_level, sink).context("Failed to initialise logging")?;

    let (provider, dispatcher) = backends(&config)?;

    if config.dump {
        return dump(&config, provider.as_ref()).await;
    }

    info!(source = %config.source_label(), schema = %config.schema, "Starting dashboard");

    let app = Arc::new(Mutex::new(App::new(
        config.render_options(),
        config.auto_process,
        config.source_label(),
    )));
    let controller = Controller::new(provider, dispatcher, app);
    controller.refresh().await;

    let refresh_controller = controller.clone();
    let refresh_interval = config.refresh;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(refresh_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            refresh_controller.refresh().await;
        }
    });

    install_panic_hook();
    let mut terminal = setup_terminal().context("Failed to set up terminal")?;
    let result = run_app(&mut terminal, &controller).await;
    restore_terminal().context("Failed to restore terminal")?;
    terminal.show_cursor()?;

    result
}

/// Render a single poll as JSON on stdout, with every node expanded.
async fn dump(config: &DashConfig, provider: &dyn StatusProvider) -> anyhow::Result<()> {
    let nodes = provider
        .fetch_status()
        .await
        .with_context(|| format!("Failed to fetch status from {}", config.source_label()))?;

    let expansion = DetailExpansion::all_expanded(nodes.iter().map(|n| n.id));
    let matrix = render_model(&nodes, &expansion, &config.render_options())
        .context("Failed to render status")?;

    if matrix.is_none() {
        warn!(nodes = nodes.len(), "Nothing to render");
    }
    println!("{}", serde_json::to_string_pretty(&matrix)?);
    Ok(())
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)
}

/// Leave the alternate screen before a panic message is printed.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = restore_terminal();
        default_hook(panic);
    }));
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: &Controller,
) -> anyhow::Result<()> {
    let app = controller.app();
    loop {
        {
            let app_guard = app.lock().await;
            terminal.draw(|frame| ui::render(frame, &app_guard))?;
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    let command = {
                        let mut app_guard = app.lock().await;
                        match key.code {
                            KeyCode::Char(c) => app_guard.handle_key(c),
                            KeyCode::Esc => app_guard.handle_key('q'),
                            KeyCode::Left => {
                                app_guard.select_prev();
                                None
                            }
                            KeyCode::Right => {
                                app_guard.select_next();
                                None
                            }
                            _ => None,
                        }
                    };

                    if let Some(command) = command {
                        let controller = controller.clone();
                        tokio::spawn(async move { controller.execute(command).await });
                    }
                }
            }
        }

        if app.lock().await.should_quit() {
            return Ok(());
        }
    }
}
