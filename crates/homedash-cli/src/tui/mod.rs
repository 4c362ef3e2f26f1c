use crate::cli::Session;
use crate::logging::DiagnosticsBuffer;
use anyhow::Context;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use homedash_core::gateway::RequestOutcome;
use homedash_core::integration::disconnect_prompt;
use homedash_core::log_buffer::LogEntry;
use homedash_core::{
    ConnectionGateway, FormMode, IntegrationBoard, IntegrationController, IntegrationKind,
    LogBuffer, LogTailer, Phase,
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tracing::{Level, debug, error, info, warn};

mod draw;
mod handle;
mod jobs;

use jobs::JobResult;

const TICK_RATE: Duration = Duration::from_millis(200);
const DIAGNOSTICS_HEIGHT: u16 = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum View {
    Board,
    Form(IntegrationKind),
    Confirm(IntegrationKind),
}

pub(crate) fn run_dashboard(
    session: Session,
    diagnostics: DiagnosticsBuffer,
    runtime: Handle,
) -> anyhow::Result<()> {
    let _runtime = runtime.enter();
    let client = Arc::new(session.client()?);
    let tailer = LogTailer::new(client.clone(), session.config.tailer_config());
    let tail = tailer.start();

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    info!(base_url = %session.config.base_url, "Starting dashboard");
    let mut app = TuiApp::new(
        session,
        client,
        tailer.buffer().clone(),
        diagnostics,
        runtime.clone(),
    );
    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
    tail.stop();

    if let Err(err) = &result {
        error!(error = %err, "Dashboard exited with error");
    }
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut TuiApp,
) -> anyhow::Result<()> {
    let mut last_tick = Instant::now();
    debug!(tick_rate_ms = TICK_RATE.as_millis(), "Dashboard event loop started");

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && app.handle_key(key)?
        {
            return Ok(());
        }

        if last_tick.elapsed() >= TICK_RATE {
            last_tick = Instant::now();
        }

        app.poll_jobs();
    }
}

pub(in crate::tui) struct TuiApp {
    session: Session,
    board: IntegrationBoard,
    gateway: Arc<dyn ConnectionGateway>,
    logs: LogBuffer,
    diagnostics: DiagnosticsBuffer,
    runtime: Handle,
    view: View,
    selected: usize,
    input_index: usize,
    status: Option<String>,
    job_tx: mpsc::Sender<JobResult>,
    job_rx: mpsc::Receiver<JobResult>,
}

impl TuiApp {
    fn new(
        session: Session,
        gateway: Arc<dyn ConnectionGateway>,
        logs: LogBuffer,
        diagnostics: DiagnosticsBuffer,
        runtime: Handle,
    ) -> Self {
        let board = session.board(Arc::clone(&gateway));
        let (job_tx, job_rx) = mpsc::channel();
        Self {
            session,
            board,
            gateway,
            logs,
            diagnostics,
            runtime,
            view: View::Board,
            selected: 0,
            input_index: 0,
            status: None,
            job_tx,
            job_rx,
        }
    }

    fn selected_kind(&self) -> Option<IntegrationKind> {
        self.board
            .controllers()
            .get(self.selected)
            .map(IntegrationController::kind)
    }
}
