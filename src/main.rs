use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use crossterm::{event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind}, execute, terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing_subscriber::EnvFilter;

use todo_client::{
    application::{store::Store, sync_actions::SyncActions},
    config::ClientConfig,
    infrastructure::http_api::HttpTodoApi,
    tui::{app::{App, Effect, UiEvent}, render, runtime::{run_effect, ClientActions}},
};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let config = ClientConfig::from_env()?;
    let log_file = std::fs::OpenOptions::new().create(true).append(true).open(&config.log_file)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();
    tracing::info!(base_url = %config.base_url, "starting");

    let store = Store::default();
    let (errors, error_rx) = unbounded_channel();
    let actions: ClientActions<HttpTodoApi> = SyncActions::new(HttpTodoApi::new(&config)?, errors, store.clone());

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, store, actions, error_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    tracing::info!("shutdown");
    res
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    store: Store,
    actions: ClientActions<HttpTodoApi>,
    mut error_rx: UnboundedReceiver<String>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let (events, mut event_rx): (UnboundedSender<UiEvent>, _) = unbounded_channel();
    let dirty = Arc::new(AtomicBool::new(true));
    let _redraw = {
        let dirty = dirty.clone();
        store.subscribe(move |_| dirty.store(true, Ordering::Release))
    };

    let (mut app, on_mount) = App::new();
    for effect in on_mount { run_effect(&actions, effect, &events); }

    loop {
        while let Ok(message) = error_rx.try_recv() { app.push_notice(message); dirty.store(true, Ordering::Release); }
        while let Ok(event) = event_rx.try_recv() { app.on_event(event, &store.snapshot()); dirty.store(true, Ordering::Release); }
        let snap = store.snapshot();

        if dirty.swap(false, Ordering::AcqRel) {
            app.sync(&snap);
            terminal.draw(|f| render::draw(f, &app, &snap))?;
        }

        // Remote calls run on spawned tasks; polling here only waits for input.
        if !tokio::task::block_in_place(|| event::poll(tick_rate))? { continue; }
        let Event::Key(key) = event::read()? else { dirty.store(true, Ordering::Release); continue };
        // Only act on key presses; ignore repeats and releases to prevent duplicate input
        if key.kind != KeyEventKind::Press { continue; }
        dirty.store(true, Ordering::Release);
        for effect in app.handle_key(key, &snap) {
            if effect == Effect::Quit { return Ok(()); }
            run_effect(&actions, effect, &events);
        }
    }
}
