use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use console_logging::{console_info, console_warn};
use registry_core::{update, AppState, Msg};

use super::config::{self, ConsoleConfig};
use super::effects::EffectRunner;
use super::logging::{self, LogDestination};
use super::ui::commands::{self, Command, USAGE};
use super::ui::render;

pub fn run_app() -> anyhow::Result<()> {
    let config_path = config::config_path(std::env::args());
    let (config, config_error) = match config::load(&config_path) {
        Ok(config) => (config, None),
        Err(err) => (ConsoleConfig::default(), Some(err)),
    };
    logging::initialize(LogDestination::from_config(config.log_to_file));
    if let Some(err) = config_error {
        console_warn!("{:#}; using defaults", err);
    }
    console_info!("Starting registry console against {}", config.server_url);

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let (line_tx, line_rx) = mpsc::channel::<String>();
    let quit = Arc::new(AtomicBool::new(false));

    let runner = EffectRunner::new(config.engine_config(), msg_tx.clone())?;
    spawn_input_reader(line_tx, msg_tx.clone(), quit.clone());
    spawn_refresh_timer(msg_tx.clone());

    let mut console = Console::new(AppState::with_refresh_interval(config.refresh_seconds), runner);
    println!("{USAGE}");
    console.dispatch(Msg::RegistriesRequested);

    while !quit.load(Ordering::SeqCst) {
        if let Ok(msg) = msg_rx.recv_timeout(Duration::from_millis(100)) {
            console.dispatch(msg);
        }
        while let Ok(line) = line_rx.try_recv() {
            if !console.handle_line(&line) {
                quit.store(true, Ordering::SeqCst);
            }
        }
    }

    console_info!("Registry console exiting");
    Ok(())
}

struct Console {
    state: AppState,
    runner: EffectRunner,
    last_render: Vec<String>,
}

impl Console {
    fn new(state: AppState, runner: EffectRunner) -> Self {
        Self {
            state,
            runner,
            last_render: Vec::new(),
        }
    }

    /// Returns `false` once the operator asked to quit.
    fn handle_line(&mut self, line: &str) -> bool {
        match commands::parse(line, &self.state.view()) {
            Command::Dispatch(msg) => self.dispatch(msg),
            Command::Help => println!("{USAGE}"),
            Command::Quit => return false,
            Command::Unknown(hint) => println!("{hint}; type `help` for commands"),
            Command::Empty => {}
        }
        true
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;
        self.runner.enqueue(effects);

        if was_dirty {
            self.render();
        }
    }

    fn render(&mut self) {
        let lines = render::render(&self.state.view());
        if lines == self.last_render {
            return;
        }
        println!();
        for line in &lines {
            println!("{line}");
        }
        self.last_render = lines;
    }
}

fn spawn_input_reader(line_tx: mpsc::Sender<String>, wake_tx: mpsc::Sender<Msg>, quit: Arc<AtomicBool>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                return;
            }
            let _ = wake_tx.send(Msg::NoOp);
        }
        // End of input behaves like `quit`.
        quit.store(true, Ordering::SeqCst);
        let _ = wake_tx.send(Msg::NoOp);
    });
}

fn spawn_refresh_timer(msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        let interval = Duration::from_secs(1);
        loop {
            thread::sleep(interval);
            if msg_tx.send(Msg::RefreshTick).is_err() {
                break;
            }
        }
    });
}
