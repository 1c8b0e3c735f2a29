use std::io::BufRead;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use client_logging::client_info;
use url::Url;
use wikifix_client::{
    AnalyticsSink, ApiSettings, EngineConfig, EngineHandle, FileStore, HttpAnalyticsSink,
    NoopAnalyticsSink,
};
use wikifix_core::{update, AppState, AppViewModel, Msg, Route};

use super::auth::{self, AuthInbox, TerminalPopupOpener};
use super::effects::{map_event, EffectRunner};
use super::persistence;
use super::ui;
use super::ui::commands::Command;

const IDLE_POLL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: Url,
    pub storage_dir: PathBuf,
    pub analytics_url: Option<Url>,
}

pub fn run_app(config: AppConfig) -> anyhow::Result<()> {
    let store = FileStore::open(&config.storage_dir).context("open session store")?;
    let session = persistence::load_session(&store);

    let analytics: Arc<dyn AnalyticsSink> = match &config.analytics_url {
        Some(url) => Arc::new(HttpAnalyticsSink::new(url.clone()).context("analytics sink")?),
        None => Arc::new(NoopAnalyticsSink),
    };
    let (opener, auth_inbox) = TerminalPopupOpener::new();
    let settings = ApiSettings {
        base_url: config.api_url.clone(),
        ..ApiSettings::default()
    };
    let engine_config =
        EngineConfig::http(settings, Box::new(opener), analytics).context("engine config")?;
    let engine = EngineHandle::new(engine_config);

    client_info!("wikifix starting against {}", config.api_url);

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    spawn_event_pump(engine.clone(), msg_tx.clone());
    let line_rx = spawn_input_thread();

    let api_origin = config.api_url.origin().ascii_serialization();
    let mut shell = Shell {
        state: AppState::with_session(session),
        runner: EffectRunner::new(engine, store),
        last_view: None,
        auth_inbox,
        api_origin,
    };

    shell.dispatch(Msg::RouteChanged(Route::Home));
    shell.render_if_dirty();

    loop {
        let mut worked = false;
        while let Ok(msg) = msg_rx.try_recv() {
            shell.dispatch(msg);
            worked = true;
        }
        match line_rx.try_recv() {
            Ok(line) => {
                worked = true;
                if !shell.handle_line(&line) {
                    break;
                }
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => break,
        }
        shell.render_if_dirty();
        if !worked {
            thread::sleep(IDLE_POLL);
        }
    }

    client_info!("wikifix exiting");
    Ok(())
}

struct Shell {
    state: AppState,
    runner: EffectRunner,
    last_view: Option<AppViewModel>,
    auth_inbox: AuthInbox,
    api_origin: String,
}

impl Shell {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.run(effects);
    }

    fn render_if_dirty(&mut self) {
        if self.state.consume_dirty() {
            let view = self.state.view();
            ui::render::render(&view);
            self.last_view = Some(view);
        }
    }

    /// Returns false when the user asked to quit.
    fn handle_line(&mut self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return true;
        }
        // A pasted login payload goes straight to the auth flow.
        if line.starts_with('{') {
            match serde_json::from_str(line) {
                Ok(payload) => auth::deliver_payload(&self.auth_inbox, &self.api_origin, payload),
                Err(err) => println!("That wasn't valid JSON: {err}"),
            }
            return true;
        }
        if line == "cancel" {
            auth::cancel_login(&self.auth_inbox);
            return true;
        }

        let view = match &self.last_view {
            Some(view) => view.clone(),
            None => self.state.view(),
        };
        match ui::commands::parse(line, &view) {
            Ok(Command::Dispatch(msg)) => self.dispatch(msg),
            Ok(Command::Help) => println!("{}", ui::commands::HELP),
            Ok(Command::Quit) => return false,
            Err(message) => println!("{message}"),
        }
        true
    }
}

fn spawn_event_pump(engine: EngineHandle, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || loop {
        match engine.try_recv() {
            Some(event) => {
                if msg_tx.send(map_event(event)).is_err() {
                    break;
                }
            }
            None => thread::sleep(IDLE_POLL),
        }
    });
}

fn spawn_input_thread() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
    rx
}
