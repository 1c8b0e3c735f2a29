use client_logging::{client_info, client_warn};
use wikifix_client::{
    AuthError, EngineCommand, EngineEvent, EngineHandle, FileStore,
};
use wikifix_core::{Effect, LoginFailure, Msg, Session};

use super::persistence;

/// Executes core effects: engine commands out, session writes locally.
pub(crate) struct EffectRunner {
    engine: EngineHandle,
    store: FileStore,
}

impl EffectRunner {
    pub(crate) fn new(engine: EngineHandle, store: FileStore) -> Self {
        Self { engine, store }
    }

    pub(crate) fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Api(request) => self.engine.send(EngineCommand::Api(request)),
                Effect::BeginLogin => self.engine.send(EngineCommand::BeginLogin),
                Effect::Logout { token } => self.engine.send(EngineCommand::Logout { token }),
                Effect::StartEmbedAttempt {
                    attempt,
                    url,
                    probe_interval,
                    deadline,
                } => {
                    client_info!("embed attempt {attempt} -> {url}");
                    self.engine.send(EngineCommand::StartEmbedAttempt {
                        attempt,
                        url,
                        probe_interval,
                        deadline,
                    });
                }
                Effect::CancelEmbedAttempt { attempt } => {
                    self.engine.send(EngineCommand::CancelEmbedAttempt { attempt });
                }
                Effect::OpenExternal { url } => {
                    println!("Open in your browser: {url}");
                }
                Effect::Track(event) => self.engine.send(EngineCommand::Track(event)),
                Effect::PersistSession(session) => {
                    persistence::save_session(&mut self.store, &session);
                }
                Effect::ClearOnboardingScratch => {
                    Session::clear_onboarding_scratch(&mut self.store);
                }
            }
        }
    }
}

/// Translate an engine event into the message the core understands.
pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::PlatformStats(result) => {
            Msg::PlatformStatsLoaded(result.map_err(|err| err.failure()))
        }
        EngineEvent::Task { task_id, result } => Msg::TaskLoaded {
            task_id,
            result: result.map_err(|err| err.failure()),
        },
        EngineEvent::RandomTask(result) => {
            Msg::RandomTaskLoaded(result.map_err(|err| err.failure()))
        }
        EngineEvent::TaskList(result) => Msg::TaskListLoaded(result.map_err(|err| err.failure())),
        EngineEvent::Submitted { task_id, result } => Msg::SubmitCompleted {
            task_id,
            result: result.map_err(|err| err.failure()),
        },
        EngineEvent::CompletedCount(result) => {
            Msg::CompletedCountLoaded(result.map_err(|err| err.failure()))
        }
        EngineEvent::UserStats(result) => Msg::UserStatsLoaded(result.map_err(|err| err.failure())),
        EngineEvent::CompletedList(result) => {
            Msg::CompletedListLoaded(result.map_err(|err| err.failure()))
        }
        EngineEvent::Referral(result) => Msg::ReferralLoaded(result.map_err(|err| err.failure())),
        EngineEvent::Interests(result) => Msg::InterestsLoaded(result.map_err(|err| err.failure())),
        EngineEvent::InterestsSaved(result) => {
            Msg::InterestsSaved(result.map_err(|err| err.failure()))
        }
        EngineEvent::Leaderboard(result) => {
            Msg::LeaderboardLoaded(result.map_err(|err| err.failure()))
        }
        EngineEvent::UsernameValidated { username, result } => Msg::UsernameValidated {
            username,
            result: result.map_err(|err| err.failure()),
        },
        EngineEvent::LoginFinished(result) => {
            if let Err(err) = &result {
                client_warn!("login failed: {err}");
            }
            Msg::LoginCompleted(result.map_err(map_auth_error))
        }
        EngineEvent::EmbedSignal { attempt, signal } => Msg::EmbedSignalled { attempt, signal },
    }
}

fn map_auth_error(err: AuthError) -> LoginFailure {
    match err {
        AuthError::Cancelled => LoginFailure::Cancelled,
        AuthError::TimedOut => LoginFailure::TimedOut,
        AuthError::PopupBlocked | AuthError::Provider(_) => LoginFailure::Provider(err.to_string()),
    }
}
