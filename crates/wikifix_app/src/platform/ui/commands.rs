//! Line commands driving the pages.

use wikifix_core::{AppViewModel, Msg, OnboardingStep, PageView, Route, Verdict};

#[derive(Debug)]
pub(crate) enum Command {
    Dispatch(Msg),
    Help,
    Quit,
}

pub(crate) const HELP: &str = "\
Commands:
  home | tasks | task <id> | all | leaderboard | profile | about | onboard
  login | logout
  agree | disagree | explain <text> | submit
  ref <n> | open
  topic <key> | custom <text> | lang <code> | username <name> | skipwiki
  next | back
  help | quit";

/// Parse one input line against the current view. Errors are user-facing.
pub(crate) fn parse(line: &str, view: &AppViewModel) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let head = parts.next().unwrap_or("");
    let rest = line[line.find(head).map(|idx| idx + head.len()).unwrap_or(0)..].trim();

    let msg = match head {
        "quit" | "exit" => return Ok(Command::Quit),
        "help" | "?" => return Ok(Command::Help),
        "home" => Msg::RouteChanged(Route::Home),
        "tasks" => Msg::RouteChanged(Route::Tasks),
        "task" => {
            if rest.is_empty() {
                return Err("usage: task <id>".to_string());
            }
            Msg::RouteChanged(Route::TaskDetail(rest.to_string()))
        }
        "all" => Msg::RouteChanged(Route::AllTasks),
        "leaderboard" | "board" => Msg::RouteChanged(Route::Leaderboard),
        "profile" => Msg::RouteChanged(Route::Profile),
        "about" => Msg::RouteChanged(Route::About),
        "onboard" => Msg::RouteChanged(Route::Onboarding(OnboardingStep::Topics)),
        "login" => Msg::LoginClicked,
        "logout" => Msg::LogoutClicked,
        "agree" => Msg::VerdictToggled(Verdict::Agree),
        "disagree" => Msg::VerdictToggled(Verdict::Disagree),
        "explain" => Msg::ExplanationChanged(rest.to_string()),
        "submit" => Msg::SubmitClicked,
        "ref" => {
            let index: usize = rest
                .parse()
                .map_err(|_| "usage: ref <number>".to_string())?;
            let url = reference_at(view, index)?;
            Msg::ReferenceSelected { url }
        }
        "open" => Msg::OpenArticleClicked,
        "topic" => {
            if rest.is_empty() {
                return Err("usage: topic <key>".to_string());
            }
            Msg::TopicToggled(rest.to_string())
        }
        "custom" => {
            if rest.is_empty() {
                return Err("usage: custom <text>".to_string());
            }
            if has_custom_topic(view, rest) {
                Msg::CustomTopicRemoved(rest.to_string())
            } else {
                Msg::CustomTopicAdded(rest.to_string())
            }
        }
        "lang" => {
            if rest.is_empty() {
                return Err("usage: lang <code>".to_string());
            }
            Msg::LanguageToggled(rest.to_string())
        }
        "username" => Msg::UsernameChanged(rest.to_string()),
        "skipwiki" => Msg::SkipWikipediaToggled,
        "next" => Msg::OnboardingNext,
        "back" => Msg::OnboardingBack,
        other => return Err(format!("unknown command {other:?}; try `help`")),
    };

    Ok(Command::Dispatch(msg))
}

fn reference_at(view: &AppViewModel, index: usize) -> Result<String, String> {
    let PageView::Review(review) = &view.page else {
        return Err("no task open".to_string());
    };
    let references = review
        .task
        .as_ref()
        .map(|task| task.references.as_slice())
        .unwrap_or_default();
    references
        .get(index.checked_sub(1).ok_or("references start at 1")?)
        .cloned()
        .ok_or_else(|| format!("task has {} references", references.len()))
}

fn has_custom_topic(view: &AppViewModel, topic: &str) -> bool {
    match &view.page {
        PageView::Onboarding(onboarding) => onboarding
            .state
            .custom_topics
            .iter()
            .any(|existing| existing == topic),
        _ => false,
    }
}
