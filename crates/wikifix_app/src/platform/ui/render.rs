//! Renders the current view model as plain terminal output.

use wikifix_core::{
    AppViewModel, LoadState, OnboardingStep, PageView, ReviewView, Route, Verdict,
};

pub(crate) fn render(view: &AppViewModel) {
    println!();
    render_navbar(view);
    match &view.page {
        PageView::Home(home) => render_home(view, home),
        PageView::Review(review) => render_review(review),
        PageView::AllTasks(list) => render_all_tasks(list),
        PageView::Leaderboard(board) => render_leaderboard(board),
        PageView::Profile(profile) => render_profile(profile),
        PageView::Onboarding(onboarding) => render_onboarding(view, onboarding),
        PageView::About => render_about(),
    }
}

fn render_navbar(view: &AppViewModel) {
    let identity = match (&view.user_first_name, view.signed_in) {
        (Some(name), _) => format!("{name} | done: {}", view.completed_tasks),
        (None, true) => format!("signed in | done: {}", view.completed_tasks),
        (None, false) => "not signed in (`login`)".to_string(),
    };
    let rank = view
        .rank
        .map(|rank| format!(" | rank #{rank}"))
        .unwrap_or_default();
    println!("== WikiFix == {identity}{rank}");
    if let Some(error) = &view.auth_error {
        println!("!! {error}");
    }
}

fn render_home(view: &AppViewModel, home: &wikifix_core::HomeView) {
    println!("-- Home --");
    if home.state.loading {
        println!("Loading platform stats...");
        return;
    }
    if let Some(error) = &home.state.error {
        println!("!! {error}");
    }
    match &home.state.stats {
        Some(stats) => {
            println!("Contributors:     {}", stats.total_users);
            println!("Tasks completed:  {}", stats.total_completed_tasks);
            println!("Points awarded:   {}", stats.total_points_awarded);
            println!("Avg points/user:  {:.2}", stats.average_points_per_user);
        }
        None => println!("Platform stats unavailable."),
    }
    if view.signed_in {
        println!("Type `tasks` to start reviewing.");
    } else {
        println!("Type `login` to join in.");
    }
}

fn render_review(review: &ReviewView) {
    println!("-- Task review --");
    if review.loading {
        println!("Loading task...");
        return;
    }
    if let Some(error) = &review.error {
        println!("!! {error}");
        if review.exhausted {
            return;
        }
    }
    let Some(task) = &review.task else {
        return;
    };

    let xp = task.xp.unwrap_or_else(|| wikifix_core::xp_for(task.difficulty));
    println!(
        "Task {} [{}  {:?}  {}  {xp} XP]",
        task.id, task.topic, task.difficulty, task.status
    );
    println!("Claim:    {}", task.claim);
    if !task.context.is_empty() {
        println!("Context:  {}", task.context);
    }
    if let Some(analysis) = &task.analysis {
        println!("Analysis: {analysis}");
    }
    if !task.references.is_empty() {
        println!("References (`ref <n>` to preview):");
        for (index, reference) in task.references.iter().enumerate() {
            println!("  {}. {}", index + 1, reference);
        }
    }

    render_embed(&review.embed);

    let verdict = match review.verdict {
        Some(Verdict::Agree) => "agree",
        Some(Verdict::Disagree) => "disagree",
        None => "none",
    };
    println!("Verdict: {verdict}  Explanation: {:?}", review.explanation);
    if review.submitting {
        println!("Submitting...");
    } else if review.can_submit {
        println!("Ready: `submit` to send your analysis.");
    } else {
        println!("Pick `agree` or `disagree`, optionally `explain <text>`.");
    }
}

fn render_embed(embed: &wikifix_core::EmbedView) {
    match embed.state {
        LoadState::Initial => {}
        LoadState::Loading => {
            if let Some(url) = &embed.frame_url {
                println!("Article preview: loading {url}");
            }
        }
        LoadState::Ready => {
            if let Some(url) = &embed.frame_url {
                println!("Article preview: ready ({url})");
            }
        }
        LoadState::Error => {
            println!("Article preview failed to load.");
            if let Some(url) = &embed.open_external_url {
                println!("Open it directly instead (`open`): {url}");
            }
        }
    }
}

fn render_all_tasks(list: &wikifix_core::TaskListView) {
    println!("-- All tasks --");
    if list.state.loading {
        println!("Loading tasks...");
        return;
    }
    if let Some(error) = &list.state.error {
        println!("!! {error}");
        return;
    }
    if list.state.rows.is_empty() {
        println!("No open tasks.");
    }
    for row in &list.state.rows {
        println!("  {}  [{}] {}", row.id, row.difficulty, row.text);
    }
}

fn render_leaderboard(board: &wikifix_core::LeaderboardView) {
    println!("-- Leaderboard --");
    if board.state.loading {
        println!("Loading leaderboard...");
        return;
    }
    if let Some(error) = &board.state.error {
        println!("!! {error}");
        return;
    }
    let Some(board) = &board.state.board else {
        return;
    };
    println!("{} contributors, you are #{}", board.total_users, board.user_rank);
    for row in &board.users {
        println!(
            "  #{:<3} {:<24} {:>6} pts  {:>4} tasks",
            row.rank, row.name, row.points, row.completed_tasks
        );
    }
}

fn render_profile(profile: &wikifix_core::ProfileView) {
    println!("-- Profile --");
    if let Some(error) = &profile.state.error {
        println!("!! {error}");
    }
    if let Some(stats) = &profile.state.stats {
        println!(
            "Points: {}  Completed: {}  Badges: {}  Rank: #{}",
            stats.points, stats.completed_tasks, stats.badges, stats.rank
        );
    }
    if let Some(interests) = &profile.state.interests {
        println!(
            "Interests: topics [{}], languages [{}]",
            interests.topics.join(", "),
            interests.languages.join(", ")
        );
    }
    if let Some(referral) = &profile.state.referral {
        println!(
            "Referral {} ({} joined): {}",
            referral.referral_code, referral.referral_count, referral.referral_link
        );
    }
    if let Some(completed) = &profile.state.completed {
        println!("Recent reviews:");
        for task in completed.iter().take(10) {
            let verdict = if task.agrees_with_claim { "agreed" } else { "disagreed" };
            println!(
                "  {}  {}  +{} pts  ({})",
                task.completed_at, verdict, task.points_earned, task.text
            );
        }
    }
}

fn render_onboarding(view: &AppViewModel, onboarding: &wikifix_core::OnboardingView) {
    let step = match view.route {
        Route::Onboarding(step) => step,
        _ => OnboardingStep::Topics,
    };
    let state = &onboarding.state;
    println!("-- Onboarding: {:?} --", step);
    match step {
        OnboardingStep::Topics => {
            println!("What topics are you interested in? (`topic <key>`, `custom <text>`)");
            println!("Available: {}", wikifix_core::PREDEFINED_TOPICS.join(", "));
            println!("Selected: {}", state.all_topics().join(", "));
        }
        OnboardingStep::Language => {
            println!("What languages do you speak? (`lang <code>`)");
            println!("Available: {}", wikifix_core::LANGUAGE_CODES.join(", "));
            println!("Selected: {}", state.languages.join(", "));
        }
        OnboardingStep::Username => {
            println!("Link your Wikipedia account (`username <name>`, or `skipwiki`).");
            if state.skip_wikipedia {
                println!("Skipping Wikipedia account.");
            } else if state.validating {
                println!("Checking {:?}...", state.username);
            } else if let Some(validation) = &state.validation {
                println!("{}", validation.message);
            }
        }
        OnboardingStep::Finish => {
            if state.saving {
                println!("Saving your interests...");
            } else if state.saved {
                println!("All set! Type `tasks` to start contributing.");
            } else if let Some(error) = &state.error {
                println!("!! {error}");
            }
        }
    }
    println!("(`next` / `back` to move between steps)");
}

fn render_about() {
    println!("-- About --");
    println!("WikiFix crowdsources reviews of AI-flagged inconsistencies");
    println!("between Wikipedia text and the sources it cites.");
}
