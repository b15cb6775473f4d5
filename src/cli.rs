//! Terminal front end: one-shot subcommands plus an interactive REPL that
//! mirrors the analyze / vote / profile loop.

use crate::api::{ApiClient, Backend};
use crate::auth::{AuthController, AuthState};
use crate::config::Config;
use crate::error::Error;
use crate::extract::CaptureExtractor;
use crate::models::{CommunityStats, Settings, UpdateProfileRequest};
use crate::profile::{NotificationCenter, ProfileSync};
use crate::store::{self, FileStore, KeyValueStore};
use crate::vote::VoteDirection;
use crate::workflow::{AnalysisWorkflow, StartOutcome};
use anyhow::Result;
use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "factflow", version, about = "FactFlow trustworthiness client")]
pub struct Args {
    /// Backend API base URL
    #[arg(long, env = "FACTFLOW_API_BASE")]
    pub api_base: Option<String>,

    /// Alternate config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Page capture analyzed by `/analyze` (and auto-analyze) in the REPL
    #[arg(long)]
    pub capture: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and store the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create a new account (does not sign you in)
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Repeat of the password; defaults to the password itself
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Sign out and discard the stored token
    Logout {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Analyze a saved page capture (reads stdin when no path is given)
    Analyze {
        capture: Option<PathBuf>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        title: Option<String>,
    },
    /// Show or edit the signed-in profile
    Profile {
        /// Change the display name
        #[arg(long)]
        name: Option<String>,
        /// Upload a new profile photo
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Show community-wide stats
    Stats,
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Print the current settings
    Show,
    /// Change one or more settings
    Set {
        #[arg(long)]
        auto_analyze: Option<bool>,
        #[arg(long)]
        show_notifications: Option<bool>,
        #[arg(long)]
        threshold: Option<u8>,
    },
    /// Restore defaults
    Reset,
}

pub async fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(base) = &args.api_base {
        config.api_base = base.clone();
    }

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(store::app_dir()));
    let backend: Arc<dyn Backend> = Arc::new(ApiClient::new(&config.api_base));
    let mut app = App::new(config, store, backend, args.capture);

    match args.command {
        Some(command) => app.run_command(command).await,
        None => app.run_repl().await,
    }
}

struct App {
    config: Config,
    settings: Settings,
    store: Arc<dyn KeyValueStore>,
    backend: Arc<dyn Backend>,
    auth: AuthController,
    workflow: AnalysisWorkflow,
    sync: ProfileSync,
    notifications: NotificationCenter,
    community: Option<CommunityStats>,
    capture: Option<PathBuf>,
    last_user_refresh: Instant,
    last_stats_refresh: Option<Instant>,
}

impl App {
    fn new(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        backend: Arc<dyn Backend>,
        capture: Option<PathBuf>,
    ) -> Self {
        let settings = store::load_settings(&*store);
        let auth = AuthController::new(backend.clone(), store.clone());
        let workflow = AnalysisWorkflow::new(&config);
        let sync = ProfileSync::new(backend.clone());
        Self {
            config,
            settings,
            store,
            backend,
            auth,
            workflow,
            sync,
            notifications: NotificationCenter::new(),
            community: None,
            capture,
            last_user_refresh: Instant::now(),
            last_stats_refresh: None,
        }
    }

    /// Resolve the stored token into a definite state and greet accordingly.
    async fn startup(&mut self) {
        match self.auth.check_auth_state().await {
            Ok(AuthState::SignedIn(user)) => {
                println!(
                    "Signed in as {} (level {}, {} pts, {}-day streak)",
                    user.username, user.level, user.points, user.streak
                );
                self.sync.prime(user);
            }
            Ok(AuthState::SignedOut) => {
                println!("Not signed in. Use /login (or `factflow login`) to vote and earn badges.");
            }
            Err(e) => self.report_error(e),
        }
    }

    /// Print the error; a 401 anywhere forces a sign-out.
    fn report_error(&mut self, e: Error) {
        if matches!(e, Error::AuthExpired) {
            if let Err(inner) = self.auth.sign_out() {
                eprintln!("[factflow] could not clear stored session: {inner}");
            }
            self.sync.clear();
            self.workflow.reset();
        }
        eprintln!("✗ {e}");
    }

    async fn run_command(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Login { email, password } => self.cmd_login(&email, &password).await,
            Command::Register {
                username,
                email,
                password,
                confirm,
            } => {
                let confirm = confirm.unwrap_or_else(|| password.clone());
                self.cmd_register(&username, &email, &password, &confirm).await;
            }
            Command::Logout { yes } => self.cmd_logout(yes),
            Command::Analyze {
                capture,
                url,
                title,
            } => {
                self.startup().await;
                self.cmd_analyze(capture, url, title).await;
            }
            Command::Profile { name, photo } => {
                self.startup().await;
                self.cmd_edit_profile(name, photo).await;
                self.cmd_profile();
            }
            Command::Stats => self.cmd_stats(true).await,
            Command::Settings { action } => self.cmd_settings(action)?,
        }
        Ok(())
    }

    async fn run_repl(&mut self) -> Result<()> {
        self.startup().await;

        let mut rl = DefaultEditor::new()?;
        let history = store::app_dir().join("history");
        let _ = rl.load_history(&history);

        println!("factflow - type /help for commands, /exit to quit");

        if self.settings.auto_analyze && self.capture.is_some() {
            let capture = self.capture.clone();
            self.cmd_analyze(capture, None, None).await;
        }

        loop {
            self.tick().await;

            match rl.readline(">>> ") {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(&line)?;
                    if self.handle_line(&line).await {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }

        let _ = rl.save_history(&history);
        Ok(())
    }

    /// Between-turn housekeeping: show pending notifications and run the
    /// periodic user / community-stats refreshes when their interval is up.
    async fn tick(&mut self) {
        for message in self.notifications.drain_active() {
            println!("• {message}");
        }

        if self.sync.user().is_some()
            && self.last_user_refresh.elapsed()
                >= Duration::from_secs(self.config.user_refresh_secs)
        {
            self.last_user_refresh = Instant::now();
            match self.sync.refresh().await {
                Ok(changes) => self.notifications.push_changes(&changes),
                Err(e) => self.report_error(e),
            }
        }

        let stats_due = self
            .last_stats_refresh
            .map_or(true, |t| t.elapsed() >= Duration::from_secs(self.config.stats_refresh_secs));
        if stats_due {
            self.last_stats_refresh = Some(Instant::now());
            match self.backend.community_stats().await {
                Ok(stats) => self.community = Some(stats),
                Err(e) => eprintln!("[factflow] community stats unavailable: {e}"),
            }
        }
    }

    /// Dispatch one REPL line. Returns true to exit.
    async fn handle_line(&mut self, line: &str) -> bool {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or("");
        let rest: Vec<&str> = parts.collect();

        match command {
            "/exit" | "/quit" => return true,
            "/help" => print_help(),
            "/analyze" => {
                let capture = rest
                    .first()
                    .map(PathBuf::from)
                    .or_else(|| self.capture.clone());
                let url = rest.get(1).map(|s| s.to_string());
                self.cmd_analyze(capture, url, None).await;
            }
            "/again" => {
                self.workflow.reset();
                let capture = self.capture.clone();
                self.cmd_analyze(capture, None, None).await;
            }
            "/vote" => match rest.first() {
                Some(&"up") => self.cmd_vote(VoteDirection::Up).await,
                Some(&"down") => self.cmd_vote(VoteDirection::Down).await,
                _ => println!("usage: /vote up|down"),
            },
            "/profile" => match rest.as_slice() {
                [] => self.cmd_profile(),
                ["name", name] => {
                    self.cmd_edit_profile(Some(name.to_string()), None).await;
                    self.cmd_profile();
                }
                ["photo", path] => {
                    self.cmd_edit_profile(None, Some(PathBuf::from(path))).await;
                    self.cmd_profile();
                }
                _ => println!("usage: /profile [name <username> | photo <file>]"),
            },
            "/votes" => self.cmd_vote_history().await,
            "/stats" => self.cmd_stats(false).await,
            "/settings" => self.cmd_settings_line(&rest),
            "/login" => match rest.as_slice() {
                [email, password] => self.cmd_login(email, password).await,
                _ => println!("usage: /login <email> <password>"),
            },
            "/register" => match rest.as_slice() {
                [username, email, password] => {
                    self.cmd_register(username, email, password, password).await
                }
                [username, email, password, confirm] => {
                    self.cmd_register(username, email, password, confirm).await
                }
                _ => println!("usage: /register <username> <email> <password> [confirm]"),
            },
            "/logout" => self.cmd_logout(false),
            _ if command.starts_with('/') => println!("unknown command; try /help"),
            _ => println!("commands start with /; try /help"),
        }
        false
    }

    async fn cmd_login(&mut self, email: &str, password: &str) {
        match self.auth.sign_in(email, password).await {
            Ok(user) => {
                println!(
                    "Welcome back, {} (level {}, {} pts)",
                    user.username, user.level, user.points
                );
                self.sync.prime(user);
                self.last_user_refresh = Instant::now();
            }
            Err(e) => self.report_error(e),
        }
    }

    async fn cmd_register(&mut self, username: &str, email: &str, password: &str, confirm: &str) {
        match self.auth.sign_up(username, email, password, confirm).await {
            Ok(email) => {
                println!("Account created. Sign in with: /login {email} <password>");
            }
            Err(e) => self.report_error(e),
        }
    }

    fn cmd_logout(&mut self, skip_confirm: bool) {
        // The persisted token decides eligibility; a one-shot invocation has
        // no in-memory snapshot to consult.
        let signed_in = match store::load_token(&*self.store) {
            Ok(token) => token.is_some(),
            Err(e) => {
                self.report_error(e);
                return;
            }
        };
        if !signed_in {
            println!("Not signed in.");
            return;
        }
        if !skip_confirm && !confirm("Sign out?") {
            return;
        }
        match self.auth.sign_out() {
            Ok(()) => {
                self.sync.clear();
                self.workflow.reset();
                println!("Signed out.");
            }
            Err(e) => self.report_error(e),
        }
    }

    async fn cmd_analyze(
        &mut self,
        capture: Option<PathBuf>,
        url: Option<String>,
        title: Option<String>,
    ) {
        let extractor =
            CaptureExtractor::new(capture, url, title).with_limit(self.config.content_limit);
        let backend = self.backend.clone();

        let result = self
            .workflow
            .start_analysis(&extractor, &*backend, &mut |step| {
                eprintln!("  … {step}");
            })
            .await;

        match result {
            Ok(StartOutcome::Completed) => {
                self.reconcile_user_vote().await;
                self.print_results();
                self.maybe_threshold_alert();
            }
            Ok(StartOutcome::AlreadyRunning) => {
                println!("An analysis is already in progress.");
            }
            Err(e) => {
                self.report_error(e);
                self.workflow.acknowledge_error();
            }
        }
    }

    /// Pull the user's vote history so the panel reflects an earlier vote on
    /// this article.
    async fn reconcile_user_vote(&mut self) {
        let Some(article_id) = self
            .workflow
            .current()
            .and_then(|a| a.article_id.clone())
        else {
            return;
        };
        if self.sync.user().is_none() {
            return;
        }
        match self.backend.my_votes().await {
            Ok(records) => {
                let mine = records
                    .iter()
                    .find(|r| r.article_id.as_deref() == Some(article_id.as_str()));
                self.workflow.panel.user_vote = mine.map(|r| VoteDirection::from_wire(r.vote));
            }
            Err(e) => eprintln!("[factflow] vote history unavailable: {e}"),
        }
    }

    fn print_results(&self) {
        let Some(analysis) = self.workflow.current() else {
            return;
        };
        let band = analysis.band;
        println!();
        println!("{} {} — {}", band.icon(), analysis.title, analysis.subtitle);
        println!(
            "  AI {}% | Community {}% | Combined {}% [{}]",
            analysis.ai_score,
            analysis.community_score,
            analysis.combined_score,
            band.label()
        );
        for item in &analysis.explanation {
            println!("  {} {}", item.icon(), item.text);
        }
        let panel = &self.workflow.panel;
        let mark = |direction| {
            if panel.user_vote == Some(direction) {
                " (you)"
            } else {
                ""
            }
        };
        println!(
            "  up {}{} | down {}{}",
            panel.totals.up,
            mark(VoteDirection::Up),
            panel.totals.down,
            mark(VoteDirection::Down)
        );
        println!("  {}", band.advisory());
    }

    fn maybe_threshold_alert(&mut self) {
        let Some(analysis) = self.workflow.current() else {
            return;
        };
        if self.settings.show_notifications && analysis.combined_score < self.settings.threshold {
            self.notifications.push(format!(
                "Reliability {}% is below your {}% alert threshold",
                analysis.combined_score, self.settings.threshold
            ));
        }
    }

    async fn cmd_vote(&mut self, direction: VoteDirection) {
        let Some(user_id) = self.sync.user().map(|u| u.id) else {
            println!("Sign in to vote (/login <email> <password>).");
            return;
        };
        let Some(article_id) = self
            .workflow
            .current()
            .and_then(|a| a.article_id.clone())
        else {
            self.report_error(Error::Validation(
                "no analyzed article to vote on; run /analyze first".to_string(),
            ));
            return;
        };

        let backend = self.backend.clone();
        match self
            .workflow
            .panel
            .cast(direction, &*backend, user_id, &article_id)
            .await
        {
            Ok(vote) => {
                let panel = &self.workflow.panel;
                match vote {
                    Some(d) => println!(
                        "Voted {} (up {} | down {})",
                        d.label(),
                        panel.totals.up,
                        panel.totals.down
                    ),
                    None => println!(
                        "Vote cleared (up {} | down {})",
                        panel.totals.up, panel.totals.down
                    ),
                }
                // Points and badges are granted server-side on votes.
                match self.sync.refresh().await {
                    Ok(changes) => self.notifications.push_changes(&changes),
                    Err(e) => self.report_error(e),
                }
            }
            Err(e) => self.report_error(e),
        }
    }

    async fn cmd_edit_profile(&mut self, name: Option<String>, photo: Option<PathBuf>) {
        if name.is_none() && photo.is_none() {
            return;
        }
        if self.sync.user().is_none() {
            println!("Not signed in.");
            return;
        }
        if let Some(name) = name {
            let request = UpdateProfileRequest {
                username: Some(name),
                ..UpdateProfileRequest::default()
            };
            if let Err(e) = self.sync.update_profile(&request).await {
                self.report_error(e);
            }
        }
        if let Some(path) = photo {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "photo".to_string());
            match std::fs::read(&path) {
                Ok(bytes) => {
                    if let Err(e) = self.sync.upload_photo(&filename, bytes).await {
                        self.report_error(e);
                    }
                }
                Err(e) => self.report_error(e.into()),
            }
        }
    }

    fn cmd_profile(&mut self) {
        let Some(user) = self.sync.user() else {
            println!("Not signed in.");
            return;
        };
        println!("{} <{}>", user.username, user.email);
        println!(
            "  level {} | {} pts | reputation {} | {}-day streak",
            user.level, user.points, user.reputation, user.streak
        );
        println!("  verified: {}", if user.is_verified { "yes" } else { "no" });
        if !user.badges.is_empty() {
            println!("  badges: {}", user.badges.join(", "));
        }
        if let Some(photo) = &user.profile_photo {
            println!("  photo: {photo}");
        }
    }

    async fn cmd_vote_history(&mut self) {
        if self.sync.user().is_none() {
            println!("Not signed in.");
            return;
        }
        match self.backend.my_votes().await {
            Ok(records) if records.is_empty() => println!("No votes yet."),
            Ok(records) => {
                for record in records {
                    println!(
                        "  {} on {}",
                        VoteDirection::from_wire(record.vote).label(),
                        record.article_id.as_deref().unwrap_or("<unknown>")
                    );
                }
            }
            Err(e) => self.report_error(e),
        }
    }

    async fn cmd_stats(&mut self, fetch: bool) {
        if fetch || self.community.is_none() {
            match self.backend.community_stats().await {
                Ok(stats) => self.community = Some(stats),
                Err(e) => {
                    self.report_error(e);
                    return;
                }
            }
        }
        if let Some(stats) = &self.community {
            println!(
                "Community: {} users, {} articles analyzed, {} votes",
                stats.total_users, stats.total_articles, stats.total_votes
            );
            if let Some(average) = stats.average_score {
                println!("  average reliability: {average:.1}%");
            }
        }
    }

    fn cmd_settings(&mut self, action: Option<SettingsAction>) -> Result<()> {
        match action.unwrap_or(SettingsAction::Show) {
            SettingsAction::Show => self.print_settings(),
            SettingsAction::Set {
                auto_analyze,
                show_notifications,
                threshold,
            } => {
                if let Some(value) = auto_analyze {
                    self.settings.auto_analyze = value;
                }
                if let Some(value) = show_notifications {
                    self.settings.show_notifications = value;
                }
                if let Some(value) = threshold {
                    self.settings.set_threshold(value);
                }
                store::save_settings(&*self.store, &self.settings)?;
                self.print_settings();
            }
            SettingsAction::Reset => {
                self.settings = Settings::default();
                store::save_settings(&*self.store, &self.settings)?;
                self.print_settings();
            }
        }
        Ok(())
    }

    /// `/settings`, `/settings reset`, `/settings threshold 55`,
    /// `/settings auto_analyze on`, `/settings notifications off`
    fn cmd_settings_line(&mut self, rest: &[&str]) {
        let outcome = match rest {
            [] => {
                self.print_settings();
                Ok(())
            }
            ["reset"] => {
                self.settings = Settings::default();
                store::save_settings(&*self.store, &self.settings)
            }
            ["threshold", value] => match value.parse::<u8>() {
                Ok(value) => {
                    self.settings.set_threshold(value);
                    store::save_settings(&*self.store, &self.settings)
                }
                Err(_) => {
                    println!("threshold must be 0-100");
                    Ok(())
                }
            },
            ["auto_analyze", value] | ["notifications", value] => {
                let Some(enabled) = parse_switch(value) else {
                    println!("expected on|off");
                    return;
                };
                if rest[0] == "auto_analyze" {
                    self.settings.auto_analyze = enabled;
                } else {
                    self.settings.show_notifications = enabled;
                }
                store::save_settings(&*self.store, &self.settings)
            }
            _ => {
                println!("usage: /settings [reset | threshold <0-100> | auto_analyze on|off | notifications on|off]");
                Ok(())
            }
        };
        if let Err(e) = outcome {
            self.report_error(e);
        } else if !rest.is_empty() {
            self.print_settings();
        }
    }

    fn print_settings(&self) {
        println!(
            "auto_analyze: {} | notifications: {} | threshold: {}%",
            self.settings.auto_analyze, self.settings.show_notifications, self.settings.threshold
        );
    }
}

fn parse_switch(value: &str) -> Option<bool> {
    match value {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn confirm(prompt: &str) -> bool {
    use std::io::{BufRead, Write};
    print!("{prompt} [y/N] ");
    std::io::stdout().flush().ok();
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line).ok();
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn print_help() {
    println!("Commands:");
    println!("  /analyze [capture] [url]  analyze a saved page capture");
    println!("  /again                    reset and analyze the default capture again");
    println!("  /vote up|down             vote on the current article (toggles)");
    println!("  /profile                  show your profile");
    println!("  /profile name <username>  change your display name");
    println!("  /profile photo <file>     upload a profile photo");
    println!("  /votes                    show your vote history");
    println!("  /stats                    show community stats");
    println!("  /settings ...             show or change settings");
    println!("  /login <email> <pass>     sign in");
    println!("  /register <u> <e> <p>     create an account");
    println!("  /logout                   sign out");
    println!("  /exit                     quit");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VoteRecord;
    use crate::store::MemoryStore;
    use crate::test_utils::{sample_user, MockBackend};
    use crate::workflow::Phase;
    use std::io::Write as _;

    fn quick_config() -> Config {
        Config {
            step_delay_ms: 0,
            step_jitter_ms: 0,
            ..Config::default()
        }
    }

    fn capture_file(len: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all("x".repeat(len).as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_oneshot_logout_clears_stored_token() {
        // No REPL session, no in-memory snapshot: the persisted token alone
        // must make the sign-out go through.
        let kv = Arc::new(MemoryStore::new());
        crate::store::save_token(&*kv, "tok-abc").unwrap();
        let backend = Arc::new(MockBackend::new());
        let mut app = App::new(quick_config(), kv.clone(), backend, None);

        app.run_command(Command::Logout { yes: true }).await.unwrap();
        assert!(crate::store::load_token(&*kv).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_prior_vote_restored_after_analysis() {
        let backend = Arc::new(MockBackend::new());
        backend.script_my_votes(vec![VoteRecord {
            article_id: Some("art-1".to_string()),
            vote: 1,
        }]);
        let kv = Arc::new(MemoryStore::new());
        let mut app = App::new(quick_config(), kv, backend.clone(), None);
        app.sync.prime(sample_user("ada"));

        let file = capture_file(200);
        app.cmd_analyze(Some(file.path().to_path_buf()), None, None)
            .await;

        assert_eq!(app.workflow.panel.user_vote, Some(VoteDirection::Up));
        assert!(backend.calls().contains(&"my_votes".to_string()));
    }

    #[tokio::test]
    async fn test_analyze_request_carries_truncated_text_and_url() {
        let backend = Arc::new(MockBackend::new());
        let kv = Arc::new(MemoryStore::new());
        let config = Config {
            content_limit: 100,
            ..quick_config()
        };
        let mut app = App::new(config, kv, backend.clone(), None);

        let file = capture_file(500);
        app.cmd_analyze(
            Some(file.path().to_path_buf()),
            Some("https://news.example.com/story".to_string()),
            None,
        )
        .await;

        let sent = backend.analyze_requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text.chars().count(), 100);
        assert_eq!(
            sent[0].url.as_deref(),
            Some("https://news.example.com/story")
        );
        assert_eq!(sent[0].domain.as_deref(), Some("news.example.com"));
    }

    #[tokio::test]
    async fn test_auth_expiry_in_any_command_forces_sign_out() {
        let backend = Arc::new(MockBackend::new());
        let kv = Arc::new(MemoryStore::new());
        crate::store::save_token(&*kv, "tok-abc").unwrap();
        let mut app = App::new(quick_config(), kv.clone(), backend.clone(), None);
        app.sync.prime(sample_user("ada"));

        backend.expire_session();
        app.cmd_vote_history().await;

        assert!(crate::store::load_token(&*kv).unwrap().is_none());
        assert!(app.sync.user().is_none());
        assert_eq!(*app.workflow.phase(), Phase::Idle);
    }

    #[test]
    fn test_parse_switch() {
        assert_eq!(parse_switch("on"), Some(true));
        assert_eq!(parse_switch("off"), Some(false));
        assert_eq!(parse_switch("maybe"), None);
    }

    #[test]
    fn test_args_parse_analyze() {
        let args = Args::parse_from([
            "factflow",
            "analyze",
            "page.txt",
            "--url",
            "https://example.com/a",
        ]);
        match args.command {
            Some(Command::Analyze { capture, url, .. }) => {
                assert_eq!(capture, Some(PathBuf::from("page.txt")));
                assert_eq!(url.as_deref(), Some("https://example.com/a"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_args_default_to_repl() {
        let args = Args::parse_from(["factflow"]);
        assert!(args.command.is_none());
    }
}
