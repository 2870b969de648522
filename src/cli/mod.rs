//! CLI command implementations for chessgen.
//!
//! Provides subcommand handlers for:
//! - `chessgen generate`: the generation panel, driven once from the terminal
//! - `chessgen batch`: generate several positions into a JSON file
//! - `chessgen history`: positions generated so far
//! - `chessgen nav`: the navbar as it would render for a page
//! - `chessgen login | register | logout`: session management
//! - `chessgen profile`: account statistics, email and password changes
//! - `chessgen status`: backend and local setup check
//! - `chessgen config show|init|set|reset`: configuration management

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use colored::Colorize;

use crate::api::cookies::CookieJar;
use crate::api::protocol::{GenerationRequest, PositionReport, UserStats};
use crate::api::{ApiBase, ApiClient, HttpBackend};
use crate::auth;
use crate::config::{self, ChessgenConfig};
use crate::error::ClientError;
use crate::generation::format::{format_number, format_seconds, format_thousands};
use crate::generation::links::AnalysisLinks;
use crate::generation::{self, GenerationOutcome, GenerationPanel};
use crate::history::{self, HistoryEntry};
use crate::messages::Messages;
use crate::navigation::{self, LogoutOutcome, NavbarWidget};
use crate::page::Document;
use crate::page::host::TerminalHost;
use crate::page::render::field_line;
use crate::storage::LocalStore;

/// Output format for `chessgen history`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared context
// ---------------------------------------------------------------------------

/// Everything a command needs, resolved once at startup.
pub struct Context {
    pub config: ChessgenConfig,
    pub messages: Messages,
    pub state_dir: PathBuf,
    backend: HttpBackend,
    storage: LocalStore,
}

impl Context {
    pub fn new(config: ChessgenConfig) -> Result<Self> {
        let state_dir = config::state_dir(&config)
            .context("cannot determine a state directory (set CHESSGEN_STATE_DIR)")?;
        let base = ApiBase::resolve(&config.api);
        tracing::debug!(api = base.as_str(), state_dir = %state_dir.display(), "context resolved");

        let cookies = CookieJar::open(state_dir.join("cookies.json"));
        let storage = LocalStore::open_in(&state_dir);
        Ok(Self {
            messages: Messages::new(config.display.locale),
            backend: HttpBackend::new(base, cookies),
            config,
            state_dir,
            storage,
        })
    }

    pub fn api(&self) -> ApiClient<'_> {
        ApiClient::new(&self.backend)
    }

    pub fn api_base(&self) -> &ApiBase {
        self.backend.base()
    }
}

/// Form values for one generation, with config defaults filled in.
#[derive(Debug, Clone, Default)]
pub struct GenerateArgs {
    pub target_min: Option<String>,
    pub target_max: Option<String>,
    pub max_attempts: Option<String>,
}

impl GenerateArgs {
    fn resolve(&self, config: &ChessgenConfig) -> (String, String, String) {
        let defaults = &config.generation;
        (
            self.target_min
                .clone()
                .unwrap_or_else(|| defaults.target_min.to_string()),
            self.target_max
                .clone()
                .unwrap_or_else(|| defaults.target_max.to_string()),
            self.max_attempts
                .clone()
                .unwrap_or_else(|| defaults.max_attempts.to_string()),
        )
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

// ---------------------------------------------------------------------------
// chessgen generate
// ---------------------------------------------------------------------------

pub fn run_generate(ctx: &Context, args: &GenerateArgs, copy: bool) -> Result<ExitCode> {
    let panel = GenerationPanel::new(ctx.messages);
    let mut doc = Document::new("/index.html");
    panel.mount(&mut doc);

    let (min, max, attempts) = args.resolve(&ctx.config);
    GenerationPanel::fill_form(&mut doc, &min, &max, &attempts);

    let mut host = TerminalHost::new(&[generation::ids::STATUS]).skip_pauses(true);
    let api = ctx.api();
    let outcome = panel.on_generate_clicked(&mut doc, &api, &mut host);

    let GenerationOutcome::Generated(report) = outcome else {
        return Ok(ExitCode::FAILURE);
    };

    println!();
    print_report(&report, &ctx.messages);

    if let Ok(request) = GenerationPanel::read_request(&doc)
        && let Err(e) = history::record(&ctx.state_dir, &request, &report)
    {
        tracing::warn!(error = %e, "failed to record position history");
    }

    if copy && panel.copy_fen_to_clipboard(&mut doc, &mut host) {
        println!();
        println!("{} {}", "✓".green().bold(), ctx.messages.copied());
    }

    Ok(ExitCode::SUCCESS)
}

fn print_report(report: &PositionReport, messages: &Messages) {
    let links = AnalysisLinks::for_fen(&report.fen);
    println!("{}", field_line("FEN", &report.fen.bold().to_string()));
    println!("{}", field_line("White material", &format_number(report.white_material)));
    println!("{}", field_line("Black material", &format_number(report.black_material)));
    println!(
        "{}",
        field_line("Difference", &format_number(report.material_difference))
    );
    println!("{}", field_line("Turn", &report.turn));
    println!("{}", field_line("Best line", &report.eval_line1));
    println!("{}", field_line("Second line", &report.eval_line2));
    println!(
        "{}",
        field_line("Attempts", &format_thousands(report.attempts, messages.locale()))
    );
    println!("{}", field_line("Time", &format_seconds(report.time_seconds)));
    println!("{}", field_line("Lichess", &links.lichess.dimmed().to_string()));
    println!("{}", field_line("Chess.com", &links.chess_com.dimmed().to_string()));
}

// ---------------------------------------------------------------------------
// chessgen batch
// ---------------------------------------------------------------------------

/// Generate `count` positions one after another and write the successes to
/// `output` as a JSON array. Individual failures are reported and skipped.
pub fn run_batch(ctx: &Context, args: &GenerateArgs, count: usize, output: &Path) -> Result<ExitCode> {
    let (min, max, attempts) = args.resolve(&ctx.config);
    let request = GenerationRequest::new(
        parse_arg("target_min", &min)?,
        parse_arg("target_max", &max)?,
        parse_arg("max_attempts", &attempts)?,
    )?;

    println!(
        "{} {} positions, eval {}..{}, up to {} attempts each",
        "Generating".bold().cyan(),
        count,
        request.target_min(),
        request.target_max(),
        request.max_attempts()
    );

    let api = ctx.api();
    let mut positions = Vec::with_capacity(count);
    let mut failures = 0usize;
    let width = count.to_string().len();

    for i in 1..=count {
        match api.generate_position(&request) {
            Ok(report) => {
                println!(
                    "  {} [{i:>width$}/{count}] {} {} {}",
                    "✓".green().bold(),
                    report.eval_line1,
                    report.fen,
                    format!("({})", format_seconds(report.time_seconds)).dimmed()
                );
                if let Err(e) = history::record(&ctx.state_dir, &request, &report) {
                    tracing::warn!(error = %e, "failed to record position history");
                }
                positions.push(report);
            }
            Err(e) => {
                failures += 1;
                println!("  {} [{i:>width$}/{count}] {}", "✗".red().bold(), describe(&e, &ctx.messages));
            }
        }
    }

    if !positions.is_empty() {
        if let Some(parent) = output.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&positions)?;
        fs::write(output, json).with_context(|| format!("failed to write {}", output.display()))?;
    }

    println!();
    println!(
        "  {} {}   {} {}",
        "Generated:".bold(),
        positions.len().to_string().green(),
        "Failed:".bold(),
        if failures > 0 {
            failures.to_string().red()
        } else {
            failures.to_string().normal()
        }
    );
    if !positions.is_empty() {
        println!("  {} {}", "Written to".dimmed(), output.display());
    }

    Ok(exit_code(!positions.is_empty()))
}

fn parse_arg(field: &'static str, raw: &str) -> Result<i64> {
    raw.trim().parse().map_err(|_| {
        crate::error::ValidationError::NotAnInteger {
            field,
            value: raw.to_string(),
        }
        .into()
    })
}

fn describe(error: &ClientError, messages: &Messages) -> String {
    match error {
        ClientError::Application(e) => messages.server_error(e),
        ClientError::Transport(e) => messages.connection_error(&e.to_string()),
        ClientError::Validation(e) => e.to_string(),
    }
}

// ---------------------------------------------------------------------------
// chessgen history
// ---------------------------------------------------------------------------

pub fn run_history(ctx: &Context, limit: usize, format: OutputFormat) -> Result<()> {
    let entries = history::read_recent(&ctx.state_dir, limit);

    if entries.is_empty() && format == OutputFormat::Table {
        println!(
            "{}",
            "No positions yet. Run `chessgen generate` to create one.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Csv => print_history_csv(&entries),
        OutputFormat::Table => print_history_table(&entries),
    }
    Ok(())
}

fn print_history_table(entries: &[HistoryEntry]) {
    println!("{}", "Generated positions (newest first)".bold().cyan());
    println!("{}", "=".repeat(60));
    println!(
        "  {:<20} {:>11} {:>10} {:>8}  FEN",
        "When", "Range", "Eval", "Time"
    );
    println!("  {}", "-".repeat(58));

    for (i, entry) in entries.iter().enumerate() {
        let when = chrono::DateTime::parse_from_rfc3339(&entry.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| entry.timestamp.clone());
        let line = format!(
            "  {:<20} {:>11} {:>10} {:>8}  {}",
            when,
            format!("{}..{}", entry.target_min, entry.target_max),
            entry.report.eval_line1,
            format_seconds(entry.report.time_seconds),
            entry.report.fen,
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_history_csv(entries: &[HistoryEntry]) {
    println!("timestamp,target_min,target_max,fen,eval_line1,eval_line2,attempts,time_seconds");
    for entry in entries {
        println!(
            "{},{},{},{},{},{},{},{}",
            entry.timestamp,
            entry.target_min,
            entry.target_max,
            csv_field(&entry.report.fen),
            csv_field(&entry.report.eval_line1),
            csv_field(&entry.report.eval_line2),
            entry.report.attempts,
            entry.report.time_seconds,
        );
    }
}

/// Quote a CSV field when it contains a separator or quote.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// chessgen nav
// ---------------------------------------------------------------------------

/// Load the navbar for `path` and print how it renders.
pub fn run_nav(ctx: &Context, path: &str) -> Result<ExitCode> {
    let mut navbar = NavbarWidget::new(ctx.messages);
    let mut doc = Document::new(path);
    navbar.mount(&mut doc);
    navbar.on_page_loaded(&mut doc, &ctx.api());

    let links: Vec<String> = navigation::NAV_PAGES
        .iter()
        .filter_map(|page| doc.get(&navigation::nav_link_id(page)))
        .map(|link| {
            if link.has_class(navigation::ACTIVE_CLASS) {
                format!("[{}]", link.text).bold().cyan().to_string()
            } else {
                link.text.clone()
            }
        })
        .collect();
    println!("  {}", links.join("  "));

    match navbar.session().user() {
        Some(user) => println!(
            "  {} {}",
            user.username.bold(),
            ctx.messages.elo(user.elo).dimmed()
        ),
        None => println!(
            "  {} {}",
            ctx.messages.login_label().bold(),
            format!("→ {}", navigation::AUTH_PAGE).dimmed()
        ),
    }
    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// chessgen login | register | logout
// ---------------------------------------------------------------------------

pub fn run_login(ctx: &mut Context, username: Option<String>, password: Option<String>) -> Result<ExitCode> {
    let username = value_or_prompt(username, "Username or email")?;
    let password = value_or_prompt(password, "Password")?;
    let api = ApiClient::new(&ctx.backend);
    let result = auth::login(&api, &mut ctx.storage, &username, &password);
    report_auth(result, &ctx.messages)
}

pub fn run_register(
    ctx: &mut Context,
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> Result<ExitCode> {
    let username = value_or_prompt(username, "Username")?;
    let email = value_or_prompt(email, "Email")?;
    let password = value_or_prompt(password, "Password")?;
    let api = ApiClient::new(&ctx.backend);
    let result = auth::register(&api, &mut ctx.storage, &username, &email, &password);
    report_auth(result, &ctx.messages)
}

fn report_auth(
    result: Result<crate::api::protocol::SessionUser, ClientError>,
    messages: &Messages,
) -> Result<ExitCode> {
    match result {
        Ok(user) => {
            println!(
                "{} {} {}",
                "✓".green().bold(),
                user.username.bold(),
                messages.elo(user.elo).dimmed()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), describe(&e, messages));
            Ok(ExitCode::FAILURE)
        }
    }
}

pub fn run_logout(ctx: &mut Context, yes: bool) -> Result<ExitCode> {
    let mut navbar = NavbarWidget::new(ctx.messages);
    let mut host = TerminalHost::new(&[]).assume_yes(yes);
    let api = ApiClient::new(&ctx.backend);
    let outcome = navbar.handle_logout(&api, &mut host, &mut ctx.storage);
    tracing::debug!(?outcome, "logout finished");
    Ok(exit_code(!matches!(outcome, LogoutOutcome::Failed(_))))
}

// ---------------------------------------------------------------------------
// chessgen profile
// ---------------------------------------------------------------------------

/// Show the account statistics, or change the email and/or password.
pub fn run_profile(ctx: &mut Context, email: Option<String>, password: bool) -> Result<ExitCode> {
    let api = ApiClient::new(&ctx.backend);

    if email.is_none() && !password {
        return match auth::stats(&api) {
            Ok(stats) => {
                print_stats(&stats, &ctx.messages);
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                eprintln!("{} {}", "✗".red().bold(), describe(&e, &ctx.messages));
                Ok(ExitCode::FAILURE)
            }
        };
    }

    let mut ok = true;
    if let Some(email) = email {
        match auth::update_email(&api, &mut ctx.storage, &email) {
            Ok(user) => println!("{} Email updated for {}", "✓".green().bold(), user.username.bold()),
            Err(e) => {
                ok = false;
                eprintln!("{} {}", "✗".red().bold(), describe(&e, &ctx.messages));
            }
        }
    }
    if password {
        let current = value_or_prompt(None, "Current password")?;
        let new = value_or_prompt(None, "New password")?;
        match auth::change_password(&api, &current, &new) {
            Ok(message) => println!(
                "{} {}",
                "✓".green().bold(),
                message.unwrap_or_else(|| "Password changed".to_string())
            ),
            Err(e) => {
                ok = false;
                eprintln!("{} {}", "✗".red().bold(), describe(&e, &ctx.messages));
            }
        }
    }
    Ok(exit_code(ok))
}

fn print_stats(stats: &UserStats, messages: &Messages) {
    let locale = messages.locale();
    println!("{}", field_line("User", &stats.username.bold().to_string()));
    println!("{}", field_line("Rating", &messages.elo(stats.elo)));
    println!("{}", field_line("Games", &format_thousands(stats.games_played, locale)));
    println!(
        "{}",
        field_line(
            "Won / lost",
            &format!(
                "{} / {}",
                format_thousands(stats.games_won, locale),
                format_thousands(stats.games_lost, locale)
            )
        )
    );
    println!("{}", field_line("Win rate", &format!("{}%", format_number(stats.win_rate))));
    if let Some(since) = &stats.member_since {
        let since = chrono::NaiveDateTime::parse_from_str(since, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|_| since.clone());
        println!("{}", field_line("Member since", &since.dimmed().to_string()));
    }
}

fn value_or_prompt(value: Option<String>, label: &str) -> Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }
    print!("{} ", format!("{label}:").bold());
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

// ---------------------------------------------------------------------------
// chessgen status
// ---------------------------------------------------------------------------

/// Check the backend and the local setup.
pub fn run_status(ctx: &Context) -> Result<ExitCode> {
    println!("{}", "chessgen status".bold().cyan());
    println!("{}", "=".repeat(40));

    print_status_item("API base", true, ctx.api_base().as_str());

    let backend_ok = match ctx.api().status() {
        Ok(status) => {
            print_status_item("Backend", true, "reachable");
            print_status_item(
                "Stockfish",
                status.stockfish_available,
                if status.stockfish_available {
                    "available"
                } else {
                    "not available on the backend"
                },
            );
            print_status_item(
                "Database",
                status.db_initialized,
                if status.db_initialized {
                    "initialized"
                } else {
                    "not initialized"
                },
            );
            if let Some(platform) = &status.platform {
                print_status_item("Platform", true, platform);
            }
            if let Some(error) = &status.error {
                print_status_item("Backend error", false, error);
            }
            status.error.is_none()
        }
        Err(e) => {
            print_status_item("Backend", false, &e.to_string());
            false
        }
    };

    let global_exists = config::global_config_file().is_some_and(|p| p.exists());
    print_status_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.chessgen/config.toml found"
        } else {
            "not found (run `chessgen config init` to create)"
        },
    );

    let session = auth::stored_user(&ctx.storage);
    print_status_item(
        "Stored user",
        session.is_some(),
        &session.map_or_else(
            || "none (run `chessgen login`)".to_string(),
            |user| user.username,
        ),
    );

    let positions = history::read_all(&ctx.state_dir).len();
    print_status_item("History", true, &format!("{positions} positions"));

    Ok(exit_code(backend_ok))
}

fn print_status_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<16} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// chessgen config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective chessgen configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file().is_some_and(|p| p.exists());
    let project_exists = config::project_config_file().is_some_and(|p| p.exists());
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.chessgen/config.toml", global_exists);
    print_source(".chessgen.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "CHESSGEN_* environment variables".dimmed()
    );
    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.chessgen/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_str_opt(Some("table")), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
    }

    #[test]
    fn generate_args_fall_back_to_config() {
        let config = ChessgenConfig::default();
        let args = GenerateArgs {
            target_max: Some("300".to_string()),
            ..GenerateArgs::default()
        };
        assert_eq!(
            args.resolve(&config),
            ("25".to_string(), "300".to_string(), "20000".to_string())
        );
    }

    #[test]
    fn parse_arg_rejects_non_integers() {
        assert_eq!(parse_arg("target_min", " 42 ").unwrap(), 42);
        let err = parse_arg("target_min", "4.2").unwrap_err();
        assert!(err.to_string().contains("target_min"));
    }

    #[test]
    fn csv_fields_are_quoted_when_needed() {
        assert_eq!(csv_field("+0.45"), "+0.45");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
