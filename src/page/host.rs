//! Browser capabilities used by the page components.
//!
//! The components never print, prompt, sleep or touch the clipboard
//! directly; they ask a [`Host`]. The binary uses [`TerminalHost`]; tests use
//! a recording implementation.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;

use super::Document;
use super::render;

pub trait Host {
    /// The document changed in a way the user should see now.
    fn repaint(&mut self, doc: &Document);

    /// Blocking yes/no question.
    fn confirm(&mut self, message: &str) -> bool;

    /// Blocking notification.
    fn alert(&mut self, message: &str);

    /// Leave the current page for `page` (e.g. `auth.html`).
    fn navigate(&mut self, page: &str);

    fn write_clipboard(&mut self, text: &str) -> Result<()>;

    /// Suspend the current flow for `duration`.
    fn pause(&mut self, duration: Duration);
}

// ---------------------------------------------------------------------------
// Terminal host
// ---------------------------------------------------------------------------

/// [`Host`] for an interactive terminal.
///
/// Repaints print only the watched elements whose text changed since the
/// previous repaint, so a flow reads as a short log of status lines.
pub struct TerminalHost {
    assume_yes: bool,
    skip_pauses: bool,
    watched: Vec<&'static str>,
    last_seen: BTreeMap<&'static str, String>,
}

impl TerminalHost {
    /// `watched` lists the element ids echoed on repaint.
    pub fn new(watched: &[&'static str]) -> Self {
        Self {
            assume_yes: false,
            skip_pauses: false,
            watched: watched.to_vec(),
            last_seen: BTreeMap::new(),
        }
    }

    /// Answer every confirmation with "yes" (`--yes`).
    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    /// Return from [`Host::pause`] immediately. One-shot commands exit right
    /// after the flow, so there is nobody left to watch a timed label.
    pub fn skip_pauses(mut self, skip: bool) -> Self {
        self.skip_pauses = skip;
        self
    }
}

impl Host for TerminalHost {
    fn repaint(&mut self, doc: &Document) {
        for &id in &self.watched {
            let Some(element) = doc.get(id) else {
                continue;
            };
            if element.hidden || element.text.is_empty() {
                self.last_seen.remove(id);
                continue;
            }
            if self.last_seen.get(id) == Some(&element.text) {
                continue;
            }
            self.last_seen.insert(id, element.text.clone());
            println!("{}", render::element_line(element));
        }
    }

    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{} {} ", message.bold(), "[y/N]".dimmed());
        if std::io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(
            answer.trim().to_ascii_lowercase().as_str(),
            "y" | "yes" | "o" | "oui"
        )
    }

    fn alert(&mut self, message: &str) {
        eprintln!("{} {}", "!".red().bold(), message);
    }

    fn navigate(&mut self, page: &str) {
        tracing::info!(page, "navigating");
        println!("{} {}", "→".cyan().bold(), page.bold());
    }

    fn write_clipboard(&mut self, text: &str) -> Result<()> {
        copy_to_system_clipboard(text)
    }

    fn pause(&mut self, duration: Duration) {
        if !self.skip_pauses {
            std::thread::sleep(duration);
        }
    }
}

/// Pipe `text` into the platform clipboard tool.
fn copy_to_system_clipboard(text: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    let candidates: &[(&str, &[&str])] = &[("clip", &[])];

    #[cfg(target_os = "macos")]
    let candidates: &[(&str, &[&str])] = &[("pbcopy", &[])];

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let candidates: &[(&str, &[&str])] = &[
        ("wl-copy", &[]),
        ("xclip", &["-selection", "clipboard"]),
        ("xsel", &["--clipboard", "--input"]),
    ];

    let mut last_error = None;
    for (program, args) in candidates {
        match pipe_into(program, args, text) {
            Ok(()) => return Ok(()),
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("no clipboard tool available")))
}

fn pipe_into(program: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to start {program}"))?;

    child
        .stdin
        .take()
        .context("clipboard tool has no stdin")?
        .write_all(text.as_bytes())
        .with_context(|| format!("failed writing to {program}"))?;

    let status = child
        .wait()
        .with_context(|| format!("failed waiting for {program}"))?;
    if !status.success() {
        anyhow::bail!("{program} exited with {status}");
    }
    Ok(())
}
