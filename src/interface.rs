use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use colored::*;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::hint::Hinter;
use rustyline::{CompletionType, Config, Context, Editor, Helper, Highlighter, Validator};
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::pagination::{PageSize, PaginationState};
use crate::panels::{MessagePanel, PanelEvent, PanelKind, StatsPanel};
use crate::utils::truncate_cell;
use crate::view::{Badge, MessagesView, StatsView};

/// Available slash commands for tab-completion.
const COMMANDS: &[&str] = &[
    "/help", "/quit", "/exit", "/stats", "/messages", "/next", "/prev", "/page", "/size",
];

const CONTENT_WIDTH: usize = 40;
const RESPONSE_WIDTH: usize = 40;

/// Rustyline helper providing slash-command tab-completion and inline hints.
#[derive(Helper, Validator, Highlighter)]
struct CommandCompleter;

impl Hinter for CommandCompleter {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos != line.len() || !line.starts_with('/') || line.contains(' ') {
            return None;
        }

        COMMANDS
            .iter()
            .find(|cmd| cmd.starts_with(line) && **cmd != line)
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        if !prefix.starts_with('/') || prefix.contains(' ') {
            return Ok((0, vec![]));
        }

        let matches: Vec<Pair> = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(prefix))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();

        Ok((0, matches))
    }
}

/// A parsed REPL line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    ShowStats,
    ShowMessages,
    NextPage,
    PreviousPage,
    /// Zero-based index (the user types a 1-based page number).
    GoToPage(usize),
    SetPageSize(PageSize),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();

        let command = match name {
            "/help" => Self::Help,
            "/quit" | "/exit" => Self::Quit,
            "/stats" => Self::ShowStats,
            "/messages" => Self::ShowMessages,
            "/next" => Self::NextPage,
            "/prev" => Self::PreviousPage,
            "/page" => {
                let raw = arg.ok_or_else(|| anyhow!("Usage: /page <number>"))?;
                let number: usize = raw
                    .parse()
                    .map_err(|_| anyhow!("'{}' is not a page number", raw))?;
                if number == 0 {
                    return Err(anyhow!("Pages are numbered from 1"));
                }
                if number - 1 > PaginationState::MAX_PAGE_INDEX {
                    return Err(anyhow!(
                        "Page {} is out of range (last allowed page is {})",
                        number,
                        PaginationState::MAX_PAGE_INDEX + 1
                    ));
                }
                Self::GoToPage(number - 1)
            }
            "/size" => {
                let raw = arg.ok_or_else(|| anyhow!("Usage: /size <10|25|100>"))?;
                Self::SetPageSize(raw.parse()?)
            }
            other => return Err(anyhow!("Unknown command '{}'. Type /help", other)),
        };

        if parts.next().is_some() {
            return Err(anyhow!("Too many arguments for {}", name));
        }
        Ok(command)
    }
}

pub fn print_banner(config: &AppConfig) {
    println!("{}", "====================================".bright_cyan());
    println!("{}", "        BOT ADMIN DASHBOARD         ".bright_cyan().bold());
    println!("{}", "====================================".bright_cyan());
    println!(" {} {}", "Backend:".bright_white(), config.api_base_url.dimmed());
    println!("{}\n", " Type /help for commands or /quit to exit".dimmed());
}

fn print_help() {
    println!("\n{}", "Available Commands:".bright_cyan().bold());
    println!("  {}  - Exit the dashboard", "/quit, /exit".green());
    println!("  {}         - Show this help", "/help".green());
    println!("  {}        - Show the statistics block", "/stats".green());
    println!("  {}     - Show the current message page", "/messages".green());
    println!("  {}         - Next page", "/next".green());
    println!("  {}         - Previous page", "/prev".green());
    println!("  {} <n>     - Jump to page n", "/page".green());
    println!("  {} <n>     - Rows per page (10, 25, 100)", "/size".green());
    println!();
}

pub fn format_stats(view: &StatsView) -> String {
    let mut out = format!("{}\n", "Statistics".bright_cyan().bold());
    match view {
        StatsView::Loading => {
            out.push_str(&format!("  {}\n", "Loading statistics...".dimmed()));
        }
        StatsView::Ready(counters) => {
            for counter in counters {
                out.push_str(&format!(
                    "  {}  {}\n",
                    format!("{:>8}", counter.value).bright_white().bold(),
                    counter.label.dimmed()
                ));
            }
        }
    }
    out
}

fn badge_cell(badge: Badge) -> ColoredString {
    let text = format!("{:<8}", badge.label());
    match badge {
        Badge::Funny => text.bright_green(),
        Badge::Ordinary => text.normal(),
    }
}

pub fn format_messages(view: &MessagesView) -> String {
    let mut out = format!("{}\n", "Messages".bright_cyan().bold());

    if view.rows.is_empty() && view.displayed.is_none() {
        out.push_str(&format!("  {}\n", "Loading messages...".dimmed()));
    } else if view.rows.is_empty() {
        out.push_str(&format!("  {}\n", "No messages on this page.".yellow()));
    } else {
        for row in &view.rows {
            out.push_str(&format!(
                "  {}  {}  {}\n",
                row.created_at.dimmed(),
                badge_cell(row.badge),
                row.user.bright_blue()
            ));
            out.push_str(&format!(
                "      {} {}\n",
                "»".dimmed(),
                truncate_cell(&row.content, CONTENT_WIDTH)
            ));
            out.push_str(&format!(
                "      {} {}\n",
                "«".dimmed(),
                truncate_cell(&row.response, RESPONSE_WIDTH).bright_black()
            ));
        }
    }

    let mut footer = format!(
        "  Page {} · {} per page · {}",
        view.page_number(),
        view.pagination.page_size,
        view.range_label()
    );
    if view.loading {
        footer.push_str(" · refreshing");
    }
    out.push_str(&format!("{}\n", footer.dimmed()));
    out
}

/// Start a spinner animation in a background thread.
/// Returns an `Arc<AtomicBool>`: set it to `false` to stop the spinner.
fn start_spinner(message: &str) -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    let msg = message.to_string();

    std::thread::spawn(move || {
        let frames = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
        let mut i = 0;
        while running_clone.load(Ordering::Relaxed) {
            print!("\r{} {} ", frames[i % frames.len()].to_string().cyan(), msg.dimmed());
            let _ = io::stdout().flush();
            std::thread::sleep(Duration::from_millis(80));
            i += 1;
        }
        print!("\r{}\r", " ".repeat(msg.len() + 4));
        let _ = io::stdout().flush();
    });

    running
}

async fn stop_spinner(handle: &Arc<AtomicBool>) {
    handle.store(false, Ordering::Relaxed);
    // Give the spinner thread time to clear the line
    tokio::time::sleep(Duration::from_millis(100)).await;
}

/// Wait until `panel` settles (loaded or failed), or the deadline passes.
/// Returns `false` on timeout; the fetch keeps running in that case.
async fn wait_for_settle(
    events: &mut broadcast::Receiver<PanelEvent>,
    panel: PanelKind,
    wait: Duration,
) -> bool {
    let settled = async {
        loop {
            match events.recv().await {
                Ok(event) if event.panel() == panel => return true,
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return false,
            }
        }
    };
    tokio::time::timeout(wait, settled).await.unwrap_or(false)
}

/// Drop notifications that piled up while the prompt was idle.
fn drain(events: &mut broadcast::Receiver<PanelEvent>) {
    while let Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) = events.try_recv() {}
}

/// Terminal rendition of the page: stats block above the message table,
/// slash commands for pagination.
pub async fn start_repl(
    config: &AppConfig,
    stats: Arc<StatsPanel>,
    messages: Arc<MessagePanel>,
) -> Result<()> {
    print_banner(config);
    let wait = Duration::from_secs(config.render_wait_secs);

    let mut stats_events = stats.subscribe();
    let mut message_events = messages.subscribe();

    stats.mount().await;
    messages.mount().await;

    let spinner = start_spinner("Loading dashboard...");
    let (stats_ready, messages_ready) = tokio::join!(
        wait_for_settle(&mut stats_events, PanelKind::Stats, wait),
        wait_for_settle(&mut message_events, PanelKind::Messages, wait),
    );
    stop_spinner(&spinner).await;
    if !stats_ready || !messages_ready {
        println!("{}", "⚠️  Backend is slow to answer; showing what is available.".yellow());
    }

    println!("{}", format_stats(&stats.view().await));
    println!("{}", format_messages(&messages.view().await));

    let rl_config = Config::builder()
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(100)
        .build();
    let mut rl = Editor::with_config(rl_config)?;
    rl.set_helper(Some(CommandCompleter));

    loop {
        let readline = rl.readline(&"> ".bright_cyan().bold().to_string());
        let line = match readline {
            Ok(line) => line.trim().to_string(),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                println!("{} {}", "✗ Input error:".red(), e);
                continue;
            }
        };

        if line.is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{} {}", "✗".red(), e);
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => print_help(),
            Command::ShowStats => println!("{}", format_stats(&stats.view().await)),
            Command::ShowMessages => println!("{}", format_messages(&messages.view().await)),
            Command::NextPage
            | Command::PreviousPage
            | Command::GoToPage(_)
            | Command::SetPageSize(_) => {
                drain(&mut message_events);
                let before = messages.pagination().await;
                let applied = match command {
                    Command::NextPage => messages.next_page().await,
                    Command::PreviousPage => {
                        messages.previous_page().await;
                        Ok(())
                    }
                    Command::GoToPage(index) => messages.set_page(index).await,
                    Command::SetPageSize(size) => {
                        messages.set_page_size(size).await;
                        Ok(())
                    }
                    _ => Ok(()),
                };
                if let Err(e) = applied {
                    println!("{} {}", "✗".red(), e);
                    continue;
                }
                if messages.pagination().await != before {
                    let spinner = start_spinner("Fetching messages...");
                    let settled =
                        wait_for_settle(&mut message_events, PanelKind::Messages, wait).await;
                    stop_spinner(&spinner).await;
                    if !settled {
                        println!("{}", "⚠️  Still waiting for the backend; try /messages later.".yellow());
                    }
                }
                println!("{}", format_messages(&messages.view().await));
            }
        }
    }

    println!("Goodbye!");
    stats.unmount().await;
    messages.unmount().await;
    Ok(())
}
