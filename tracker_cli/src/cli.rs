use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracker_client::overlay::FeedStatus;
use tracker_client::{OverlayInstance, Page, Services};

use crate::host::OverlayStack;
use crate::render::render_instance;

/// How long the interactive session waits for fetches before rendering
/// whatever has arrived.
const SETTLE_WINDOW: Duration = Duration::from_secs(10);

/// Load one overlay, optionally page through all comments, print and exit.
pub async fn run_show(
    services: Services,
    user_id: &str,
    page: Page,
    all_comments: bool,
) -> Result<()> {
    let mut overlay = OverlayInstance::for_user(user_id, None, services);
    overlay.open();
    overlay
        .settle()
        .await
        .with_context(|| format!("failed to load tracker data for {user_id}"))?;

    if all_comments {
        while overlay.comments().status() == FeedStatus::Loaded
            && overlay.request_next_page().is_ok()
        {
            overlay
                .settle()
                .await
                .with_context(|| format!("failed to load comments for {user_id}"))?;
        }
    }

    overlay.select_page(page);
    print!("{}", render_instance(&overlay));
    overlay.close();
    Ok(())
}

/// Interactive session: one overlay stack driven by typed commands.
pub async fn run_browse(services: Services, user_id: &str) -> Result<()> {
    let mut session = BrowseSession {
        stack: OverlayStack::new(),
        services,
    };
    session
        .stack
        .open(OverlayInstance::for_user(user_id, None, session.services.clone()));
    session.refresh().await;
    println!("Type 'help' for a list of commands.");

    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin);

    loop {
        print!("tracker> ");
        io::stdout().flush()?;

        let mut line = String::new();
        let read = reader.read_line(&mut line).await?;
        if read == 0 {
            println!("Exiting");
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let tokens = match shell_words::split(trimmed) {
            Ok(tokens) if !tokens.is_empty() => tokens,
            Ok(_) => continue,
            Err(err) => {
                println!("Unable to parse command: {err}");
                continue;
            }
        };

        match session.handle_command(&tokens).await {
            LoopAction::Continue => {}
            LoopAction::Exit => break,
        }
    }

    session.stack.close_all();
    Ok(())
}

struct BrowseSession {
    stack: OverlayStack,
    services: Services,
}

enum LoopAction {
    Continue,
    Exit,
}

impl BrowseSession {
    async fn handle_command(&mut self, tokens: &[String]) -> LoopAction {
        self.sync_current();
        let command = tokens[0].as_str();
        match command {
            "help" => self.print_help(),
            "show" | "refresh" => self.refresh().await,
            "profile" => self.switch_page(Page::Profile).await,
            "servers" | "guilds" => self.switch_page(Page::Guilds).await,
            "more" => self.load_more().await,
            "open" => match tokens.get(1).map(|raw| raw.parse::<i64>()) {
                Some(Ok(comment_id)) => self.open_author(comment_id).await,
                _ => println!("Usage: open <comment_id>"),
            },
            "join" => self.join_voice(),
            "back" | "close" => {
                if let Some(key) = self.stack.close_current() {
                    println!("Closed {key}");
                }
                if self.stack.is_empty() {
                    return LoopAction::Exit;
                }
                self.refresh().await;
            }
            "quit" | "exit" => return LoopAction::Exit,
            other => println!("Unknown command '{other}'. Type 'help' for a list of commands."),
        }
        LoopAction::Continue
    }

    fn print_help(&self) {
        println!("Available commands:");
        println!("  help                 Show this help message");
        println!("  show                 Redraw the current overlay");
        println!("  profile              Switch to the profile page");
        println!("  servers              Switch to the mutual servers page");
        println!("  more                 Load the next page of comments");
        println!("  open <comment_id>    Open the overlay of a comment's author");
        println!("  join                 Join the voice channel the user is in");
        println!("  back                 Close the current overlay");
        println!("  quit                 Close every overlay and exit");
    }

    async fn switch_page(&mut self, page: Page) {
        if let Some(current) = self.stack.current_mut() {
            current.select_page(page);
        }
        self.refresh().await;
    }

    async fn load_more(&mut self) {
        let Some(current) = self.stack.current_mut() else {
            return;
        };
        match current.request_next_page() {
            Ok(page) => {
                println!("Loading page {page}...");
                self.refresh().await;
            }
            Err(err) => println!("{err}"),
        }
    }

    async fn open_author(&mut self, comment_id: i64) {
        let Some(current) = self.stack.current() else {
            return;
        };
        let Some(comment) = current.find_comment(comment_id) else {
            println!("No comment #{comment_id} is loaded");
            return;
        };
        let child = current.open_comment_author(comment);
        match child {
            Some(child) => {
                self.stack.open(child);
                self.refresh().await;
            }
            None => println!("Comment #{comment_id} is anonymous"),
        }
    }

    fn join_voice(&self) {
        let joined = self
            .stack
            .current()
            .map(OverlayInstance::join_voice)
            .unwrap_or(false);
        if !joined {
            println!("Not in a voice channel");
        }
    }

    /// Applies results that already arrived without waiting.
    fn sync_current(&mut self) {
        let outcome = match self.stack.current_mut() {
            Some(current) => current.process_messages().map(|_| ()),
            None => return,
        };
        if let Err(err) = outcome {
            self.fail_current(err);
        }
    }

    /// Waits (bounded) for in-flight fetches, then redraws.
    async fn refresh(&mut self) {
        let Some(current) = self.stack.current_mut() else {
            return;
        };
        let settled = tokio::time::timeout(SETTLE_WINDOW, current.settle()).await;
        let outcome = match settled {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::debug!(key = %current.key(), "fetches still pending");
                Ok(())
            }
        };
        if let Err(err) = outcome {
            self.fail_current(err);
        }
        if let Some(current) = self.stack.current() {
            print!("{}", render_instance(current));
        }
    }

    fn fail_current(&mut self, err: tracker_client::ApiError) {
        tracing::error!(error = %err, "overlay failed");
        println!("Error: {err}");
        if let Some(key) = self.stack.close_current() {
            println!("Closed {key}");
        }
    }
}
