//! Console surface: reads lines from stdin, drives the turn controller,
//! redraws the full transcript after every mutation.
//!
//! Commands:
//! - `/image <path>` stage a jpg/jpeg/png attachment for the next send
//! - `/clear`        clear the conversation
//! - `/help`         print command help
//! - `/quit`         exit (Ctrl-C works too)
//!
//! Any other line is a send action; an empty line with nothing staged is
//! rejected with a warning and consumes no turn. Runs until the `shutdown`
//! token is cancelled or stdin is closed.

use std::path::Path;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::chat::{TurnController, TurnOutcome};
use crate::error::AppError;
use crate::session::{Attachment, Role, Session};

const RULE: &str = "─────────────────────────────────────────────";

// ── Command parsing ──────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Send(&'a str),
    Image(&'a str),
    Clear,
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse_command(input: &str) -> Command<'_> {
    if !input.starts_with('/') {
        return Command::Send(input);
    }
    if let Some(rest) = input.strip_prefix("/image") {
        if rest.is_empty() || rest.starts_with(' ') {
            return Command::Image(rest.trim());
        }
    }
    match input {
        "/clear" => Command::Clear,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Unknown(input),
    }
}

// ── Rendering ────────────────────────────────────────────────────────────────

/// Render the full conversation. Always the whole sequence; there is no
/// partial or incremental view.
fn render_transcript(session: &Session) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    if session.conversation.is_empty() {
        out.push_str(" (empty conversation)\n");
    }
    for message in session.conversation.messages() {
        let label = match message.role {
            Role::User => "You",
            Role::Model => "Gemini",
        };
        out.push_str(&format!(
            "[{}] {label}: {}\n",
            message.timestamp.format("%H:%M:%S"),
            message.text
        ));
        if let Some(att) = &message.image {
            out.push_str(&format!(
                "           [image: {} ({}, {} bytes)]\n",
                att.name,
                att.mime_type,
                att.data.len()
            ));
        }
    }
    out.push_str(RULE);
    out.push('\n');
    out
}

fn print_help() {
    println!("  <text>          send a message");
    println!("  /image <path>   attach a jpg/jpeg/png to the next message");
    println!("  /clear          clear the conversation");
    println!("  /quit           exit");
}

// ── run ──────────────────────────────────────────────────────────────────────

/// Drive the console until shutdown. Owns the session: its lifetime is this
/// one interaction.
pub async fn run(
    mut session: Session,
    controller: &TurnController,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    info!(session_id = %session.id(), "console started");
    println!("{RULE}");
    println!(" Gemini multimodal chat  (model: {})", controller.provider().model_name());
    println!(" /help for commands, /quit or Ctrl-C to exit");
    println!("{RULE}");

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    let mut staged: Option<Attachment> = None;

    loop {
        print!("> ");
        use std::io::Write as _;
        let _ = std::io::stdout().flush();

        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                println!("\n[console] shutdown signal received");
                info!("console shutting down");
                break;
            }

            line = lines.next_line() => {
                match line {
                    Err(e) => {
                        warn!("console read error: {e}");
                        break;
                    }
                    Ok(None) => {
                        info!("stdin closed");
                        break;
                    }
                    Ok(Some(input)) => {
                        let input = input.trim().to_string();
                        debug!(input = %input, "console received line");

                        match parse_command(&input) {
                            Command::Quit => break,
                            Command::Help => print_help(),
                            Command::Unknown(cmd) => {
                                println!("unknown command: {cmd} (try /help)");
                            }
                            Command::Image(path) => {
                                stage_attachment(path, &mut staged);
                            }
                            Command::Clear => {
                                controller.clear(&mut session);
                                print!("{}", render_transcript(&session));
                            }
                            Command::Send(text) => {
                                // Staging is one-shot: consumed by this send
                                // whether or not the call succeeds.
                                let image = staged.take();
                                match controller.send(&mut session, text, image).await {
                                    TurnOutcome::Rejected => {
                                        println!("Please enter a message or upload an image.");
                                    }
                                    TurnOutcome::Completed => {
                                        print!("{}", render_transcript(&session));
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

fn stage_attachment(path: &str, staged: &mut Option<Attachment>) {
    if path.is_empty() {
        println!("usage: /image <path>");
        return;
    }
    match Attachment::from_file(Path::new(path)) {
        Ok(att) => {
            println!(
                "staged {} ({}, {} bytes); it will be sent with your next message",
                att.name,
                att.mime_type,
                att.data.len()
            );
            *staged = Some(att);
        }
        Err(e) => println!("{e}"),
    }
}
