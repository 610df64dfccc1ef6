//! Interactive chat application for the agent gateway.
//!
//! This binary provides a REPL interface for chatting with the gateway's
//! agents and for submitting batch files tracked between prompts.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage against PARLANCE_URL (or the local default)
//! parlance-chat
//!
//! # Specify the gateway and starting agent
//! parlance-chat --url http://gateway.example.com/ --agent spl
//!
//! # Disable colors (useful for piping output)
//! parlance-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/agent <sel>` - Switch agent (doc, spl, dmgen)
//! - `/batch <file>` - Submit a file for batch processing
//! - `/jobs` - List tracked batch jobs
//! - `/session` - Show the session identifier
//! - `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use parlance::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, help_text,
    parse_command,
};
use parlance::{
    Agent, BatchOutcome, BatchTracker, Category, Entry, Gateway, submit_and_track,
};

/// Main entry point for the parlance-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("parlance-chat [OPTIONS]");
    let config = ChatConfig::try_from(args)?;
    let use_color = config.use_color;
    let poll_interval = config.poll_interval;

    let gateway = Gateway::new(config.base_url.clone())?;
    let mut session = ChatSession::new(gateway.clone(), config);
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;
    let mut trackers: Vec<BatchTracker> = Vec::new();

    println!("Parlance chat (agent: {})", session.agent().name());
    println!("Type /help for commands, /quit to exit\n");
    session.check_health(&mut renderer).await;

    loop {
        // Surface batch jobs that terminated since the last prompt.
        drain_finished(&mut trackers, &gateway, &mut session, &mut renderer);

        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Check for slash commands
                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Clear => {
                            session.clear();
                            session.record(
                                Entry::new(Category::System, "Transcript cleared."),
                                &mut renderer,
                            );
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Agent(selector) => match selector.parse::<Agent>() {
                            Ok(agent) => session.set_agent(agent, &mut renderer),
                            Err(err) => session.record(
                                Entry::new(Category::Error, err.to_string()),
                                &mut renderer,
                            ),
                        },
                        ChatCommand::Session => match session.session_id() {
                            Some(id) => println!("    Session: {}", id),
                            None => println!("    Session: (none yet)"),
                        },
                        ChatCommand::ClearSession => {
                            session.clear_session();
                            session.record(
                                Entry::new(
                                    Category::System,
                                    "Session cleared; the next message starts fresh.",
                                ),
                                &mut renderer,
                            );
                        }
                        // A missing file is a silent no-op.
                        ChatCommand::Batch(None) => {}
                        ChatCommand::Batch(Some(path)) => {
                            submit_batch(
                                &gateway,
                                &path,
                                poll_interval,
                                &mut trackers,
                                &mut session,
                                &mut renderer,
                            )
                            .await;
                        }
                        ChatCommand::Jobs => {
                            print_jobs(&trackers);
                        }
                        ChatCommand::Stop(number) => {
                            match trackers.get_mut(number.wrapping_sub(1)) {
                                Some(tracker) => {
                                    tracker.stop();
                                    session.record(
                                        Entry::new(
                                            Category::System,
                                            format!("Stopped tracking {}.", tracker.label()),
                                        ),
                                        &mut renderer,
                                    );
                                }
                                None => session.record(
                                    Entry::new(
                                        Category::Error,
                                        format!("No tracked job #{number} (see /jobs)"),
                                    ),
                                    &mut renderer,
                                ),
                            }
                        }
                        ChatCommand::Status => {
                            renderer.connection_status(session.status());
                        }
                        ChatCommand::Invalid(message) => {
                            session.record(Entry::new(Category::Error, message), &mut renderer);
                        }
                    }
                    continue;
                }

                // Regular message - send to the gateway
                if let Err(e) = session.send(line, &mut renderer).await {
                    session.record(Entry::new(Category::Error, e.to_string()), &mut renderer);
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Input error: {}", err);
                break;
            }
        }
    }

    // Abandon any jobs still polling; the gateway keeps processing them.
    for tracker in &mut trackers {
        tracker.stop();
    }

    Ok(())
}

/// Submit a batch file and start tracking it.
async fn submit_batch(
    gateway: &Gateway,
    path: &str,
    poll_interval: std::time::Duration,
    trackers: &mut Vec<BatchTracker>,
    session: &mut ChatSession<Gateway>,
    renderer: &mut PlainTextRenderer,
) {
    session.record(
        Entry::new(Category::System, format!("Selected file: {path}")),
        renderer,
    );
    session.record(
        Entry::new(Category::System, "Uploading batch file..."),
        renderer,
    );

    match submit_and_track(
        gateway,
        session.agent(),
        std::path::Path::new(path),
        poll_interval,
    )
    .await
    {
        Ok(tracker) => {
            session.record(
                Entry::new(Category::System, "Batch job started, tracking status."),
                renderer,
            );
            trackers.push(tracker);
        }
        Err(err) => {
            session.record(
                Entry::new(Category::Error, format!("Batch failed: {err}")),
                renderer,
            );
        }
    }
}

/// Surface outcomes of finished batch jobs and forget completed trackers.
fn drain_finished(
    trackers: &mut Vec<BatchTracker>,
    gateway: &Gateway,
    session: &mut ChatSession<Gateway>,
    renderer: &mut PlainTextRenderer,
) {
    for tracker in trackers.iter_mut() {
        let Some(outcome) = tracker.try_outcome() else {
            continue;
        };
        match outcome {
            BatchOutcome::Completed { result_url } => {
                let href = gateway
                    .resolve(&result_url)
                    .map(|url| url.to_string())
                    .unwrap_or(result_url);
                session.record(
                    Entry::new(
                        Category::System,
                        format!("Batch completed: {}", tracker.label()),
                    ),
                    renderer,
                );
                session.record(Entry::link("Download result file", href), renderer);
            }
            BatchOutcome::Failed { message } => {
                session.record(
                    Entry::new(Category::Error, format!("Batch failed: {message}")),
                    renderer,
                );
            }
        }
    }
    trackers.retain(|tracker| !tracker.is_finished());
}

fn print_jobs(trackers: &[BatchTracker]) {
    if trackers.is_empty() {
        println!("    No tracked batch jobs.");
        return;
    }
    println!("    Tracked batch jobs:");
    for (index, tracker) in trackers.iter().enumerate() {
        let state = if tracker.is_stopped() {
            "stopped"
        } else if tracker.is_finished() {
            "finishing"
        } else {
            "polling"
        };
        println!("      {}. {} ({})", index + 1, tracker.label(), state);
    }
}
