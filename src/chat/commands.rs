//! Slash command parsing for the chat front-end.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the session without sending messages to the
//! gateway.

/// A parsed chat command.
///
/// These commands control the session locally and are not sent to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Clear the transcript.
    Clear,

    /// Switch the active agent.
    Agent(String),

    /// Show the current session identifier.
    Session,

    /// Drop the session identifier; the next turn starts a fresh session.
    ClearSession,

    /// Submit a file for batch processing.
    /// `None` means no file was given; the command is a no-op.
    Batch(Option<String>),

    /// List tracked batch jobs.
    Jobs,

    /// Stop tracking a batch job by its number.
    Stop(usize),

    /// Show the connection status indicator.
    Status,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use parlance::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/agent spl").is_some());
/// assert!(parse_command("index=main | stats count").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "clear" => ChatCommand::Clear,
        "agent" => match argument {
            Some(agent) => ChatCommand::Agent(agent.to_string()),
            None => ChatCommand::Invalid("/agent requires a selector (doc, spl, dmgen)".to_string()),
        },
        "session" => match argument {
            Some(arg) if arg.eq_ignore_ascii_case("clear") => ChatCommand::ClearSession,
            Some(_) => ChatCommand::Invalid("/session takes no argument (or 'clear')".to_string()),
            None => ChatCommand::Session,
        },
        // Absence of a file is a no-op, matching the file-picker being
        // dismissed without a selection.
        "batch" => ChatCommand::Batch(argument.map(String::from)),
        "jobs" => ChatCommand::Jobs,
        "stop" => match argument.map(|arg| arg.parse::<usize>()) {
            Some(Ok(index)) => ChatCommand::Stop(index),
            Some(Err(_)) => ChatCommand::Invalid("/stop expects a job number".to_string()),
            None => ChatCommand::Invalid("/stop requires a job number (see /jobs)".to_string()),
        },
        "status" => ChatCommand::Status,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        unknown => ChatCommand::Invalid(format!("Unknown command: /{unknown} (try /help)")),
    };

    Some(result)
}

/// Returns the help text describing available commands.
pub fn help_text() -> &'static str {
    "Available commands:\n\
     /help             Show this help\n\
     /quit             Exit the application\n\
     /clear            Clear the transcript\n\
     /agent <sel>      Switch agent: doc, spl, or dmgen\n\
     /session          Show the current session identifier\n\
     /session clear    Start a fresh session on the next turn\n\
     /batch <file>     Submit a file for batch processing\n\
     /jobs             List tracked batch jobs\n\
     /stop <n>         Stop tracking batch job n\n\
     /status           Show the connection status"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_messages_are_not_commands() {
        assert!(parse_command("hello there").is_none());
        assert!(parse_command("  index=main | stats count  ").is_none());
    }

    #[test]
    fn parses_agent_switch() {
        assert_eq!(
            parse_command("/agent spl"),
            Some(ChatCommand::Agent("spl".to_string()))
        );
        assert!(matches!(
            parse_command("/agent"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn parses_session_commands() {
        assert_eq!(parse_command("/session"), Some(ChatCommand::Session));
        assert_eq!(parse_command("/session clear"), Some(ChatCommand::ClearSession));
    }

    #[test]
    fn batch_without_file_is_a_no_op() {
        assert_eq!(parse_command("/batch"), Some(ChatCommand::Batch(None)));
        assert_eq!(
            parse_command("/batch queries.csv"),
            Some(ChatCommand::Batch(Some("queries.csv".to_string())))
        );
    }

    #[test]
    fn parses_stop_with_index() {
        assert_eq!(parse_command("/stop 2"), Some(ChatCommand::Stop(2)));
        assert!(matches!(
            parse_command("/stop two"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn quit_aliases() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
    }

    #[test]
    fn unknown_command_is_invalid() {
        assert!(matches!(
            parse_command("/frobnicate"),
            Some(ChatCommand::Invalid(_))
        ));
    }
}
