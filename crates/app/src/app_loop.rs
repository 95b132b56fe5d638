use std::sync::Arc;

use explorer_core::{Command, GameSession, ScoreStore, SessionPhase};

use crate::ui_text;

/// One line of player input, after parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppInput {
    Session(Command),
    Look,
    Scores { mine: bool },
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq, Default)]
pub enum AppMode {
    #[default]
    Running,
    Finished,
}

const PLAY_AGAIN_HINT: &str = "Type 'new' to play again or 'scores' to see the leaderboard.";

pub struct AppState {
    pub mode: AppMode,
    /// Commands the session accepted during the last `handle_line()` call.
    /// Drained by the caller to persist to the journal file.
    pub accepted_inputs: Vec<Command>,
    store: Arc<dyn ScoreStore>,
    leaderboard_limit: usize,
}

pub fn parse_input(line: &str) -> Result<AppInput, String> {
    let trimmed = line.trim();
    let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (trimmed, ""),
    };

    let input = match verb.to_ascii_lowercase().as_str() {
        "" => return Err("Type a command, or 'help' for a list.".to_string()),
        "new" | "start" => AppInput::Session(Command::StartNewGame),
        "menu" => AppInput::Session(Command::ReturnToMenu),
        "go" | "move" => {
            if rest.is_empty() {
                return Err("Go where?".to_string());
            }
            go(expand_direction(rest))
        }
        direction @ ("n" | "s" | "e" | "w" | "north" | "south" | "east" | "west") => {
            go(expand_direction(direction))
        }
        "take" | "pickup" | "get" => AppInput::Session(Command::PickupItem),
        "name" => AppInput::Session(Command::SetPlayerName { name: rest.to_string() }),
        "look" | "l" => AppInput::Look,
        "scores" | "leaderboard" => AppInput::Scores { mine: rest.eq_ignore_ascii_case("mine") },
        "help" | "?" => AppInput::Help,
        "quit" | "exit" | "q" => AppInput::Quit,
        other => {
            return Err(format!(
                "I don't understand '{other}'. Type 'help' for a list of commands."
            ));
        }
    };
    Ok(input)
}

fn go(direction: &str) -> AppInput {
    AppInput::Session(Command::Move { direction: direction.to_string() })
}

fn expand_direction(raw: &str) -> &str {
    match raw.to_ascii_lowercase().as_str() {
        "n" => "north",
        "s" => "south",
        "e" => "east",
        "w" => "west",
        _ => raw,
    }
}

impl AppState {
    pub fn new(store: Arc<dyn ScoreStore>, leaderboard_limit: usize) -> Self {
        Self { mode: AppMode::Running, accepted_inputs: Vec::new(), store, leaderboard_limit }
    }

    /// Handles one line of input and returns the text to show the player.
    pub fn handle_line(&mut self, session: &mut GameSession, line: &str) -> Vec<String> {
        self.accepted_inputs.clear();
        if self.mode == AppMode::Finished {
            return Vec::new();
        }

        let input = match parse_input(line) {
            Ok(input) => input,
            Err(message) => return vec![message],
        };

        match input {
            AppInput::Session(command) => self.apply_and_record(session, command),
            AppInput::Look => match session.phase() {
                SessionPhase::Playing => ui_text::room_lines(&session.view()),
                phase => vec![ui_text::phase_text(phase).to_string()],
            },
            AppInput::Scores { mine } => self.scores(session, mine),
            AppInput::Help => ui_text::help_lines(),
            AppInput::Quit => {
                self.mode = AppMode::Finished;
                vec![format!("Farewell, {}.", session.player_name())]
            }
        }
    }

    fn apply_and_record(&mut self, session: &mut GameSession, command: Command) -> Vec<String> {
        let result = session.apply(&command);
        let mut lines = ui_text::status_lines(session.status());

        match result {
            Ok(_) => {
                self.accepted_inputs.push(command.clone());
                match session.phase() {
                    SessionPhase::Playing if !matches!(command, Command::SetPlayerName { .. }) => {
                        lines.extend(ui_text::room_lines(&session.view()));
                    }
                    SessionPhase::GameOver { .. } => {
                        lines.push(PLAY_AGAIN_HINT.to_string());
                    }
                    _ => {}
                }
            }
            Err(e) => tracing::debug!("rejected {command:?}: {e:?}"),
        }
        lines
    }

    fn scores(&self, session: &GameSession, mine: bool) -> Vec<String> {
        let (title, records) = if mine {
            let title = format!("Scores for {}", session.player_name());
            (title, self.store.scores_for_player(session.player_name(), self.leaderboard_limit))
        } else {
            ("Top scores".to_string(), self.store.top_scores(self.leaderboard_limit))
        };

        match records {
            Ok(records) => ui_text::leaderboard_lines(&title, &records),
            Err(e) => {
                tracing::warn!("failed to read scores: {e}");
                vec![format!("Could not read scores: {e}")]
            }
        }
    }
}
