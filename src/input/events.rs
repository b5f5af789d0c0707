//! Player commands understood by the logic thread.

use crate::models::settings::{Difficulty, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    // Run lifecycle
    Start,
    TogglePause,
    Quit,
    Reboot,

    // Configuration (between runs only)
    SelectDifficulty(Difficulty),
    SelectTheme(Theme),

    // System
    Exit,
}

impl GameAction {
    /// Parses one console line such as `start` or `difficulty hard`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = words.next()?.to_ascii_lowercase();
        let argument = words.next();
        if words.next().is_some() {
            return None;
        }

        match (command.as_str(), argument) {
            ("start" | "play", None) => Some(GameAction::Start),
            ("pause" | "resume" | "p", None) => Some(GameAction::TogglePause),
            ("quit" | "q", None) => Some(GameAction::Quit),
            ("reboot" | "again", None) => Some(GameAction::Reboot),
            ("difficulty" | "d", Some(name)) => {
                Difficulty::parse(name).map(GameAction::SelectDifficulty)
            }
            ("theme" | "t", Some(name)) => Theme::parse(name).map(GameAction::SelectTheme),
            ("exit", None) => Some(GameAction::Exit),
            _ => None,
        }
    }
}
