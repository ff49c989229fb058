use std::fmt;
use std::str::FromStr;

/// Outcome of a recorded game, as written in its `Result` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOutcome {
    WhiteWin,
    BlackWin,
    Draw,
}

impl GameOutcome {
    pub fn is_draw(self) -> bool {
        self == GameOutcome::Draw
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameOutcome::WhiteWin => "1-0",
            GameOutcome::BlackWin => "0-1",
            GameOutcome::Draw => "1/2-1/2",
        }
    }
}

impl FromStr for GameOutcome {
    type Err = ();

    /// Only finished games are accepted, `*` is rejected
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1-0" => Ok(GameOutcome::WhiteWin),
            "0-1" => Ok(GameOutcome::BlackWin),
            "1/2-1/2" => Ok(GameOutcome::Draw),
            _ => Err(()),
        }
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
