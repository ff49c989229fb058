use crate::outcome::GameOutcome;
use shakmaty::{Chess, Move, Position};
use std::slice;

/// A finished game: a start position, the moves played from it and the result.
///
/// Every move is legal in the position it is played from, which the PGN
/// visitor checks while building it. Replays can then apply moves without validation.
#[derive(Debug, Clone)]
pub struct Game {
    initial: Chess,
    moves: Vec<Move>,
    outcome: GameOutcome,
}

impl Game {
    /// Builds a game whose moves are already known to be legal
    pub(crate) fn from_legal(initial: Chess, moves: Vec<Move>, outcome: GameOutcome) -> Game {
        Game {
            initial,
            moves,
            outcome,
        }
    }

    pub fn initial(&self) -> &Chess {
        &self.initial
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn outcome(&self) -> GameOutcome {
        self.outcome
    }

    pub fn ply_count(&self) -> usize {
        self.moves.len()
    }

    /// Starts a replay from the initial position
    pub fn replay(&self) -> Replay<'_> {
        Replay {
            position: self.initial.clone(),
            moves: self.moves.iter(),
            ply: 0,
        }
    }

    /// Position after all moves have been played
    pub fn final_position(&self) -> Chess {
        let mut replay = self.replay();
        replay.advance_by(self.ply_count());
        replay.into_position()
    }
}

/// Walks a game move by move, keeping the board in sync
pub struct Replay<'a> {
    position: Chess,
    moves: slice::Iter<'a, Move>,
    ply: usize,
}

impl<'a> Replay<'a> {
    /// Current position
    pub fn position(&self) -> &Chess {
        &self.position
    }

    /// Number of moves played so far
    pub fn ply(&self) -> usize {
        self.ply
    }

    /// Plays the next move, returning it
    pub fn advance(&mut self) -> Option<&'a Move> {
        let mov = self.moves.next()?;
        // legality was checked when the game was built
        self.position.play_unchecked(mov);
        self.ply += 1;
        Some(mov)
    }

    /// Plays up to `n` moves, returns how many were played
    pub fn advance_by(&mut self, n: usize) -> usize {
        let mut played = 0;
        while played < n && self.advance().is_some() {
            played += 1;
        }
        played
    }

    pub fn into_position(self) -> Chess {
        self.position
    }
}

#[cfg(test)]
impl Game {
    /// Plays `moves` from the standard start position, failing on the first illegal one
    pub(crate) fn from_start(
        moves: Vec<Move>,
        outcome: GameOutcome,
    ) -> Result<Game, Box<shakmaty::PlayError<Chess>>> {
        let initial = Chess::default();
        let mut position = initial.clone();
        for mov in &moves {
            position = position.play(mov).map_err(Box::new)?;
        }
        Ok(Game::from_legal(initial, moves, outcome))
    }
}
