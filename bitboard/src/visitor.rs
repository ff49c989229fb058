use crate::error::MalformedGame;
use crate::game::Game;
use crate::outcome::GameOutcome;
use pgn_reader::{RawHeader, SanPlus, Skip, Visitor};
use shakmaty::{fen::Fen, CastlingMode, Chess, Move, Position};

/// Turns the PGN of a game into a [`Game`], following the main line only
pub struct GameVisitor {
    // information about the current game
    outcome: Option<GameOutcome>,
    ply_count: Option<String>,
    fen: Option<String>,

    initial: Chess,
    position: Chess,
    moves: Vec<Move>,

    /// First problem found in the current game
    error: Option<MalformedGame>,
}

impl GameVisitor {
    pub fn new() -> Self {
        GameVisitor {
            outcome: None,
            ply_count: None,
            fen: None,

            initial: Chess::default(),
            position: Chess::default(),
            moves: Vec::with_capacity(256),

            error: None,
        }
    }

    fn check_ply_count(&self) -> Result<(), MalformedGame> {
        let Some(ref declared) = self.ply_count else {
            // header is optional, the move list is authoritative
            return Ok(());
        };
        let declared: usize = declared
            .trim()
            .parse()
            .map_err(|_| MalformedGame::InvalidPlyCount(declared.clone()))?;

        if declared != self.moves.len() {
            return Err(MalformedGame::PlyCountMismatch {
                declared,
                actual: self.moves.len(),
            });
        }
        Ok(())
    }
}

impl Default for GameVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Visitor for GameVisitor {
    type Result = Result<Game, MalformedGame>;

    fn begin_game(&mut self) {
        self.outcome = None;
        self.ply_count = None;
        self.fen = None;
        self.moves.clear();
        self.error = None;
    }

    fn header(&mut self, key: &[u8], value: RawHeader<'_>) {
        let value = String::from_utf8_lossy(value.as_bytes());

        match key {
            b"Result" => self.outcome = value.parse().ok(),
            b"PlyCount" => self.ply_count = Some(value.to_string()),
            b"FEN" => self.fen = Some(value.to_string()),
            _ => {}
        }
    }

    fn end_headers(&mut self) -> Skip {
        if self.outcome.is_none() {
            self.error = Some(MalformedGame::MissingResult);
            return Skip(true);
        }

        self.initial = match self.fen {
            Some(ref fen) => {
                let position = Fen::from_ascii(fen.as_bytes())
                    .ok()
                    .and_then(|fen| fen.into_position(CastlingMode::Standard).ok());
                match position {
                    Some(position) => position,
                    None => {
                        self.error = Some(MalformedGame::InvalidFen(fen.clone()));
                        return Skip(true);
                    }
                }
            }
            None => Chess::default(),
        };
        self.position = self.initial.clone();

        Skip(false)
    }

    fn begin_variation(&mut self) -> Skip {
        Skip(true) // main line only
    }

    fn san(&mut self, san_plus: SanPlus) {
        if self.error.is_some() {
            return;
        }

        match san_plus.san.to_move(&self.position) {
            Ok(mov) => {
                self.position.play_unchecked(&mov);
                self.moves.push(mov);
            }
            Err(_) => {
                self.error = Some(MalformedGame::IllegalMove {
                    ply: self.moves.len(),
                    san: san_plus.to_string(),
                });
            }
        }
    }

    fn end_game(&mut self) -> Self::Result {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.check_ply_count()?;

        let outcome = self.outcome.ok_or(MalformedGame::MissingResult)?;
        let moves = std::mem::take(&mut self.moves);

        // moves were checked one by one against the running position
        Ok(Game::from_legal(self.initial.clone(), moves, outcome))
    }
}
