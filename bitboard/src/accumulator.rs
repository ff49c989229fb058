use crate::encoding::FeatureVector;
use crate::outcome::GameOutcome;

/// Encoded positions split by the result of the game they come from
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Dataset {
    /// Positions from games White won
    pub win: Vec<FeatureVector>,
    /// Positions from games Black won
    pub loss: Vec<FeatureVector>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.win.len() + self.loss.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collects encoded positions across a whole corpus
#[derive(Debug, Default)]
pub struct DatasetAccumulator {
    dataset: Dataset,
    games: usize,
}

impl DatasetAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the positions of one game. Draws add nothing.
    pub fn record(&mut self, outcome: GameOutcome, vectors: Vec<FeatureVector>) {
        let target = match outcome {
            GameOutcome::WhiteWin => &mut self.dataset.win,
            GameOutcome::BlackWin => &mut self.dataset.loss,
            GameOutcome::Draw => return,
        };
        target.extend(vectors);
        self.games += 1;
    }

    pub fn win_len(&self) -> usize {
        self.dataset.win.len()
    }

    pub fn loss_len(&self) -> usize {
        self.dataset.loss.len()
    }

    /// Games that contributed through [`record`](Self::record)
    pub fn games_recorded(&self) -> usize {
        self.games
    }

    /// Hands the collections over for persistence
    pub fn finalize(self) -> Dataset {
        self.dataset
    }
}
