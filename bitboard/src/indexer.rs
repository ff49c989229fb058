use crate::game::Game;

/// Relative indices (inside a ply window) of moves that are not captures.
/// Always sorted ascending, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibleIndexSet {
    indices: Vec<usize>,
}

impl EligibleIndexSet {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }
}

impl FromIterator<usize> for EligibleIndexSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut indices: Vec<usize> = iter.into_iter().collect();
        indices.sort_unstable();
        indices.dedup();
        EligibleIndexSet { indices }
    }
}

/// Finds the moves in `[start_ply, end_ply)` that are not captures.
///
/// The board is advanced on every move, captures included, so each move is
/// judged against the true position it was played from.
pub fn find_eligible(game: &Game, start_ply: usize, end_ply: usize) -> EligibleIndexSet {
    let mut replay = game.replay();
    if replay.advance_by(start_ply) < start_ply {
        // game ends inside the opening
        return EligibleIndexSet::default();
    }

    let window = end_ply.saturating_sub(start_ply);
    let mut indices = Vec::with_capacity(window);

    for index in 0..window {
        let Some(mov) = replay.advance() else {
            break;
        };
        if !mov.is_capture() {
            indices.push(index);
        }
    }

    EligibleIndexSet { indices }
}
