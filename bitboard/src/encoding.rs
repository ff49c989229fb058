use shakmaty::{CastlingSide, Chess, Color, Position, Role, Square};
use std::fmt;

/// Number of piece features: 2 colors x 6 roles x 64 squares
pub const PIECE_FEATURES: usize = 2 * 6 * 64; // 768

/// Total number of features: pieces + side to move + 4 castling rights
pub const NUM_FEATURES: usize = PIECE_FEATURES + 5; // 773

/// Index of the side to move bit (set when White is to move)
pub const TURN_INDEX: usize = PIECE_FEATURES;

/// Index of the first castling bit.
/// Order: White kingside, White queenside, Black kingside, Black queenside
pub const CASTLING_INDEX: usize = PIECE_FEATURES + 1;

const WORDS: usize = NUM_FEATURES.div_ceil(64);

/// A position encoded as 773 booleans, packed into u64 words
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureVector {
    words: [u64; WORDS],
}

impl FeatureVector {
    pub fn empty() -> Self {
        FeatureVector { words: [0; WORDS] }
    }

    /// Builds a vector with the given indices set
    pub fn from_indices<I: IntoIterator<Item = usize>>(indices: I) -> Self {
        let mut vector = Self::empty();
        for index in indices {
            vector.set(index);
        }
        vector
    }

    pub fn get(&self, index: usize) -> bool {
        assert!(index < NUM_FEATURES, "feature index out of range: {}", index);
        self.words[index / 64] & (1 << (index % 64)) != 0
    }

    fn set(&mut self, index: usize) {
        assert!(index < NUM_FEATURES, "feature index out of range: {}", index);
        self.words[index / 64] |= 1 << (index % 64);
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Number of bits set among the piece features
    pub fn piece_count(&self) -> usize {
        self.active_indices()
            .take_while(|&index| index < PIECE_FEATURES)
            .count()
    }

    /// Indices of the set bits, ascending
    pub fn active_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            let mut rest = word;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some(i * 64 + bit)
            })
        })
    }

    /// One byte (0 or 1) per feature, as stored in the dataset arrays
    pub fn to_bytes(&self) -> [u8; NUM_FEATURES] {
        let mut bytes = [0u8; NUM_FEATURES];
        for index in self.active_indices() {
            bytes[index] = 1;
        }
        bytes
    }
}

impl fmt::Debug for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.active_indices()).finish()
    }
}

/// Feature index of a piece: White planes first, then Black.
/// Inside each color, one plane of 64 squares per role (pawn..king)
pub fn piece_index(color: Color, role: Role, square: Square) -> usize {
    let color = usize::from(color.is_white());
    (1 - color) * 6 * 64 + (role as usize - 1) * 64 + square as usize
}

/// Encodes a position into its 773 features
pub fn encode(position: &Chess) -> FeatureVector {
    let mut vector = FeatureVector::empty();

    // one bit per occupied square
    for (square, piece) in position.board().clone().into_iter() {
        let index = piece_index(piece.color, piece.role, square);
        assert!(
            index < PIECE_FEATURES,
            "invalid piece feature {} for {:?} on {}",
            index,
            piece,
            square
        );
        vector.set(index);
    }

    if position.turn() == Color::White {
        vector.set(TURN_INDEX);
    }

    let castles = position.castles();
    let rights = [
        (Color::White, CastlingSide::KingSide),
        (Color::White, CastlingSide::QueenSide),
        (Color::Black, CastlingSide::KingSide),
        (Color::Black, CastlingSide::QueenSide),
    ];
    for (offset, (color, side)) in rights.into_iter().enumerate() {
        if castles.has(color, side) {
            vector.set(CASTLING_INDEX + offset);
        }
    }

    vector
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{fen::Fen, CastlingMode};

    fn position(fen: &str) -> Chess {
        let fen: Fen = fen.parse().unwrap();
        fen.into_position(CastlingMode::Standard).unwrap()
    }

    #[test]
    fn test_start_position() {
        let features = encode(&Chess::default());

        assert_eq!(features.piece_count(), 32);
        assert_eq!(features.count_ones(), 32 + 5);

        // white pawns on the second rank
        for square in 8..16 {
            assert!(features.get(64 + square));
        }
        // white king on e1, black king on e8
        assert!(features.get(5 * 64 + Square::E1 as usize));
        assert!(features.get(6 * 64 + 5 * 64 + Square::E8 as usize));
        // black pawns on the seventh rank
        for square in 48..56 {
            assert!(features.get(6 * 64 + square));
        }

        assert!(features.get(TURN_INDEX));
        for offset in 0..4 {
            assert!(features.get(CASTLING_INDEX + offset));
        }
    }

    #[test]
    fn test_piece_index_layout() {
        assert_eq!(piece_index(Color::White, Role::Pawn, Square::A1), 0);
        assert_eq!(piece_index(Color::White, Role::King, Square::H8), 383);
        assert_eq!(piece_index(Color::Black, Role::Pawn, Square::A1), 384);
        assert_eq!(piece_index(Color::Black, Role::King, Square::H8), 767);
        assert_eq!(piece_index(Color::Black, Role::Knight, Square::G8), 384 + 64 + 62);
    }

    #[test]
    fn test_context_bits() {
        // black to move, only white queenside and black kingside rights
        let features = encode(&position("r3k2r/8/8/8/8/8/8/R3K2R b Qk - 0 1"));

        assert!(!features.get(TURN_INDEX));
        assert!(!features.get(CASTLING_INDEX));
        assert!(features.get(CASTLING_INDEX + 1));
        assert!(features.get(CASTLING_INDEX + 2));
        assert!(!features.get(CASTLING_INDEX + 3));
        assert_eq!(features.piece_count(), 6);
    }

    #[test]
    fn test_one_bit_per_occupied_square() {
        const FENS: [&str; 3] = [
            "4nrk1/3q1pp1/2n1p1p1/8/1P2Q3/7P/PB1N1PP1/2R3K1 w - - 5 26",
            "5r2/1p2ppkp/p2p1nP1/qn6/4P3/2r2B2/1PPQ1PP1/2KR3R w - - 0 21",
            "8/2k5/p1P5/5r2/2K5/8/P7/7R b - - 4 39",
        ];

        for fen in FENS {
            let pos = position(fen);
            let features = encode(&pos);

            assert_eq!(features.piece_count(), pos.board().occupied().count());
            assert!(features.piece_count() <= 32);

            // every occupied square appears in exactly one plane
            for square in Square::ALL {
                let planes = (0..12)
                    .filter(|plane| features.get(plane * 64 + square as usize))
                    .count();
                let expected = usize::from(pos.board().piece_at(square).is_some());
                assert_eq!(planes, expected, "square {} in {}", square, fen);
            }
        }
    }

    #[test]
    fn test_bytes_match_bits() {
        let features = encode(&Chess::default());
        let bytes = features.to_bytes();

        for index in 0..NUM_FEATURES {
            assert_eq!(bytes[index] == 1, features.get(index));
        }
        assert_eq!(
            FeatureVector::from_indices(features.active_indices()),
            features
        );
    }
}
