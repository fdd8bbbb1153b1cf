/*
 * Skink, a UCI-compatible chess engine
 * Copyright (C) 2025 Casey Holland
 *
 * Skink is free software: you can redistribute it and/or modify it under the
 * terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or (at your option) any later
 * version.
 *
 * Skink is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
 * FOR A PARTICULAR PURPOSE. See the GNU General Public License for more
 * details.
 *
 * You should have received a copy of the GNU General Public License along with
 * Skink. If not, see <https://www.gnu.org/licenses/>.
 */

use lazy_static::lazy_static;
use oorandom::Rand64;

use crate::{
    defs::{File, PieceType, Side, Square},
    position::Position,
};

/// The type of a zobrist key.
pub type Key = u64;

/// A container for the zobrist keys.
struct ZobristKeys {
    /// One key per side, piece type and square.
    pieces: [[[Key; Square::TOTAL]; PieceType::TOTAL]; Side::TOTAL],
    /// One key per castling rights combination.
    castling: [Key; 16],
    /// One key per en passant file.
    ep: [Key; File::TOTAL],
}

lazy_static! {
    /// The program's zobrist keys, generated once from a fixed seed.
    static ref ZOBRIST_KEYS: ZobristKeys = ZobristKeys::new();
}

impl ZobristKeys {
    /// Generates the zobrist keys from a deterministically seeded PRNG.
    fn new() -> Self {
        let mut rng = Rand64::new(0x1234_5678_90ab_cdef);
        let mut pieces = [[[0; Square::TOTAL]; PieceType::TOTAL]; Side::TOTAL];
        let mut castling = [0; 16];
        let mut ep = [0; File::TOTAL];

        for side in &mut pieces {
            for piece_type in side.iter_mut() {
                for square in piece_type.iter_mut() {
                    *square = rng.rand_u64();
                }
            }
        }
        for key in &mut castling {
            *key = rng.rand_u64();
        }
        for key in &mut ep {
            *key = rng.rand_u64();
        }

        Self {
            pieces,
            castling,
            ep,
        }
    }
}

/// Hashes the position.
///
/// There is no side-to-move key: the position is always normalized so that
/// "us" is the mover, which makes equivalent positions hash equal no matter
/// whose turn it really is.
pub fn hash(position: &Position) -> Key {
    let mut hash = 0;

    for side in 0..Side::TOTAL as u8 {
        let side = Side(side);
        for piece_type in 0..PieceType::TOTAL as u8 {
            let piece_type = PieceType(piece_type);
            for square in position.side(side) & position.piece(piece_type) {
                hash ^= ZOBRIST_KEYS.pieces[side.to_index()][piece_type.to_index()]
                    [square.to_index()];
            }
        }
    }

    hash ^= ZOBRIST_KEYS.castling[position.castling_rights().to_index()];

    if !position.ep().is_empty() {
        let ep_file = File::from(Square::from(position.ep()));
        hash ^= ZOBRIST_KEYS.ep[ep_file.0 as usize];
    }

    hash
}

#[cfg(test)]
mod tests {
    use super::hash;
    use crate::{
        movegen::Move,
        defs::Square,
        position::{Position, STARTPOS},
    };

    #[test]
    fn hashing_is_a_function_of_the_semantic_state() {
        let a: Position = STARTPOS.parse().expect("startpos FEN must parse");
        let b = Position::default();
        assert_eq!(hash(&a), hash(&b));
    }

    #[test]
    fn equivalent_positions_reached_differently_hash_equal() {
        // 1. Nf3 Nf6 2. Ng1 Ng8 returns to the starting position
        let mut board = Position::default();
        for (start, end) in [(6, 21), (6, 21), (21, 6), (21, 6)] {
            assert!(board.make_move(Move::new(Square(start), Square(end))));
        }
        assert_eq!(hash(&board), hash(&Position::default()));
    }

    #[test]
    fn colour_mirrored_positions_hash_equal() {
        // the same position from White's and Black's point of view
        let white: Position = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"
            .parse()
            .expect("test FEN must parse");
        let black: Position = "4k3/4p3/8/8/8/8/8/4K3 b - - 0 1"
            .parse()
            .expect("test FEN must parse");
        assert_eq!(hash(&white), hash(&black));
    }

    #[test]
    fn the_ep_file_changes_the_hash() {
        let without: Position = "4k3/8/8/3pP3/8/8/8/4K3 w - - 0 1"
            .parse()
            .expect("test FEN must parse");
        let with: Position = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1"
            .parse()
            .expect("test FEN must parse");
        assert_ne!(hash(&without), hash(&with));
    }

    #[test]
    fn castling_rights_change_the_hash() {
        let all: Position = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1"
            .parse()
            .expect("test FEN must parse");
        let none: Position = "r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1"
            .parse()
            .expect("test FEN must parse");
        assert_ne!(hash(&all), hash(&none));
    }
}
