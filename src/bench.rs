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

#![cfg(test)]

use lazy_static::lazy_static;

use crate::{perft::perft, position::Position};

/// A position with a known perft result.
#[derive(Clone, Copy)]
struct TestPosition<'a> {
    /// The FEN of the position.
    position: &'a str,
    /// The depth to run perft to.
    perft_depth: u8,
    /// The expected number of leaf nodes.
    perft_result: u64,
}

lazy_static! {
    /// Test positions used to check the correctness of the move generator
    /// and the make-move legality filter.
    static ref TEST_POSITIONS: Vec<TestPosition<'static>> = vec![
        TestPosition::new("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 1, 20),
        TestPosition::new(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            4,
            197_281,
        ),
        TestPosition::new(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            5,
            4_865_609,
        ),
        // depth 6 reaches en passant, checks, discovered checks, double
        // checks and checkmates
        TestPosition::new(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            6,
            119_060_324,
        ),
        // kiwipete: castling in and through check, pins, promotions
        TestPosition::new(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            4,
            4_085_603,
        ),
        // en passant which would expose the capturer's own king
        TestPosition::new("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", 5, 674_624),
        TestPosition::new(
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            5,
            15_833_292,
        ),
    ];
}

impl<'a> TestPosition<'a> {
    /// Creates a new [`TestPosition`].
    const fn new(position: &'a str, perft_depth: u8, perft_result: u64) -> Self {
        Self {
            position,
            perft_depth,
            perft_result,
        }
    }

    /// Runs perft on the position and asserts on the node count.
    fn run_test(&self) {
        let board: Position = self.position.parse().expect("test FEN must parse");
        println!("Position: {}", self.position);
        assert_eq!(perft::<false>(&board, self.perft_depth), self.perft_result);
    }
}

#[test]
fn test_positions() {
    for position in TEST_POSITIONS.iter() {
        position.run_test();
    }
}
