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

use super::{Pv, RootNode, Worker};
use crate::{
    evaluation::{is_mate, moves_to_mate, Eval, INF_EVAL, MATE_BOUND},
    movegen::Move,
};

/// The initial half-width of the aspiration window.
const ASPIRATION_WINDOW: Eval = 18;
/// The widest the aspiration margin grows before the window snaps to
/// infinite.
const ASPIRATION_LIMIT: Eval = 2000;
/// The iteration depth from which aspiration windows are used.
const MIN_ASPIRATION_DEPTH: i32 = 4;

impl Worker {
    /// Runs the iterative deepening loop and returns the best move of the
    /// last completed iteration.
    ///
    /// Returns the null move only if the root position has no legal moves.
    pub fn start_search(&mut self) -> Move {
        // a stop during the first iteration must still produce a legal move
        let mut best_move = self.first_legal_move();

        for depth in 1..=self.max_depth {
            self.info.depth = depth;
            let score = self.aspiration_loop(depth);

            let stopped = self.is_stopped();
            if stopped && depth > 1 {
                break;
            }

            if let Some(&first) = self.root_pv.first() {
                best_move = first;
            }
            if stopped {
                break;
            }

            self.last_score = score;
            self.print_report(score);

            // no point searching on once a forced mate is scored
            if score.abs() > MATE_BOUND {
                break;
            }
        }

        best_move
    }

    /// Searches the root to `depth`, re-searching with a widened window
    /// whenever the score lands outside the current one.
    ///
    /// Shallow iterations use a full window; from
    /// [`MIN_ASPIRATION_DEPTH`] onwards the window opens at
    /// [`ASPIRATION_WINDOW`] around the previous iteration's score and its
    /// margin doubles on every failure, snapping to infinite beyond
    /// [`ASPIRATION_LIMIT`].
    fn aspiration_loop(&mut self, depth: i32) -> Eval {
        let mut delta = ASPIRATION_WINDOW;
        let (mut alpha, mut beta) = if depth >= MIN_ASPIRATION_DEPTH {
            (self.last_score - delta, self.last_score + delta)
        } else {
            (-INF_EVAL, INF_EVAL)
        };

        let root = self.position;
        loop {
            let mut pv = Pv::new();
            let score = self.alpha_beta::<RootNode>(&root, depth, alpha, beta, 0, &mut pv);

            if !pv.is_empty() {
                self.root_pv = pv;
            }

            if self.is_stopped() {
                return score;
            }

            if score <= alpha {
                alpha = (score - delta).max(-INF_EVAL);
            } else if score >= beta {
                beta = (score + delta).min(INF_EVAL);
            } else {
                return score;
            }

            delta *= 2;
            if delta > ASPIRATION_LIMIT {
                alpha = -INF_EVAL;
                beta = INF_EVAL;
            }
        }
    }

    /// Prints the telemetry line of a completed iteration.
    fn print_report(&self, score: Eval) {
        let time = self.info.start.elapsed();
        let nps = 1_000_000 * self.info.nodes / (time.as_micros().max(1) as u64);

        let score_str = if is_mate(score) {
            format!("mate {}", moves_to_mate(score))
        } else {
            format!("cp {score}")
        };

        let flipped = self.position.is_flipped();
        let pv = self
            .root_pv
            .iter()
            .map(|mv| mv.render(flipped))
            .collect::<Vec<_>>()
            .join(" ");

        println!(
            "info depth {} seldepth {} score {score_str} nodes {} time {} nps {nps} hashfull {} pv {pv}",
            self.info.depth,
            self.info.seldepth,
            self.info.nodes,
            time.as_millis(),
            self.tables.tt.hashfull(),
        );
    }
}
