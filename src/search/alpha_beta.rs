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

use super::{
    ordering::{base_reduction, pick_move},
    Node, NonPvNode, Pv, PvNode, Worker, MAX_PLY,
};
use crate::{
    defs::PieceType,
    evaluation::{evaluate, Eval, DRAW, INF_EVAL, MATE, MATE_BOUND},
    movegen::{generate_moves, AllMoves, CapturesOnly, Move, Moves},
    position::Position,
    transposition_table::Bound,
    zobrist,
};

impl Worker {
    /// Performs a fail-hard negamax search on `position` to the given depth.
    ///
    /// In PV nodes `pv` receives the best line, with every move expressed in
    /// `position`'s own orientation.
    #[allow(clippy::cognitive_complexity, clippy::too_many_lines)]
    pub(crate) fn alpha_beta<N: Node>(
        &mut self,
        position: &Position,
        mut depth: i32,
        mut alpha: Eval,
        mut beta: Eval,
        ply: usize,
        pv: &mut Pv,
    ) -> Eval {
        if depth <= 0 {
            return self.quiescence(position, alpha, beta, ply);
        }

        if self.check_time() {
            return 0;
        }

        self.info.nodes += 1;
        self.info.seldepth = self.info.seldepth.max(ply);

        if ply >= MAX_PLY - 1 {
            return evaluate(position);
        }

        let key = zobrist::hash(position);
        self.tables.rep_stack[self.tables.game_ply + ply] = key;

        // a single prior occurrence of this position is scored as a draw
        if !N::IS_ROOT && self.is_repetition(key, ply) {
            return DRAW;
        }

        let in_check = position.is_in_check();
        if in_check {
            depth += 1;
        }

        // Mate distance pruning: even a mate here cannot improve on a
        // shorter mate the search has already found. Whichever bound
        // tightens far enough to empty the window is the value returned.
        let mate_value = MATE - ply as Eval;
        if mate_value < beta {
            beta = mate_value;
            if alpha >= mate_value {
                return mate_value;
            }
        }
        let mated_value = -MATE + ply as Eval;
        if mated_value > alpha {
            alpha = mated_value;
            if beta <= mated_value {
                return mated_value;
            }
        }

        let mut tt_move = Move::NULL;
        if let Some(entry) = self.tables.tt.probe(key, ply) {
            tt_move = entry.mv;

            if !N::IS_ROOT && i32::from(entry.depth) >= depth {
                match entry.bound {
                    Bound::Exact => return entry.score,
                    Bound::Upper if entry.score <= alpha => return alpha,
                    Bound::Lower if entry.score >= beta => return beta,
                    _ => (),
                }
            }
        }

        let static_eval = if in_check {
            -INF_EVAL
        } else {
            evaluate(position)
        };
        self.eval_stack[ply] = static_eval;
        let improving = !in_check && ply >= 2 && static_eval > self.eval_stack[ply - 2];

        // Reverse futility pruning: if the static evaluation beats beta by a
        // depth-scaled margin, a full search is very unlikely to fall under
        // it.
        if !N::IS_PV
            && !in_check
            && depth < 8
            && static_eval < MATE_BOUND
            && static_eval >= beta + 70 * depth - 70 * Eval::from(improving)
        {
            return (static_eval + beta) / 2;
        }

        // Null move pruning: hand the opponent a free move and search
        // shallower. Failing high even then means this node is almost
        // certainly above beta. Gated on having a non-pawn piece, since
        // zugzwang breaks the assumption.
        if !N::IS_PV
            && !in_check
            && depth >= 3
            && static_eval >= beta + 20
            && beta > -MATE_BOUND
            && position.has_non_pawn_pieces()
        {
            let reduction = ((static_eval - beta + 30 * depth + 480) / 105).max(1);

            let mut copy = *position;
            copy.make_null_move();

            let mut null_pv = Pv::new();
            let score = -self.alpha_beta::<NonPvNode>(
                &copy,
                depth - reduction,
                -beta,
                -beta + 1,
                ply + 1,
                &mut null_pv,
            );

            if score >= beta {
                // don't trust mates found without a verification search
                return if score > MATE_BOUND { beta } else { score };
            }
        }

        let mut moves = Moves::new();
        generate_moves::<AllMoves>(position, &mut moves);
        let mut scores = self.score_moves(position, &moves, tt_move, ply);

        let mut best_score = -INF_EVAL;
        let mut best_move = Move::NULL;
        let mut raised_alpha = false;
        let mut total_moves = 0;
        let mut tried_quiets = Moves::new();

        for current in 0..moves.len() {
            pick_move(&mut moves, &mut scores, current);
            let mv = moves[current];

            let is_quiet = position.piece_on(mv.end()) == PieceType::NONE && !mv.is_promotion();
            let is_killer = self.is_killer(mv, ply);

            let mut copy = *position;
            if !copy.make_move(mv) {
                continue;
            }
            total_moves += 1;

            let new_depth = depth - 1;
            let mut child_pv = Pv::new();

            // Principal variation search with late move reductions: the
            // first move gets the full window; later moves are presumed
            // worse and get a reduced null-window search, with re-searches
            // whenever one surprises us.
            let mut score;
            if total_moves == 1 {
                score = if N::IS_PV {
                    -self.alpha_beta::<PvNode>(&copy, new_depth, -beta, -alpha, ply + 1, &mut child_pv)
                } else {
                    -self.alpha_beta::<NonPvNode>(
                        &copy,
                        new_depth,
                        -beta,
                        -alpha,
                        ply + 1,
                        &mut child_pv,
                    )
                };
            } else {
                let mut reduction = 0;
                if is_quiet && depth >= 3 && !in_check {
                    reduction = base_reduction(depth, total_moves);
                    reduction -= i32::from(N::IS_PV);
                    reduction -= i32::from(improving);
                    reduction -= i32::from(is_killer);
                    reduction -= self.history_of(mv) / 4096;
                    reduction = reduction.clamp(0, (new_depth - 1).max(0));
                }

                score = -self.alpha_beta::<NonPvNode>(
                    &copy,
                    new_depth - reduction,
                    -alpha - 1,
                    -alpha,
                    ply + 1,
                    &mut child_pv,
                );

                // the reduced search was too optimistic; verify at full depth
                if reduction > 0 && score > alpha {
                    score = -self.alpha_beta::<NonPvNode>(
                        &copy,
                        new_depth,
                        -alpha - 1,
                        -alpha,
                        ply + 1,
                        &mut child_pv,
                    );
                }

                // the null window failed high but the real window is wider
                if score > alpha && score < beta {
                    score = -self.alpha_beta::<PvNode>(
                        &copy,
                        new_depth,
                        -beta,
                        -alpha,
                        ply + 1,
                        &mut child_pv,
                    );
                }
            }

            if self.is_stopped() {
                return 0;
            }

            best_score = best_score.max(score);

            if score > alpha {
                best_move = mv;
                raised_alpha = true;
                alpha = score;

                if N::IS_PV {
                    pv.clear();
                    let _ = pv.try_push(mv);
                    // the child's line is mirrored, because from its
                    // perspective the board is flipped
                    for &child_move in &child_pv {
                        let _ = pv.try_push(child_move.flip());
                    }
                }

                if score >= beta {
                    if is_quiet {
                        self.insert_into_killers(ply, mv);
                        self.update_history(depth, mv, &tried_quiets);
                    }
                    self.tables
                        .tt
                        .store(key, depth, best_score, Bound::Lower, mv, ply);
                    return beta;
                }
            }

            if is_quiet {
                let _ = tried_quiets.try_push(mv);
            }
        }

        if total_moves == 0 {
            return if in_check {
                // checkmate: prefer the shortest mate
                -MATE + ply as Eval
            } else {
                DRAW
            };
        }

        let bound = if raised_alpha {
            Bound::Exact
        } else {
            Bound::Upper
        };
        self.tables
            .tt
            .store(key, depth, best_score, bound, best_move, ply);

        alpha
    }

    /// Resolves tactical sequences at the leaves: searches captures (and
    /// promotion pushes) only, with the static evaluation as a stand-pat
    /// lower bound.
    fn quiescence(&mut self, position: &Position, mut alpha: Eval, beta: Eval, ply: usize) -> Eval {
        if self.check_time() {
            return 0;
        }

        self.info.nodes += 1;
        self.info.seldepth = self.info.seldepth.max(ply);

        let stand_pat = evaluate(position);
        if stand_pat >= beta {
            return beta;
        }
        alpha = alpha.max(stand_pat);

        if ply >= MAX_PLY - 1 {
            return alpha;
        }

        let mut moves = Moves::new();
        generate_moves::<CapturesOnly>(position, &mut moves);
        let mut scores = self.score_moves(position, &moves, Move::NULL, ply);

        for current in 0..moves.len() {
            pick_move(&mut moves, &mut scores, current);
            let mv = moves[current];

            let mut copy = *position;
            if !copy.make_move(mv) {
                continue;
            }

            let score = -self.quiescence(&copy, -beta, -alpha, ply + 1);

            if self.is_stopped() {
                return 0;
            }

            if score >= beta {
                return beta;
            }
            alpha = alpha.max(score);
        }

        alpha
    }
}
