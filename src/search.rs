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

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use arrayvec::ArrayVec;

use crate::{
    evaluation::Eval,
    movegen::{generate_moves, AllMoves, Move, Moves},
    position::Position,
    transposition_table::TranspositionTable,
    zobrist::Key,
};

/// The main alpha-beta search and its quiescence extension.
mod alpha_beta;
/// The iterative deepening and aspiration loops.
mod iterative_deepening;
/// Move ordering and the killer/history tables.
mod ordering;

/// A marker for a type of node to allow searches with generic node types.
#[allow(clippy::missing_docs_in_private_items)]
pub trait Node {
    const IS_PV: bool;
    const IS_ROOT: bool;
}

/// A node with a zero window: is expected not to be in the final PV.
pub struct NonPvNode;
/// A node that could be in the final PV.
pub struct PvNode;
/// The node from which the search starts.
pub struct RootNode;

impl Node for NonPvNode {
    const IS_PV: bool = false;
    const IS_ROOT: bool = false;
}

impl Node for PvNode {
    const IS_PV: bool = true;
    const IS_ROOT: bool = false;
}

impl Node for RootNode {
    const IS_PV: bool = true;
    const IS_ROOT: bool = true;
}

/// The maximum distance between the root and any searched node.
pub const MAX_PLY: usize = 64;
/// The saturation bound of the history table.
const MAX_HISTORY: Eval = 16_384;
/// How many repetition stack slots exist.
///
/// The stack mixes game history (one entry per played move) and search
/// history (one entry per ply), so it is sized for a very long game plus
/// [`MAX_PLY`].
pub const REP_STACK_SIZE: usize = 2048;

/// A principal variation: the engine's best line for both sides.
///
/// Every move is expressed in the root position's orientation; the composer
/// in the search flips each child line once per ply boundary.
pub type Pv = ArrayVec<Move, MAX_PLY>;

/// Per-search counters and limits.
pub struct SearchInfo {
    /// How many nodes have been searched.
    pub nodes: u64,
    /// The current iteration depth.
    pub depth: i32,
    /// The highest ply reached, quiescence included.
    pub seldepth: usize,
    /// When the search started.
    pub start: Instant,
    /// How much time the search is allowed to take.
    pub time_limit: Duration,
    /// If set, the time limit is ignored and only `stop` ends the search.
    pub infinite: bool,
}

/// The state that outlives a single search: the transposition table and the
/// repetition stack built up by the `position` command.
///
/// The driver moves this into the worker thread for the duration of a search
/// and receives it back when the worker is joined, so only one of the two
/// ever has access to it.
pub struct SearchTables {
    /// The transposition table.
    pub tt: TranspositionTable,
    /// Zobrist keys of earlier positions: game history below
    /// [`game_ply`](Self::game_ply), search history above it.
    pub rep_stack: Box<[Key; REP_STACK_SIZE]>,
    /// The number of game-history entries on the repetition stack.
    pub game_ply: usize,
}

/// Performs the searching.
///
/// Owns a copy of the position and the search tables for the duration of one
/// `go` command.
pub struct Worker {
    /// The root position.
    position: Position,
    /// Counters and limits for this search.
    info: SearchInfo,
    /// The maximum iteration depth.
    max_depth: i32,
    /// The cooperative cancellation flag, shared with the driver.
    stopped: Arc<AtomicBool>,
    /// The persistent search state.
    tables: SearchTables,
    /// Two killer moves per ply.
    killers: [[Move; 2]; MAX_PLY],
    /// Butterfly history of quiet moves, indexed by from and to square.
    history: [[Eval; 64]; 64],
    /// The static evaluation at each ply, for the improving heuristic.
    eval_stack: [Eval; MAX_PLY],
    /// The best line found by the last completed iteration.
    root_pv: Pv,
    /// The score of the last completed iteration.
    last_score: Eval,
}

impl SearchInfo {
    /// Creates a new [`SearchInfo`] starting now.
    pub fn new(time_limit: Duration, infinite: bool) -> Self {
        Self {
            nodes: 0,
            depth: 0,
            seldepth: 0,
            start: Instant::now(),
            time_limit,
            infinite,
        }
    }
}

impl SearchTables {
    /// Creates new search tables with a hash table of the given size in MiB.
    pub fn new(hash_mib: usize) -> Self {
        Self {
            tt: TranspositionTable::new(hash_mib),
            rep_stack: Box::new([0; REP_STACK_SIZE]),
            game_ply: 0,
        }
    }

    /// Clears everything for a new game.
    pub fn clear(&mut self) {
        self.tt.clear();
        self.rep_stack.fill(0);
        self.game_ply = 0;
    }
}

impl Worker {
    /// Creates a new [`Worker`] for one search.
    ///
    /// The killer and history tables start empty: they are per-search state.
    pub fn new(
        position: Position,
        info: SearchInfo,
        max_depth: i32,
        stopped: Arc<AtomicBool>,
        tables: SearchTables,
    ) -> Self {
        Self {
            position,
            info,
            max_depth,
            stopped,
            tables,
            killers: [[Move::NULL; 2]; MAX_PLY],
            history: [[0; 64]; 64],
            eval_stack: [0; MAX_PLY],
            root_pv: Pv::new(),
            last_score: 0,
        }
    }

    /// Gives the search tables back to the driver.
    pub fn into_tables(self) -> SearchTables {
        self.tables
    }

    /// Returns the number of searched nodes.
    pub const fn nodes(&self) -> u64 {
        self.info.nodes
    }

    /// Returns the score of the last completed iteration.
    pub const fn last_score(&self) -> Eval {
        self.last_score
    }

    /// Checks if the stop flag has been raised.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    /// Polls the stop condition.
    ///
    /// The clock is only consulted every 2048 nodes; once the limit has been
    /// passed, the stop flag is raised so that the whole tree unwinds.
    fn check_time(&mut self) -> bool {
        if self.is_stopped() {
            return true;
        }

        if !self.info.infinite
            && self.info.nodes & 2047 == 0
            && self.info.start.elapsed() >= self.info.time_limit
        {
            self.stopped.store(true, Ordering::Relaxed);
            return true;
        }

        false
    }

    /// Checks if `key` occurred before at any same-side entry of the
    /// repetition stack, reaching back through the search into the game
    /// history.
    ///
    /// A single prior occurrence counts as a draw.
    fn is_repetition(&self, key: Key, ply: usize) -> bool {
        let mut index = (self.tables.game_ply + ply).checked_sub(2);
        while let Some(i) = index {
            if self.tables.rep_stack[i] == key {
                return true;
            }
            index = i.checked_sub(2);
        }
        false
    }

    /// Finds any legal move of the root position, as a fallback for searches
    /// that are stopped before the first iteration completes.
    fn first_legal_move(&self) -> Move {
        let mut moves = Moves::new();
        generate_moves::<AllMoves>(&self.position, &mut moves);

        for &mv in moves.iter() {
            let mut copy = self.position;
            if copy.make_move(mv) {
                return mv;
            }
        }
        Move::NULL
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
        thread,
        time::{Duration, Instant},
    };

    use super::{SearchInfo, SearchTables, Worker, MAX_PLY};
    use crate::{
        evaluation::{DRAW, MATE, MATE_BOUND},
        movegen::Move,
        position::Position,
        zobrist,
    };

    /// Builds a worker with no time limit.
    fn worker_for(position: Position, max_depth: i32) -> Worker {
        Worker::new(
            position,
            SearchInfo::new(Duration::MAX, true),
            max_depth,
            Arc::new(AtomicBool::new(false)),
            SearchTables::new(4),
        )
    }

    #[test]
    fn rook_endgame_keeps_a_non_negative_score() {
        let position: Position = "6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1"
            .parse()
            .expect("test FEN must parse");
        let mut worker = worker_for(position, 6);
        let best = worker.start_search();

        assert!(!best.is_null());
        // the engine is up a whole rook, so it must pick a rook move and
        // score the position favourably
        assert_eq!(best.start(), crate::defs::Square::A1);
        assert!(worker.last_score() >= 0);
    }

    #[test]
    fn a_mated_side_reports_the_mate() {
        // scholar's mate has been delivered; Black has no legal moves
        let position: Position =
            "r1bqkbnr/pppp1Qpp/2n5/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 1"
                .parse()
                .expect("test FEN must parse");
        let mut worker = worker_for(position, 3);
        let best = worker.start_search();

        assert!(best.is_null());
        assert_eq!(worker.last_score(), -MATE);
    }

    #[test]
    fn mate_in_one_is_found() {
        let position: Position = "6k1/8/6K1/8/8/8/8/R7 w - - 0 1"
            .parse()
            .expect("test FEN must parse");
        let mut worker = worker_for(position, 4);
        let best = worker.start_search();

        // Ra1-a8 mate
        assert_eq!(best, Move::new(crate::defs::Square::A1, crate::defs::Square::A8));
        assert_eq!(worker.last_score(), MATE - 1);
    }

    #[test]
    fn mate_in_two_is_found_and_announced() {
        let position: Position =
            "r2qkb1r/pp2nppp/3p4/2pNN1B1/2BnP3/3P4/PPP2PPP/R2bK2R w KQkq - 1 1"
                .parse()
                .expect("test FEN must parse");
        let mut worker = worker_for(position, 6);
        let best = worker.start_search();

        // Nd5-f6+ leads to mate on the third ply
        assert_eq!(best, Move::new(crate::defs::Square(35), crate::defs::Square(45)));
        assert_eq!(worker.last_score(), MATE - 3);
    }

    #[test]
    fn a_prior_occurrence_on_the_stack_is_a_draw() {
        let position: Position = "4k3/8/8/8/8/8/8/4K2R w - - 0 1"
            .parse()
            .expect("test FEN must parse");
        let mut worker = worker_for(position, 4);

        // pretend this exact position already occurred two plies ago
        worker.tables.rep_stack[0] = zobrist::hash(&position);
        worker.tables.game_ply = 2;

        let mut pv = super::Pv::new();
        let score = worker.alpha_beta::<super::PvNode>(
            &position,
            4,
            -MATE,
            MATE,
            0,
            &mut pv,
        );
        assert_eq!(score, DRAW);
    }

    #[test]
    fn stop_flag_cancels_an_infinite_search() {
        let position = Position::default();
        let stopped = Arc::new(AtomicBool::new(false));
        let mut worker = Worker::new(
            position,
            SearchInfo::new(Duration::MAX, true),
            MAX_PLY as i32,
            Arc::clone(&stopped),
            SearchTables::new(4),
        );

        let flag = Arc::clone(&stopped);
        let setter = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            flag.store(true, Ordering::Relaxed);
        });

        let start = Instant::now();
        let best = worker.start_search();
        setter.join().expect("the setter thread must not panic");

        assert!(start.elapsed() < Duration::from_millis(2000));
        // the move must be legal in the root position
        let mut copy = position;
        assert!(copy.make_move(best));
    }

    #[test]
    fn movetime_is_respected() {
        let position = Position::default();
        let mut worker = Worker::new(
            position,
            SearchInfo::new(Duration::from_millis(150), false),
            MAX_PLY as i32,
            Arc::new(AtomicBool::new(false)),
            SearchTables::new(4),
        );

        let start = Instant::now();
        let best = worker.start_search();
        assert!(start.elapsed() < Duration::from_millis(2000));
        assert!(!best.is_null());
        assert!(worker.last_score() > -MATE_BOUND);
    }
}
