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
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::{
    movegen::{generate_moves, AllMoves, Moves},
    position::Position,
    search::{SearchInfo, SearchTables, Worker, MAX_PLY, REP_STACK_SIZE},
    uci::UciOptions,
    zobrist,
};

/// Master object that glues the UCI protocol to the search.
///
/// It owns the authoritative position and, whenever no worker is running,
/// the search tables. During a search the tables are moved into the worker
/// thread and travel back through its join handle, so driver and worker can
/// never touch them at the same time.
pub struct Engine {
    /// The authoritative position, mutated by `position` commands.
    position: Position,
    /// The current set options.
    options: UciOptions,
    /// The cooperative cancellation flag shared with the worker.
    stopped: Arc<AtomicBool>,
    /// The search tables, present exactly when no worker is running.
    tables: Option<SearchTables>,
    /// The running worker, if any.
    worker: Option<JoinHandle<SearchTables>>,
}

impl Engine {
    /// Creates a new [`Engine`] with the starting position.
    pub fn new() -> Self {
        let options = UciOptions::new();
        let tables = SearchTables::new(options.hash());
        Self {
            position: Position::default(),
            options,
            stopped: Arc::new(AtomicBool::new(false)),
            tables: Some(tables),
            worker: None,
        }
    }

    /// Returns a reference to the current position.
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// Interprets and executes the `go` command: computes the limits and
    /// hands a copy of the position to a fresh worker thread.
    ///
    /// The worker prints the `bestmove` line itself when it finishes or is
    /// stopped.
    pub fn go<'a, T>(&mut self, mut tokens: T)
    where
        T: Iterator<Item = &'a str>,
    {
        self.halt();

        let mut max_depth = MAX_PLY as i32;
        let mut movetime: i64 = 0;
        let (mut wtime, mut btime): (i64, i64) = (0, 0);
        let (mut winc, mut binc): (i64, i64) = (0, 0);
        let mut infinite = true;

        while let Some(token) = tokens.next() {
            match token {
                "depth" => {
                    if let Some(depth) = parse_option(tokens.next()) {
                        max_depth = depth;
                    }
                }
                "movetime" => movetime = parse_option(tokens.next()).unwrap_or(0),
                "wtime" => wtime = parse_option(tokens.next()).unwrap_or(0),
                "btime" => btime = parse_option(tokens.next()).unwrap_or(0),
                "winc" => winc = parse_option(tokens.next()).unwrap_or(0),
                "binc" => binc = parse_option(tokens.next()).unwrap_or(0),
                "infinite" => infinite = true,
                _ => (),
            }
        }

        let mut time_limit = Duration::MAX;
        if movetime > 0 {
            time_limit = Duration::from_millis(movetime as u64);
            infinite = false;
        } else if wtime > 0 || btime > 0 {
            let our_time = if self.position.is_flipped() { btime } else { wtime };
            let our_inc = if self.position.is_flipped() { binc } else { winc };

            let mut limit = our_time / 30 + our_inc / 2;
            limit = limit.max(100);
            limit = limit.min(our_time - 50);
            time_limit = Duration::from_millis(limit.max(1) as u64);
            infinite = false;
        }

        let max_depth = max_depth.clamp(1, MAX_PLY as i32);
        let info = SearchInfo::new(time_limit, infinite);

        self.stopped.store(false, Ordering::Relaxed);
        let stopped = Arc::clone(&self.stopped);
        let tables = self
            .tables
            .take()
            .expect("the tables are always returned before a new go");
        let position = self.position;
        let flipped = position.is_flipped();

        self.worker = Some(thread::spawn(move || {
            let mut worker = Worker::new(position, info, max_depth, stopped, tables);
            let best_move = worker.start_search();
            println!("bestmove {}", best_move.render(flipped));
            worker.into_tables()
        }));
    }

    /// Sets the position from a `position` command, rebuilding the
    /// repetition stack with one pre-move hash per applied move.
    ///
    /// Move tokens that match no legal move are skipped without effect.
    pub fn set_position<'a, T>(&mut self, mut tokens: T)
    where
        T: Iterator<Item = &'a str>,
    {
        self.halt();

        let mut board = Position::new();
        let mut next = tokens.next();

        match next {
            Some("startpos") => {
                board.set_startpos();
                next = tokens.next();
            }
            Some("fen") => {
                let mut fen = String::with_capacity(128);
                loop {
                    next = tokens.next();
                    match next {
                        Some(token) if token != "moves" => {
                            fen.push_str(token);
                            fen.push(' ');
                        }
                        _ => break,
                    }
                }
                let Ok(parsed) = fen.parse() else { return };
                board = parsed;
            }
            _ => return,
        }

        let tables = self
            .tables
            .as_mut()
            .expect("the tables are always present when idle");
        tables.game_ply = 0;

        if next == Some("moves") {
            for token in tokens {
                let pre_move_hash = zobrist::hash(&board);
                if !apply_move_token(&mut board, token) {
                    continue;
                }
                if tables.game_ply < REP_STACK_SIZE - MAX_PLY {
                    tables.rep_stack[tables.game_ply] = pre_move_hash;
                    tables.game_ply += 1;
                }
            }
        }

        self.position = board;
    }

    /// Sets a UCI option from a `setoption` command.
    pub fn set_option<'a, T>(&mut self, mut tokens: T)
    where
        T: Iterator<Item = &'a str>,
    {
        if tokens.next() != Some("name") {
            return;
        }

        let mut name = String::new();
        let mut value = String::new();
        let mut in_value = false;
        for token in tokens {
            if token == "value" {
                in_value = true;
            } else if in_value {
                push_token(&mut value, token);
            } else {
                push_token(&mut name, token);
            }
        }

        self.halt();
        match name.as_str() {
            "Hash" => {
                let Some(mib) = value.parse().ok().map(UciOptions::clamp_hash) else {
                    return;
                };
                let tables = self
                    .tables
                    .as_mut()
                    .expect("the tables are always present when idle");
                if tables.tt.resize(mib) {
                    self.options.set_hash(mib);
                    println!("info string Hash set to {mib} MB");
                } else {
                    println!("info string Hash allocation failed, keeping the previous table");
                }
            }
            "Clear Hash" => {
                self.tables
                    .as_mut()
                    .expect("the tables are always present when idle")
                    .tt
                    .clear();
                println!("info string Hash cleared");
            }
            _ => (),
        }
    }

    /// Resets the engine for a new game: starting position, cleared hash
    /// table and repetition stack.
    pub fn new_game(&mut self) {
        self.halt();
        self.position.set_startpos();
        self.tables
            .as_mut()
            .expect("the tables are always present when idle")
            .clear();
    }

    /// Stops any running search and waits for its `bestmove`.
    pub fn stop(&mut self) {
        self.halt();
    }

    /// Joins the worker, if any, taking the search tables back.
    fn halt(&mut self) {
        if let Some(handle) = self.worker.take() {
            self.stopped.store(true, Ordering::Relaxed);
            let tables = handle.join().expect("the search thread panicked");
            self.tables = Some(tables);
        }
    }
}

/// Finds the legal move matching `token` and applies it to `board`.
///
/// Returns `false`, leaving the board untouched, if no legal move renders to
/// the token.
fn apply_move_token(board: &mut Position, token: &str) -> bool {
    let mut moves = Moves::new();
    generate_moves::<AllMoves>(board, &mut moves);

    for &mv in moves.iter() {
        if mv.render(board.is_flipped()) == token {
            let mut copy = *board;
            if copy.make_move(mv) {
                *board = copy;
                return true;
            }
            return false;
        }
    }
    false
}

/// Appends a token to a space-separated string.
fn push_token(string: &mut String, token: &str) {
    if !string.is_empty() {
        string.push(' ');
    }
    string.push_str(token);
}

/// Parses an `Option<&str>` into an `Option<T>`.
///
/// If the parse fails, it will return [`None`].
fn parse_option<T: FromStr>(num: Option<&str>) -> Option<T> {
    num.and_then(|t| t.parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::Engine;
    use crate::{position::Position, zobrist};

    #[test]
    fn position_command_builds_the_repetition_stack() {
        let mut engine = Engine::new();
        engine.set_position("startpos moves g1f3 g8f6 f3g1 f6g8".split_whitespace());

        let tables = engine.tables.as_ref().expect("no search is running");
        assert_eq!(tables.game_ply, 4);
        // the final position repeats the start position
        assert_eq!(
            tables.rep_stack[0],
            zobrist::hash(engine.position())
        );
    }

    #[test]
    fn illegal_move_tokens_are_skipped() {
        let mut engine = Engine::new();
        engine.set_position("startpos moves e2e5 e2e4 e7e5".split_whitespace());

        // e2e5 is skipped; the other two moves apply
        let mut expected = Engine::new();
        expected.set_position("startpos moves e2e4 e7e5".split_whitespace());
        assert!(engine.position() == expected.position());
        assert!(engine.position() != &Position::default());
    }

    #[test]
    fn a_fen_position_command_applies_moves_from_the_fen() {
        let mut engine = Engine::new();
        engine.set_position(
            "fen 4k3/8/8/8/8/8/8/4K2R w K - 0 1 moves e1g1".split_whitespace(),
        );
        // after castling the rook sits on f1
        assert_eq!(
            engine.position().to_string(),
            "4k3/8/8/8/8/8/8/5RK1 b - - 0 1"
        );
    }
}
