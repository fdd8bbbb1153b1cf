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

use std::{io::stdin, time::Instant};

use crate::{engine::Engine, evaluation::evaluate, perft::perft};

/// The name of the author of this engine.
const ID_AUTHOR: &str = "Casey Holland";
/// The name of this engine.
const ID_NAME: &str = "Skink";
/// The version of this engine.
const ID_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The UCI options this engine supports.
#[derive(Clone, Copy)]
pub struct UciOptions {
    /// How large the transposition table is, in MiB.
    hash: usize,
}

impl Default for UciOptions {
    fn default() -> Self {
        Self { hash: 16 }
    }
}

impl UciOptions {
    /// The smallest permissible hash size, in MiB.
    const MIN_HASH: usize = 1;
    /// The largest permissible hash size, in MiB.
    const MAX_HASH: usize = 4096;

    /// Creates new [`UciOptions`] with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prints the identification of this engine and the options it supports.
    fn print() {
        let defaults = Self::default();
        println!("id name {ID_NAME} {ID_VERSION}");
        println!("id author {ID_AUTHOR}");
        println!(
            "option name Hash type spin default {} min {} max {}",
            defaults.hash(),
            Self::MIN_HASH,
            Self::MAX_HASH,
        );
        println!("option name Clear Hash type button");
    }

    /// Clamps a requested hash size into the permissible range.
    pub fn clamp_hash(hash: usize) -> usize {
        hash.clamp(Self::MIN_HASH, Self::MAX_HASH)
    }

    /// Sets the hash size, which is assumed to be clamped already.
    pub fn set_hash(&mut self, hash: usize) {
        self.hash = hash;
    }

    /// Returns the hash size in MiB.
    pub const fn hash(&self) -> usize {
        self.hash
    }
}

/// Repeatedly reads a line of input and executes it according to the UCI
/// protocol, until `quit` or the end of input.
///
/// Unknown commands and malformed arguments are skipped: the engine stays at
/// its last valid state rather than crashing mid-game.
pub fn main_loop() {
    println!("{ID_NAME} {ID_VERSION} by {ID_AUTHOR}");

    let mut engine = Engine::new();

    for line in stdin().lines() {
        let Ok(line) = line else { break };
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("uci") => {
                UciOptions::print();
                println!("uciok");
            }
            Some("isready") => println!("readyok"),
            Some("ucinewgame") => engine.new_game(),
            Some("position") => engine.set_position(tokens),
            Some("go") => engine.go(tokens),
            Some("stop") => engine.stop(),
            Some("setoption") => engine.set_option(tokens),
            Some("d") => engine.position().pretty_print(),
            Some("eval") => println!("Eval: {} cp", evaluate(engine.position())),
            Some("perft") => {
                engine.stop();
                if let Some(depth) = tokens.next().and_then(|depth| depth.parse().ok()) {
                    run_perft(&engine, depth);
                }
            }
            Some("quit") => break,
            Some(other) => println!("info string Unrecognised command \"{other}\"."),
            None => (),
        }
    }

    engine.stop();
}

/// Runs a timed perft to `depth` on the current position.
fn run_perft(engine: &Engine, depth: u8) {
    let start = Instant::now();
    let nodes = perft::<true>(engine.position(), depth);
    let elapsed_us = (start.elapsed().as_micros().max(1)) as u64;

    println!("Nodes: {nodes}");
    println!("Time: {} ms", elapsed_us / 1_000);
    println!("NPS: {}", nodes * 1_000_000 / elapsed_us);
}
