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

/// An error produced when a FEN string or square token cannot be parsed.
///
/// The UCI layer reacts to every variant the same way - the offending
/// command is dropped and the engine stays at its last valid state - but the
/// variants name the parse site that failed, which keeps test failures
/// readable.
#[derive(Debug, Eq, PartialEq)]
pub enum ParseError {
    /// A square was not a file letter 'a'-'h' followed by a rank digit
    /// '1'-'8'.
    BadSquare,
    /// A character named no piece.
    BadPiece,
    /// A FEN string ran out before its board and side-to-move fields.
    MissingFenField,
    /// The FEN fields do not describe a position the engine can play: a rank
    /// overflowed the board, the side to move was unrecognisable, or a side
    /// did not have exactly one king.
    UnusablePosition,
}
