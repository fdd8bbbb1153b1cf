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
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use crate::error::ParseError;

/// A file: file A = 0 to file H = 7.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct File(pub u8);

/// A type of piece.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PieceType(pub u8);

/// A rank: rank 1 = 0 to rank 8 = 7.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Rank(pub u8);

/// One of the two sides of a normalized board.
///
/// The board is always oriented so that the side to move plays towards rank
/// 8, so the sides are "us" (the mover) and "them", not White and Black.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Side(pub u8);

/// A square, with little-endian rank-file mapping: a1 = 0, b1 = 1, etc.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Square(pub u8);

/// File enumerations.
#[allow(dead_code, clippy::missing_docs_in_private_items)]
impl File {
    pub const A: Self = Self(0);
    pub const B: Self = Self(1);
    pub const C: Self = Self(2);
    pub const D: Self = Self(3);
    pub const E: Self = Self(4);
    pub const F: Self = Self(5);
    pub const G: Self = Self(6);
    pub const H: Self = Self(7);
    pub const TOTAL: usize = 8;
}

/// Piece type enumerations.
#[allow(clippy::missing_docs_in_private_items)]
impl PieceType {
    pub const PAWN: Self = Self(0);
    pub const KNIGHT: Self = Self(1);
    pub const BISHOP: Self = Self(2);
    pub const ROOK: Self = Self(3);
    pub const QUEEN: Self = Self(4);
    pub const KING: Self = Self(5);
    pub const TOTAL: usize = 6;
    pub const NONE: Self = Self(6);
}

/// Rank enumerations.
#[allow(dead_code, clippy::missing_docs_in_private_items)]
impl Rank {
    pub const RANK1: Self = Self(0);
    pub const RANK2: Self = Self(1);
    pub const RANK3: Self = Self(2);
    pub const RANK4: Self = Self(3);
    pub const RANK5: Self = Self(4);
    pub const RANK6: Self = Self(5);
    pub const RANK7: Self = Self(6);
    pub const RANK8: Self = Self(7);
    pub const TOTAL: usize = 8;
}

/// Side enumerations.
#[allow(clippy::missing_docs_in_private_items)]
impl Side {
    pub const US: Self = Self(0);
    pub const THEM: Self = Self(1);
    pub const TOTAL: usize = 2;
}

/// Square enumerations.
#[allow(dead_code, clippy::missing_docs_in_private_items)]
impl Square {
    pub const A1: Self = Self(0);
    pub const B1: Self = Self(1);
    pub const C1: Self = Self(2);
    pub const D1: Self = Self(3);
    pub const E1: Self = Self(4);
    pub const F1: Self = Self(5);
    pub const G1: Self = Self(6);
    pub const H1: Self = Self(7);
    pub const A3: Self = Self(16);
    pub const A8: Self = Self(56);
    pub const E8: Self = Self(60);
    pub const H8: Self = Self(63);
    pub const TOTAL: usize = 64;
}

impl From<Square> for File {
    /// Calculates the file of a square.
    fn from(square: Square) -> Self {
        Self(square.0 & 7)
    }
}

impl From<Square> for Rank {
    /// Calculates the rank of a square.
    fn from(square: Square) -> Self {
        Self(square.0 >> 3)
    }
}

impl From<File> for char {
    /// Converts a file into a character: 'a' to 'h'.
    fn from(file: File) -> Self {
        (b'a' + file.0) as Self
    }
}

impl From<Rank> for char {
    /// Converts a rank into a character: '1' to '8'.
    fn from(rank: Rank) -> Self {
        (b'1' + rank.0) as Self
    }
}

impl From<PieceType> for char {
    /// Converts a piece type into its lowercase character: 'p' to 'k'.
    fn from(piece_type: PieceType) -> Self {
        let chars = [b'p', b'n', b'b', b'r', b'q', b'k'];
        chars
            .get(piece_type.to_index())
            .map_or('?', |&ch| ch as Self)
    }
}

impl TryFrom<char> for PieceType {
    type Error = ParseError;

    /// Converts a piece character specified by FEN into a type of piece.
    fn try_from(piece: char) -> Result<Self, Self::Error> {
        Ok(match piece.to_ascii_lowercase() {
            'p' => Self::PAWN,
            'n' => Self::KNIGHT,
            'b' => Self::BISHOP,
            'r' => Self::ROOK,
            'q' => Self::QUEEN,
            'k' => Self::KING,
            _ => return Err(ParseError::BadPiece),
        })
    }
}

impl Display for Square {
    /// Converts a square into its string representation, e.g. "b3".
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            char::from(File::from(*self)),
            char::from(Rank::from(*self))
        )
    }
}

impl FromStr for Square {
    type Err = ParseError;

    /// Converts a string representation of a square (e.g. "e4") into a
    /// [`Square`].
    fn from_str(string: &str) -> Result<Self, Self::Err> {
        let mut iter = string.as_bytes().iter();

        let file = iter.next().ok_or(ParseError::BadSquare)?;
        if !(b'a'..=b'h').contains(file) {
            return Err(ParseError::BadSquare);
        }

        let rank = iter.next().ok_or(ParseError::BadSquare)?;
        if !(b'1'..=b'8').contains(rank) {
            return Err(ParseError::BadSquare);
        }

        Ok(Self((rank - b'1') * 8 + (file - b'a')))
    }
}

impl PieceType {
    /// Converts the piece type to a usize.
    pub const fn to_index(self) -> usize {
        self.0 as usize
    }
}

impl Side {
    /// Flips the side: `Side::US.flip() == Side::THEM`.
    pub const fn flip(self) -> Self {
        Self(self.0 ^ 1)
    }

    /// Converts the side to a usize.
    pub const fn to_index(self) -> usize {
        self.0 as usize
    }
}

impl Square {
    /// Converts `rank` and `file` into a [`Square`].
    pub const fn from_pos(rank: Rank, file: File) -> Self {
        Self(rank.0 * 8 + file.0)
    }

    /// Vertically mirrors the square, as [`flip()`](crate::position::Position::flip)
    /// does to the whole board.
    pub const fn flip(self) -> Self {
        Self(self.0 ^ 56)
    }

    /// Converts the square to a usize.
    pub const fn to_index(self) -> usize {
        self.0 as usize
    }
}
