use core::fmt;

use board::{BoardSquare, Color, Piece, PieceKind};

use crate::{Bitboard, Error, Result};

/// Which piece, if any, stands on each of the 64 squares
///
/// Every square always has an entry; an empty square holds `None`. [`BoardState::place`] is the
/// only way to change what is on the board, and it keeps the occupancy masks in step with the
/// squares.
#[derive(Clone, PartialEq, Eq)]
pub struct BoardState {
    /// Indexed by `rank * 8 + file`, the same bit order as [`Bitboard`]
    squares: [Option<Piece>; 64],
    white: Bitboard,
    black: Bitboard,
}

impl BoardState {
    /// A board with no pieces on it
    pub const EMPTY: Self = Self {
        squares: [None; 64],
        white: Bitboard::empty(),
        black: Bitboard::empty(),
    };

    /// The pieces on the back rank, from the a file to the h file
    const BACK_RANK: [PieceKind; 8] = [
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Rook,
    ];

    /// The standard opening layout
    pub fn initial() -> Self {
        let mut board = Self::EMPTY;
        for (file, kind) in (0..8).zip(Self::BACK_RANK) {
            board.squares[file as usize] = Some(Piece::new(Color::White, kind));
            board.squares[8 + file as usize] = Some(Piece::new(Color::White, PieceKind::Pawn));
            board.squares[48 + file as usize] = Some(Piece::new(Color::Black, PieceKind::Pawn));
            board.squares[56 + file as usize] = Some(Piece::new(Color::Black, kind));
        }
        board.white = Bitboard(0xFFFF);
        board.black = Bitboard(0xFFFF0000_00000000);
        board
    }

    /// The array index for this square, or an error if it isn't on the board
    fn index(square: BoardSquare) -> Result<usize> {
        match square.to_rank_file() {
            Some((rank, file)) => Ok((rank * 8 + file) as usize),
            None => Err(Error::InvalidSquare(square)),
        }
    }

    /// Find the piece, if any, at the given square
    ///
    /// ```
    /// use atomic::{BoardState, Error};
    /// use board::{BoardSquare, Color, Piece, PieceKind};
    /// let board = BoardState::initial();
    /// assert_eq!(
    ///     board.get(BoardSquare::D8).unwrap(),
    ///     Some(Piece::new(Color::Black, PieceKind::Queen)),
    /// );
    /// assert_eq!(board.get(BoardSquare::D4).unwrap(), None);
    /// assert!(matches!(board.get(BoardSquare::INVALID), Err(Error::InvalidSquare(_))));
    /// ```
    pub fn get(&self, square: BoardSquare) -> Result<Option<Piece>> {
        Ok(self.squares[Self::index(square)?])
    }

    /// Overwrite whatever is on the given square
    ///
    /// Placing `None` empties the square. Whatever piece stood there before is gone.
    pub fn place(&mut self, square: BoardSquare, piece: Option<Piece>) -> Result<()> {
        let idx = Self::index(square)?;
        let mask = Bitboard::from_board_square(square);
        self.white &= !mask;
        self.black &= !mask;
        match piece {
            Some(Piece {
                color: Color::White,
                ..
            }) => self.white |= mask,
            Some(Piece {
                color: Color::Black,
                ..
            }) => self.black |= mask,
            None => {}
        }
        self.squares[idx] = piece;
        Ok(())
    }

    /// The squares occupied by the given side's pieces
    pub const fn pieces_of(&self, color: Color) -> Bitboard {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    /// Returns a bitboard of all occupied squares
    pub const fn occupied(&self) -> Bitboard {
        self.white.union(self.black)
    }

    /// Every piece on the board with the square it stands on, from a1 upwards
    pub fn pieces(&self) -> impl Iterator<Item = (BoardSquare, Piece)> + '_ {
        self.occupied().squares_iter().filter_map(|square| {
            let piece = self.get(square).ok().flatten()?;
            Some((square, piece))
        })
    }

    /// All the squares holding exactly this piece
    pub fn find(&self, piece: Piece) -> Bitboard {
        self.pieces_of(piece.color)
            .squares_iter()
            .filter(|&square| self.get(square).ok().flatten() == Some(piece))
            .collect()
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Shows the board one rank per line, rank 8 first, in piece letters with `.` for empty squares
impl fmt::Debug for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ranks = (0..8u8)
            .rev()
            .map(|rank| {
                (0..8u8)
                    .map(|file| {
                        self.squares[(rank * 8 + file) as usize].map_or('.', Piece::letter)
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>();
        f.debug_struct("BoardState").field("ranks", &ranks).finish()
    }
}
