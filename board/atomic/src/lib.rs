//! Rules for atomic chess, where every capture sets off an explosion.
//!
//! A capture destroys the capturing piece, the captured piece, and every piece other than a pawn
//! on the eight squares around the capture. A side loses the moment its king leaves the board;
//! there is no check, castling, en passant or promotion.
//!
//! ```
//! use atomic::AtomicGame;
//! use board::{BoardSquare, Game, GameStatus};
//!
//! let mut game = AtomicGame::new();
//! assert!(game.make_move(BoardSquare::E2, BoardSquare::E4));
//! assert!(!game.make_move(BoardSquare::E4, BoardSquare::E5)); // black's turn
//! assert_eq!(game.status(), GameStatus::Unfinished);
//! ```

use board::{
    BoardSquare, BoardSquareFromStrErr, Color, Game, GameStatus, Move, Piece, PieceKind,
};
use log::{debug, info, trace};
use utils::{invariant, InvariantExpect};

mod bitboard;
mod board_state;
pub mod explosion;
pub mod validator;

pub use crate::bitboard::Bitboard;
pub use crate::board_state::BoardState;
pub use crate::explosion::Explosion;
pub use crate::validator::{CaptureRule, MoveKind, MoveShape};

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Why a request was refused
///
/// Every one of these is the caller's mistake, and a refused request never changes the game.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("{0} is not a square on the board")]
    InvalidSquare(BoardSquare),
    #[error("couldn't read square: {0}")]
    ParseSquare(#[from] BoardSquareFromStrErr),
    #[error("no piece on {0} to move")]
    SourcePieceMissing(BoardSquare),
    #[error("the {piece} on {square} can't move on the other side's turn")]
    WrongSide { piece: Piece, square: BoardSquare },
    #[error("a {piece} can never make the move {mv}")]
    MoveNeverLegal { piece: Piece, mv: Move },
    #[error("the {piece} making the move {mv} is blocked by another piece")]
    MoveBlocked { piece: Piece, mv: Move },
    #[error("attempted to capture on {}, but no piece there to be captured", .0.target)]
    CaptureTargetMissing(Move),
    #[error("move {0} lands on a piece of the mover's own color")]
    OwnPieceAtTarget(Move),
    #[error("a king may not capture, so {0} is not allowed")]
    KingCapture(Move),
    #[error("the game is already over ({0})")]
    GameOver(GameStatus),
    #[error("more than one {0} king on the board")]
    InvalidPosition(Color),
}

/// What an accepted move did to the board
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The piece moved onto an empty square and nothing else changed
    Relocated,
    /// The move was a capture
    Exploded(Explosion),
}

/// A game of atomic chess in progress
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtomicGame {
    board: BoardState,
    side_to_move: Color,
    status: GameStatus,
    /// Where white's king stands, or [`BoardSquare::INVALID`] once it is destroyed
    white_king: BoardSquare,
    /// Where black's king stands, or [`BoardSquare::INVALID`] once it is destroyed
    black_king: BoardSquare,
}

impl AtomicGame {
    /// A game in the standard opening position with white to move
    pub fn new() -> Self {
        Self {
            board: BoardState::initial(),
            side_to_move: Color::White,
            status: GameStatus::Unfinished,
            white_king: BoardSquare::E1,
            black_king: BoardSquare::E8,
        }
    }

    /// A game starting from an arbitrary arrangement of pieces
    ///
    /// A side with no king has already lost, so the game may start finished. A side with more
    /// than one king is refused.
    pub fn from_position(board: BoardState, side_to_move: Color) -> Result<Self> {
        let king_square = |color| {
            let mut kings = board
                .find(Piece::new(color, PieceKind::King))
                .squares_iter();
            match (kings.next(), kings.next()) {
                (_, Some(_)) => Err(Error::InvalidPosition(color)),
                (king, None) => Ok(king.unwrap_or(BoardSquare::INVALID)),
            }
        };
        let white_king = king_square(Color::White)?;
        let black_king = king_square(Color::Black)?;
        let mut game = Self {
            board,
            side_to_move,
            status: GameStatus::Unfinished,
            white_king,
            black_king,
        };
        game.refresh_status();
        Ok(game)
    }

    /// The pieces and where they stand
    pub const fn board(&self) -> &BoardState {
        &self.board
    }

    /// Where the given side's king stands, or `None` if it has been destroyed
    pub fn king_square(&self, color: Color) -> Option<BoardSquare> {
        let square = match color {
            Color::White => self.white_king,
            Color::Black => self.black_king,
        };
        square.is_valid().then_some(square)
    }

    /// Move the piece on `source` to `target`, if that is legal.
    ///
    /// Returns whether the move was made. A refused move changes nothing, including whose turn
    /// it is. See [`Self::try_move`] for the reason a move is refused.
    pub fn make_move(&mut self, source: BoardSquare, target: BoardSquare) -> bool {
        self.try_move(source, target).is_ok()
    }

    /// Like [`Self::make_move`], but with the squares given as text such as `"e2"` or `"E2"`
    pub fn make_move_str(&mut self, source: &str, target: &str) -> bool {
        self.try_move_str(source, target).is_ok()
    }

    /// Like [`Self::try_move`], but with the squares given as text
    pub fn try_move_str(&mut self, source: &str, target: &str) -> Result<MoveOutcome> {
        let parsed = source
            .parse()
            .and_then(|source: BoardSquare| Ok(Move::new(source, target.parse()?)));
        match parsed {
            Ok(mv) => self.try_move(mv.source, mv.target),
            Err(e) => {
                trace!("refused move {source:?} to {target:?}: {e}");
                Err(e.into())
            }
        }
    }

    /// Look up a square given as text
    ///
    /// ```
    /// use atomic::AtomicGame;
    /// use board::{Color, Piece, PieceKind};
    /// let game = AtomicGame::new();
    /// assert_eq!(
    ///     game.piece_at_str("E1").unwrap(),
    ///     Some(Piece::new(Color::White, PieceKind::King)),
    /// );
    /// assert!(game.piece_at_str("e9").is_err());
    /// ```
    pub fn piece_at_str(&self, square: &str) -> Result<Option<Piece>> {
        self.board.get(square.parse()?)
    }

    /// Move the piece on `source` to `target` if legal, reporting what happened or why not.
    ///
    /// A move onto an enemy piece is a capture and sets off an explosion, unless the moving
    /// piece is a king: kings may never capture at all.
    pub fn try_move(&mut self, source: BoardSquare, target: BoardSquare) -> Result<MoveOutcome> {
        let result = self.apply(source, target);
        match &result {
            Ok(MoveOutcome::Relocated) => debug!("{source}{target} played"),
            Ok(MoveOutcome::Exploded(explosion)) => debug!(
                "{source}{target} exploded on {}, destroying {:?}",
                explosion.center, explosion.destroyed
            ),
            Err(e) => trace!("refused move {source}{target}: {e}"),
        }
        if result.is_ok() {
            if let Some(winner) = self.status.winner() {
                info!("{winner} wins after {source}{target}");
            }
        }
        result
    }

    /// Validate, then carry out, a move. Nothing is changed unless the whole move is legal.
    fn apply(&mut self, source: BoardSquare, target: BoardSquare) -> Result<MoveOutcome> {
        if self.status.is_finished() {
            return Err(Error::GameOver(self.status));
        }
        let kind = validator::validate(&self.board, self.side_to_move, source, target)?;
        let piece = self
            .board
            .get(source)
            .ok()
            .flatten()
            .expect_invariant("validated move has a piece on its source");
        let outcome = match kind {
            MoveKind::Capture { .. } if piece.kind == PieceKind::King => {
                return Err(Error::KingCapture(Move::new(source, target)));
            }
            MoveKind::Capture { .. } => {
                let explosion = explosion::resolve(&mut self.board, source, target)?;
                for color in Color::COLORS {
                    if explosion.destroyed_king(color) {
                        *self.king_square_mut(color) = BoardSquare::INVALID;
                    }
                }
                MoveOutcome::Exploded(explosion)
            }
            MoveKind::Relocation => {
                self.board
                    .place(source, None)
                    .expect_invariant("validated source is on the board");
                self.board
                    .place(target, Some(piece))
                    .expect_invariant("validated target is on the board");
                if piece.kind == PieceKind::King {
                    *self.king_square_mut(piece.color) = target;
                }
                MoveOutcome::Relocated
            }
        };
        self.side_to_move = self.side_to_move.other();
        self.refresh_status();
        Ok(outcome)
    }

    fn king_square_mut(&mut self, color: Color) -> &mut BoardSquare {
        match color {
            Color::White => &mut self.white_king,
            Color::Black => &mut self.black_king,
        }
    }

    /// Whether the given side's king is still on the board, checking the cached square against
    /// the board itself
    fn king_alive(&self, color: Color) -> bool {
        let king = Piece::new(color, PieceKind::King);
        let cached = match color {
            Color::White => self.white_king,
            Color::Black => self.black_king,
        };
        invariant!(
            self.board.find(king) == Bitboard::from(cached),
            "{color} king cached on {cached} but board is {:?}",
            self.board
        );
        cached.is_valid()
    }

    /// Recompute the status from which kings remain
    ///
    /// Once finished, a game stays finished. If a single explosion took both kings, white's
    /// loss is found first.
    fn refresh_status(&mut self) {
        if self.status.is_finished() {
            return;
        }
        self.status = if !self.king_alive(Color::White) {
            GameStatus::won_by(Color::Black)
        } else if !self.king_alive(Color::Black) {
            GameStatus::won_by(Color::White)
        } else {
            GameStatus::Unfinished
        };
    }
}

impl Default for AtomicGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for AtomicGame {
    type Err = Error;

    fn initial_state() -> Self {
        Self::new()
    }

    fn play(&mut self, mv: Move) -> Result<()> {
        self.try_move(mv.source, mv.target).map(drop)
    }

    fn piece_at(&self, square: BoardSquare) -> Result<Option<Piece>> {
        self.board.get(square)
    }

    fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    fn status(&self) -> GameStatus {
        self.status
    }
}
