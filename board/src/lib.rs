//! The vocabulary shared by everything that plays or shows a game: squares, pieces, colors,
//! moves, and the [`Game`] interface that rule engines implement.

use core::{fmt, str::FromStr};
use std::error;

#[cfg(any(test, feature = "quickcheck"))]
mod arbitrary;

/// The six kinds of chess piece
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}
impl PieceKind {
    /// Every kind, pawn first
    pub const KINDS: [PieceKind; 6] = [
        Self::Pawn,
        Self::Rook,
        Self::Knight,
        Self::Bishop,
        Self::Queen,
        Self::King,
    ];

    /// The capitalized letter conventionally used for this piece
    pub const fn letter(self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Rook => 'R',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }
}

/// The two sides
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}
impl Color {
    /// Both colors, white first
    pub const COLORS: [Color; 2] = [Color::White, Color::Black];

    pub const fn other(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub const fn is_white(self) -> bool {
        match self {
            Color::White => true,
            Color::Black => false,
        }
    }
}
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Color::White => "white",
            Color::Black => "black",
        })
    }
}

/// A piece
///
/// A piece doesn't store its own square: wherever it is stored on a board, the key it is stored
/// under is its position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}
impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { kind, color }
    }

    /// The letter for this piece, uppercase for white and lowercase for black
    pub const fn letter(self) -> char {
        match self.color {
            Color::White => self.kind.letter().to_ascii_uppercase(),
            Color::Black => self.kind.letter().to_ascii_lowercase(),
        }
    }

    /// Every combination of color and kind, white first
    ///
    /// ```
    /// assert_eq!(board::Piece::all_pieces().count(), 12);
    /// ```
    pub fn all_pieces() -> impl Iterator<Item = Self> {
        Color::COLORS
            .into_iter()
            .flat_map(|color| PieceKind::KINDS.into_iter().map(move |kind| Self { kind, color }))
    }
}
impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            PieceKind::Pawn => "pawn",
            PieceKind::Rook => "rook",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::Queen => "queen",
            PieceKind::King => "king",
        };
        write!(f, "{} {kind}", self.color)
    }
}

/// Where a game stands
///
/// A game is decided the moment a king leaves the board, so once this is anything other than
/// [`GameStatus::Unfinished`] it never changes again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameStatus {
    /// Both kings are still on the board
    Unfinished,
    /// Black's king was destroyed
    WhiteWon,
    /// White's king was destroyed
    BlackWon,
}
impl GameStatus {
    /// The status for a game won by the given side
    pub const fn won_by(winner: Color) -> Self {
        match winner {
            Color::White => Self::WhiteWon,
            Color::Black => Self::BlackWon,
        }
    }

    pub const fn is_finished(self) -> bool {
        !matches!(self, Self::Unfinished)
    }

    /// The side which won, if the game is over
    pub const fn winner(self) -> Option<Color> {
        match self {
            Self::Unfinished => None,
            Self::WhiteWon => Some(Color::White),
            Self::BlackWon => Some(Color::Black),
        }
    }
}
impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unfinished => "UNFINISHED",
            Self::WhiteWon => "WHITE_WON",
            Self::BlackWon => "BLACK_WON",
        })
    }
}

/// Functionality belonging to every rule engine that can be played
pub trait Game: Sized {
    /// Why a move or lookup was refused
    type Err: fmt::Debug;

    /// A new game, in the opening position
    fn initial_state() -> Self;

    /// Play one move
    ///
    /// Returns `Ok(())` if the move is legal. Otherwise the game is left untouched and the reason
    /// is returned.
    fn play(&mut self, mv: Move) -> Result<(), Self::Err>;

    /// Play a whole sequence of moves from the opening, stopping at the first refusal
    fn from_move_sequence(moves: impl IntoIterator<Item = Move>) -> Result<Self, Self::Err> {
        moves
            .into_iter()
            .try_fold(Self::initial_state(), |mut game, mv| {
                game.play(mv)?;
                Ok(game)
            })
    }

    /// Look up the piece on the given square
    fn piece_at(&self, square: BoardSquare) -> Result<Option<Piece>, Self::Err>;

    /// The side whose turn it is
    fn side_to_move(&self) -> Color;

    /// Whether the game has been decided
    fn status(&self) -> GameStatus;
}

/// A request to move whatever stands on `source` to `target`
///
/// Its text form is the two squares run together, as in long algebraic notation:
///
/// ```
/// use board::{BoardSquare, Move};
/// let mv: Move = "D2d4".parse().unwrap();
/// assert_eq!(mv, Move::new(BoardSquare::D2, BoardSquare::D4));
/// assert_eq!(mv.to_string(), "d2d4");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub source: BoardSquare,
    pub target: BoardSquare,
}
impl Move {
    pub const fn new(source: BoardSquare, target: BoardSquare) -> Self {
        Self { source, target }
    }
}
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.source, self.target)
    }
}
impl FromStr for Move {
    type Err = BoardSquareFromStrErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 4 {
            return Err(BoardSquareFromStrErr);
        }
        let source = s.get(..2).ok_or(BoardSquareFromStrErr)?.parse()?;
        let target = s.get(2..).ok_or(BoardSquareFromStrErr)?.parse()?;
        Ok(Self { source, target })
    }
}

/// Declare the named constant for every square, one rank per line
macro_rules! square_constants {
    ($( $rank:literal: $a:ident $b:ident $c:ident $d:ident $e:ident $f:ident $g:ident $h:ident; )*) => {
        impl BoardSquare {$(
            pub const $a: Self = Self::from_rank_file($rank, 0);
            pub const $b: Self = Self::from_rank_file($rank, 1);
            pub const $c: Self = Self::from_rank_file($rank, 2);
            pub const $d: Self = Self::from_rank_file($rank, 3);
            pub const $e: Self = Self::from_rank_file($rank, 4);
            pub const $f: Self = Self::from_rank_file($rank, 5);
            pub const $g: Self = Self::from_rank_file($rank, 6);
            pub const $h: Self = Self::from_rank_file($rank, 7);
        )*}
    };
}

/// One square of the board, or [`BoardSquare::INVALID`]
///
/// The byte holds the rank in its high nibble and the file in its low nibble (the "0x88"
/// layout). Bits 3 and 7 are never set on a real square, and stepping off any edge of the board
/// sets one of them, so a walk across the board can tell when it has left.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoardSquare(pub u8);

square_constants! {
    0: A1 B1 C1 D1 E1 F1 G1 H1;
    1: A2 B2 C2 D2 E2 F2 G2 H2;
    2: A3 B3 C3 D3 E3 F3 G3 H3;
    3: A4 B4 C4 D4 E4 F4 G4 H4;
    4: A5 B5 C5 D5 E5 F5 G5 H5;
    5: A6 B6 C6 D6 E6 F6 G6 H6;
    6: A7 B7 C7 D7 E7 F7 G7 H7;
    7: A8 B8 C8 D8 E8 F8 G8 H8;
}

impl BoardSquare {
    /// The one value used to mean "not a square"
    pub const INVALID: Self = Self(0xee);

    /// Whether this is one of the 64 squares
    ///
    /// ```
    /// use board::BoardSquare;
    /// assert!(BoardSquare::A8.is_valid());
    /// assert!(!BoardSquare(0x08).is_valid());
    /// assert!(!BoardSquare::INVALID.is_valid());
    /// ```
    pub const fn is_valid(self) -> bool {
        self.0 & 0x88 == 0
    }

    /// The square at a zero-based rank and file, or [`Self::INVALID`] if either is 8 or more
    pub const fn from_rank_file(rank: u8, file: u8) -> Self {
        if rank < 8 && file < 8 {
            Self(rank << 4 | file)
        } else {
            Self::INVALID
        }
    }

    /// The zero-based `(rank, file)` of a real square
    pub const fn to_rank_file(self) -> Option<(u8, u8)> {
        if !self.is_valid() {
            return None;
        }
        Some((self.0 >> 4, self.0 & 0x0f))
    }

    /// The square `rank` ranks up the board (towards black) and `file` files across (towards
    /// the h file), which is invalid once it leaves the board
    ///
    /// ```
    /// use board::BoardSquare;
    /// assert_eq!(BoardSquare::B1.offset(2, -1), BoardSquare::A3);
    /// assert_eq!(BoardSquare::G5.offset(-4, -4), BoardSquare::C1);
    /// assert!(!BoardSquare::A3.offset(0, -1).is_valid());
    /// assert!(!BoardSquare::C7.offset(2, 0).is_valid());
    /// assert!(!BoardSquare::H2.offset(-2, 1).is_valid());
    /// ```
    pub const fn offset(self, rank: i8, file: i8) -> Self {
        BoardSquareOffset::from_rank_file(rank, file).offset(self)
    }

    /// Every square, a1 to h1, then a2 to h2, and so on up to h8
    pub fn all_squares() -> impl Iterator<Item = Self> {
        (0..8).flat_map(|rank| (0..8).map(move |file| Self::from_rank_file(rank, file)))
    }

    /// How far `other` is from this square, or [`BoardSquareOffset::INVALID`] if either
    /// square isn't on the board
    ///
    /// ```
    /// use board::BoardSquare;
    /// let step = BoardSquare::G1.offset_to(BoardSquare::H3);
    /// assert_eq!((step.rank(), step.file()), (2, 1));
    /// assert_eq!(step.offset(BoardSquare::G1), BoardSquare::H3);
    /// ```
    pub const fn offset_to(self, other: Self) -> BoardSquareOffset {
        match (self.to_rank_file(), other.to_rank_file()) {
            (Some((from_rank, from_file)), Some((to_rank, to_file))) => {
                BoardSquareOffset::from_rank_file(
                    to_rank as i8 - from_rank as i8,
                    to_file as i8 - from_file as i8,
                )
            }
            _ => BoardSquareOffset::INVALID,
        }
    }
}
/// The square's name, or the raw byte if it isn't on the board
impl fmt::Debug for BoardSquare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{self}")
        } else {
            write!(f, "BoardSquare({:#04x})", self.0)
        }
    }
}
/// Lowercase file letter then rank digit, or `"XX"` for an invalid square
impl fmt::Display for BoardSquare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_rank_file() {
            Some((rank, file)) => write!(f, "{}{}", (b'a' + file) as char, (b'1' + rank) as char),
            None => f.write_str("XX"),
        }
    }
}

/// Text which doesn't name a square
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardSquareFromStrErr;
impl fmt::Display for BoardSquareFromStrErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("expected a file letter a-h and a rank digit 1-8")
    }
}
impl error::Error for BoardSquareFromStrErr {}
/// Parses a file letter and a rank digit, ignoring the letter's case
///
/// ```
/// use board::BoardSquare;
/// assert_eq!("E4".parse(), Ok(BoardSquare::E4));
/// assert!("i1".parse::<BoardSquare>().is_err());
/// assert!("a9".parse::<BoardSquare>().is_err());
/// ```
impl FromStr for BoardSquare {
    type Err = BoardSquareFromStrErr;

    fn from_str(text: &str) -> Result<Self, BoardSquareFromStrErr> {
        match *text.as_bytes() {
            [file, rank] => {
                let file = file.to_ascii_lowercase();
                if (b'a'..=b'h').contains(&file) && (b'1'..=b'8').contains(&rank) {
                    Ok(Self::from_rank_file(rank - b'1', file - b'a'))
                } else {
                    Err(BoardSquareFromStrErr)
                }
            }
            _ => Err(BoardSquareFromStrErr),
        }
    }
}

/// The difference between two squares, in ranks and files
///
/// Uses the same nibble layout as [`BoardSquare`], with each nibble a four-bit two's complement
/// number, so that adding it to a square is a single byte addition.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BoardSquareOffset(u8);
impl BoardSquareOffset {
    /// The eight single steps: along ranks, files and diagonals
    pub const NEIGHBORS: [Self; 8] = Self::all_of([
        (1, -1),
        (1, 0),
        (1, 1),
        (0, -1),
        (0, 1),
        (-1, -1),
        (-1, 0),
        (-1, 1),
    ]);

    /// The eight jumps of a knight
    pub const KNIGHT_MOVES: [Self; 8] = Self::all_of([
        (2, -1),
        (2, 1),
        (1, -2),
        (1, 2),
        (-1, -2),
        (-1, 2),
        (-2, -1),
        (-2, 1),
    ]);

    /// Takes every square, valid or not, to an invalid one
    pub const INVALID: Self = Self(0x88);

    const fn all_of(steps: [(i8, i8); 8]) -> [Self; 8] {
        let mut offsets = [Self::INVALID; 8];
        let mut idx = 0;
        while idx < 8 {
            let (rank, file) = steps[idx];
            offsets[idx] = Self::from_rank_file(rank, file);
            idx += 1;
        }
        offsets
    }

    /// The offset of `rank` ranks and `file` files
    ///
    /// Both must be in `-7..=7`, which is checked in debug builds.
    pub const fn from_rank_file(rank: i8, file: i8) -> Self {
        debug_assert!(rank.unsigned_abs() < 8 && file.unsigned_abs() < 8);
        Self((rank as u8) << 4 | (file as u8 & 0x0f))
    }

    /// Apply this offset to `square`. Invalid squares are returned as they are.
    pub const fn offset(self, square: BoardSquare) -> BoardSquare {
        if !square.is_valid() {
            return square;
        }
        // A carry out of either nibble lands in bit 3 or 7, and the sign bits flip it back when
        // the step was in the negative direction but stayed on the board
        BoardSquare((square.0 + (self.0 & 0x77)) ^ (self.0 & 0x88))
    }

    /// Files moved, positive towards the h file
    pub const fn file(self) -> i8 {
        ((self.0 << 4) as i8) >> 4
    }

    /// Ranks moved, positive towards rank 8
    pub const fn rank(self) -> i8 {
        (self.0 as i8) >> 4
    }

    /// The number of king steps this offset takes: the larger of the rank and file distances
    pub const fn chebyshev_distance(self) -> u8 {
        let (ranks, files) = (self.rank().unsigned_abs(), self.file().unsigned_abs());
        if ranks > files {
            ranks
        } else {
            files
        }
    }
}
impl fmt::Debug for BoardSquareOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoardSquareOffset({:+} ranks, {:+} files)", self.rank(), self.file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quickcheck::quickcheck;

    #[test]
    fn test_every_byte_prints_and_parses_consistently() {
        for byte in u8::MIN..=u8::MAX {
            let square = BoardSquare(byte);
            let name = square.to_string();
            assert_eq!(name.parse::<BoardSquare>().is_ok(), square.is_valid(), "{byte:#x}");
            if square.is_valid() {
                assert_eq!(name.parse(), Ok(square));
                assert_eq!(name.to_ascii_uppercase().parse(), Ok(square));
            }
        }
    }

    #[test]
    fn test_named_squares() {
        assert_eq!(BoardSquare::A1.to_string(), "a1");
        assert_eq!(BoardSquare::E1, BoardSquare(0x04));
        assert_eq!(BoardSquare::H8, BoardSquare(0x77));
        assert_eq!(BoardSquare::G5.to_rank_file(), Some((4, 6)));
        assert_eq!(BoardSquare::INVALID.to_string(), "XX");
        assert_eq!(format!("{:?}", BoardSquare::F3), "f3");
        assert_eq!(format!("{:?}", BoardSquare::INVALID), "BoardSquare(0xee)");
    }

    #[test]
    fn test_rejects_malformed_squares() {
        for text in ["", "e", "e44", "4e", "a0", "z1", "é1", " e4"] {
            assert!(text.parse::<BoardSquare>().is_err(), "{text:?} parsed");
        }
    }

    #[test]
    fn test_offsets_keep_their_components() {
        let components: Vec<(i8, i8)> = (-7..=7)
            .flat_map(|rank| (-7..=7).map(move |file| (rank, file)))
            .collect();
        for (rank, file) in components {
            let step = BoardSquareOffset::from_rank_file(rank, file);
            assert_eq!((step.rank(), step.file()), (rank, file), "{step:?}");
        }
    }

    #[test]
    fn test_neighbors_are_distance_one() {
        for offset in BoardSquareOffset::NEIGHBORS {
            assert_eq!(offset.chebyshev_distance(), 1);
        }
        for offset in BoardSquareOffset::KNIGHT_MOVES {
            assert_eq!(offset.chebyshev_distance(), 2);
        }
    }

    #[test]
    fn test_status_winner() {
        assert_eq!(GameStatus::won_by(Color::White), GameStatus::WhiteWon);
        assert_eq!(GameStatus::BlackWon.winner(), Some(Color::Black));
        assert!(!GameStatus::Unfinished.is_finished());
        assert_eq!(GameStatus::WhiteWon.to_string(), "WHITE_WON");
    }

    #[test]
    fn test_move_text() {
        assert_eq!(
            "c1G5".parse::<Move>(),
            Ok(Move::new(BoardSquare::C1, BoardSquare::G5))
        );
        assert!("c1g".parse::<Move>().is_err());
        assert!("c1g9".parse::<Move>().is_err());
    }

    quickcheck! {
        fn test_offset_to_round_trip(a: BoardSquare, b: BoardSquare) -> bool {
            a.offset_to(b).offset(a) == b
        }

        fn test_chebyshev_symmetric(a: BoardSquare, b: BoardSquare) -> bool {
            a.offset_to(b).chebyshev_distance() == b.offset_to(a).chebyshev_distance()
        }

        fn test_piece_letter_case_follows_color(piece: Piece) -> bool {
            piece.letter().is_ascii_uppercase() == piece.color.is_white()
        }
    }
}
