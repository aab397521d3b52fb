use core::{
    fmt,
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not},
};

use board::{BoardSquare, BoardSquareOffset};

/// A set of squares packed into a `u64`
///
/// Square `(rank, file)` is bit `rank * 8 + file`, so a1 is the lowest bit and h8 the highest.
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Bitboard(pub u64);

/// Turns a `const fn` from a square to a bitboard into a lookup in a table built at compile
/// time, with one entry per square on the board. Squares off the board map to the empty set.
macro_rules! precomputed_per_square {
    ( $(
        $( #[$meta:meta] )*
        $vis:vis const fn $name:ident($square:ident: BoardSquare) -> Self $body:block
    )* ) => { $(
        $(#[$meta])*
        $vis const fn $name(square: BoardSquare) -> Self {
            const TABLE: [Bitboard; 64] = {
                let mut table = [Bitboard::empty(); 64];
                let mut idx = 0;
                while idx < 64 {
                    let $square = BoardSquare::from_rank_file(idx as u8 / 8, idx as u8 % 8);
                    table[idx] = $body;
                    idx += 1;
                }
                table
            };
            match square.to_rank_file() {
                Some((rank, file)) => TABLE[(rank * 8 + file) as usize],
                None => Bitboard::empty(),
            }
        }
    )* };
}

/// Every square reached from `square` by one of the offsets, ignoring those which leave the board
const fn reached_by(square: BoardSquare, offsets: &[BoardSquareOffset; 8]) -> Bitboard {
    let mut reached = Bitboard::empty();
    let mut idx = 0;
    while idx < 8 {
        reached = reached.union(Bitboard::from_board_square(offsets[idx].offset(square)));
        idx += 1;
    }
    reached
}

/// If `start` and `end` are distinct squares on one rank, file or diagonal, the unit step
/// leading from `start` towards `end` and the number of such steps between them
const fn line_step(start: BoardSquare, end: BoardSquare) -> Option<(i8, i8, u8)> {
    let (Some((start_rank, start_file)), Some((end_rank, end_file))) =
        (start.to_rank_file(), end.to_rank_file())
    else {
        return None;
    };
    let rank_delta = end_rank as i8 - start_rank as i8;
    let file_delta = end_file as i8 - start_file as i8;
    let (ranks, files) = (rank_delta.unsigned_abs(), file_delta.unsigned_abs());
    let straight = ranks == 0 || files == 0;
    if (ranks == 0 && files == 0) || !(straight || ranks == files) {
        return None;
    }
    let steps = if ranks > files { ranks } else { files };
    Some((rank_delta.signum(), file_delta.signum(), steps))
}

impl Bitboard {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// The set holding only `square`, or nothing if it is off the board
    ///
    /// ```
    /// use atomic::Bitboard;
    /// use board::BoardSquare;
    /// assert_eq!(Bitboard::from_board_square(BoardSquare::C2), Bitboard(1 << 10));
    /// assert_eq!(Bitboard::from_board_square(BoardSquare::INVALID), Bitboard::empty());
    /// ```
    pub const fn from_board_square(square: BoardSquare) -> Self {
        match square.to_rank_file() {
            Some((rank, file)) => Self(1u64 << ((rank * 8 + file) as u64)),
            None => Self::empty(),
        }
    }

    precomputed_per_square! {
        /// The up to eight squares touching `square`, not including `square` itself
        ///
        /// This is where a king may step, and what an explosion on `square` reaches.
        pub const fn adjacent(square: BoardSquare) -> Self {
            reached_by(square, &BoardSquareOffset::NEIGHBORS)
        }

        /// The squares a knight on `square` jumps to
        pub const fn knight_moves(square: BoardSquare) -> Self {
            reached_by(square, &BoardSquareOffset::KNIGHT_MOVES)
        }
    }

    /// The squares strictly between two squares on the same rank or file
    ///
    /// These are the squares a rook travelling from one to the other passes over. The set is
    /// empty if the squares are neighbours or aren't in line.
    ///
    /// ```
    /// use atomic::Bitboard;
    /// use board::BoardSquare;
    /// assert_eq!(
    ///     Bitboard::rook_move_middle(BoardSquare::A5, BoardSquare::D5),
    ///     Bitboard::from(BoardSquare::B5) | BoardSquare::C5,
    /// );
    /// assert!(Bitboard::rook_move_middle(BoardSquare::A5, BoardSquare::D6).is_empty());
    /// ```
    pub const fn rook_move_middle(start: BoardSquare, end: BoardSquare) -> Self {
        match line_step(start, end) {
            Some((rank_step, file_step, steps)) if rank_step == 0 || file_step == 0 => {
                Self::interior(start, rank_step, file_step, steps)
            }
            _ => Self::empty(),
        }
    }

    /// The squares strictly between two squares on the same diagonal, or nothing if they
    /// aren't on one
    pub const fn bishop_move_middle(start: BoardSquare, end: BoardSquare) -> Self {
        match line_step(start, end) {
            Some((rank_step, file_step, steps)) if rank_step != 0 && file_step != 0 => {
                Self::interior(start, rank_step, file_step, steps)
            }
            _ => Self::empty(),
        }
    }

    const fn interior(start: BoardSquare, rank_step: i8, file_step: i8, steps: u8) -> Self {
        let mut passed = Self::empty();
        let mut square = start;
        let mut taken = 1;
        while taken < steps {
            square = square.offset(rank_step, file_step);
            passed = passed.union(Self::from_board_square(square));
            taken += 1;
        }
        passed
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether any square is in both sets
    pub const fn intersects(self, other: Self) -> bool {
        !self.intersection(other).is_empty()
    }

    /// Whether every square of `other` is also in `self`
    pub const fn contains(self, other: Self) -> bool {
        other.intersection(self.negation()).is_empty()
    }

    /// The squares in the set, a1 first, then along each rank before moving up
    ///
    /// ```
    /// use atomic::Bitboard;
    /// use board::BoardSquare;
    /// let corner: Vec<_> = Bitboard::adjacent(BoardSquare::H8).squares_iter().collect();
    /// assert_eq!(corner, [BoardSquare::G7, BoardSquare::H7, BoardSquare::G8]);
    /// ```
    pub fn squares_iter(self) -> impl Iterator<Item = BoardSquare> {
        let mut remaining = self.0;
        core::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            let bit = remaining.trailing_zeros() as u8;
            remaining &= remaining - 1;
            Some(BoardSquare::from_rank_file(bit / 8, bit % 8))
        })
    }

    /// How many squares are in the set
    pub fn num_set(self) -> u32 {
        self.0.count_ones()
    }

    // `const` forms of the operators below

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub const fn negation(self) -> Self {
        Self(!self.0)
    }
}

impl From<BoardSquare> for Bitboard {
    fn from(square: BoardSquare) -> Self {
        Self::from_board_square(square)
    }
}

impl<T: Into<Bitboard>> BitOr<T> for Bitboard {
    type Output = Self;

    fn bitor(self, rhs: T) -> Self {
        self.union(rhs.into())
    }
}

impl<T: Into<Bitboard>> BitOrAssign<T> for Bitboard {
    fn bitor_assign(&mut self, rhs: T) {
        *self = self.union(rhs.into());
    }
}

impl<T: Into<Bitboard>> BitAnd<T> for Bitboard {
    type Output = Self;

    fn bitand(self, rhs: T) -> Self {
        self.intersection(rhs.into())
    }
}

impl<T: Into<Bitboard>> BitAndAssign<T> for Bitboard {
    fn bitand_assign(&mut self, rhs: T) {
        *self = self.intersection(rhs.into());
    }
}

impl Not for Bitboard {
    type Output = Self;

    fn not(self) -> Self {
        self.negation()
    }
}

impl FromIterator<BoardSquare> for Bitboard {
    fn from_iter<I: IntoIterator<Item = BoardSquare>>(iter: I) -> Self {
        iter.into_iter().map(Self::from).fold(Self::empty(), Self::union)
    }
}

/// Lists the squares, as in `{c3, e5}`
impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.squares_iter()).finish()
    }
}

/// Draws the board with rank 8 at the top, `#` for squares in the set and `.` for the rest
///
/// ```
/// use atomic::Bitboard;
/// use board::BoardSquare;
/// let drawn = Bitboard::knight_moves(BoardSquare::A1).to_string();
/// assert_eq!(drawn.lines().nth(5), Some(".#......"));
/// assert_eq!(drawn.lines().nth(6), Some("..#....."));
/// ```
impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            let row: String = (0..8)
                .map(|file| {
                    let square = BoardSquare::from_rank_file(rank, file);
                    if self.contains(Self::from(square)) {
                        '#'
                    } else {
                        '.'
                    }
                })
                .collect();
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}
