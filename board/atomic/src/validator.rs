//! Whether a piece may move between two squares, judged only from what is on the board now

use board::{BoardSquare, Color, Move, Piece, PieceKind};

use crate::{Bitboard, BoardState, Error, Result};

/// What the target square must hold for a move of some shape to be legal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureRule {
    /// The target may be empty or hold an enemy piece
    Allowed,
    /// The target must hold an enemy piece (a pawn's diagonal step)
    Required,
    /// The target must be empty (a pawn's push)
    Forbidden,
}

/// The geometry of a move, independent of what else is on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveShape {
    /// Squares strictly between source and target which must hold no piece
    pub vacant: Bitboard,
    pub capture: CaptureRule,
}

impl MoveShape {
    const fn new(vacant: Bitboard, capture: CaptureRule) -> Self {
        Self { vacant, capture }
    }

    /// Work out the shape of moving `piece` from `source` to `target`
    ///
    /// Returns `None` if no arrangement of other pieces could make this move legal, which
    /// includes moving onto the same square and moving from or to an invalid square.
    ///
    /// ```
    /// use atomic::{Bitboard, CaptureRule, MoveShape};
    /// use board::{BoardSquare, Color, Piece, PieceKind};
    /// let rook = Piece::new(Color::White, PieceKind::Rook);
    /// let shape = MoveShape::of(rook, BoardSquare::A1, BoardSquare::A3).unwrap();
    /// assert_eq!(shape.vacant, Bitboard::from(BoardSquare::A2));
    /// assert_eq!(shape.capture, CaptureRule::Allowed);
    /// assert!(MoveShape::of(rook, BoardSquare::A1, BoardSquare::B2).is_none());
    /// ```
    pub fn of(piece: Piece, source: BoardSquare, target: BoardSquare) -> Option<Self> {
        if !source.is_valid() || !target.is_valid() || source == target {
            return None;
        }
        let offset = source.offset_to(target);
        let (rank, file) = (offset.rank(), offset.file());
        let (rank_dist, file_dist) = (rank.unsigned_abs(), file.unsigned_abs());
        let diagonal = rank_dist == file_dist;
        let straight = rank == 0 || file == 0;
        match piece.kind {
            PieceKind::King => (offset.chebyshev_distance() == 1)
                .then_some(Self::new(Bitboard::empty(), CaptureRule::Allowed)),
            PieceKind::Knight => Bitboard::knight_moves(source)
                .contains(Bitboard::from(target))
                .then_some(Self::new(Bitboard::empty(), CaptureRule::Allowed)),
            PieceKind::Bishop => diagonal.then(|| {
                Self::new(
                    Bitboard::bishop_move_middle(source, target),
                    CaptureRule::Allowed,
                )
            }),
            PieceKind::Rook => straight.then(|| {
                Self::new(
                    Bitboard::rook_move_middle(source, target),
                    CaptureRule::Allowed,
                )
            }),
            // Break the queen down into a rook and a bishop
            PieceKind::Queen => {
                if straight {
                    Self::of(Piece { kind: PieceKind::Rook, ..piece }, source, target)
                } else if diagonal {
                    Self::of(Piece { kind: PieceKind::Bishop, ..piece }, source, target)
                } else {
                    None
                }
            }
            PieceKind::Pawn => {
                let (forward, start_rank) = pawn_direction(piece.color);
                let (source_rank, _) = source.to_rank_file()?;
                if file == 0 && rank == forward {
                    Some(Self::new(Bitboard::empty(), CaptureRule::Forbidden))
                } else if file == 0 && rank == 2 * forward && source_rank == start_rank {
                    Some(Self::new(
                        Bitboard::from(source.offset(forward, 0)),
                        CaptureRule::Forbidden,
                    ))
                } else if file_dist == 1 && rank == forward {
                    Some(Self::new(Bitboard::empty(), CaptureRule::Required))
                } else {
                    None
                }
            }
        }
    }
}

/// The rank step a pawn of this color moves by, and the rank (from zero) it starts on
const fn pawn_direction(color: Color) -> (i8, u8) {
    match color {
        Color::White => (1, 1),
        Color::Black => (-1, 6),
    }
}

/// How an accepted move changes the board
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveKind {
    /// The target is empty; the piece just moves there
    Relocation,
    /// The target holds an enemy piece
    Capture { captured: Piece },
}

/// Check if moving the piece on `source` to `target` is legal for `side_to_move` right now.
///
/// The move is legal if all of the following criteria are met:
///  1. Both squares are on the board.
///  2. A piece stands on `source`, and it belongs to `side_to_move`.
///  3. [`MoveShape::of`] returns a shape for that piece.
///  4. The target does not hold a piece of the mover's own color.
///  5. Every square in [`MoveShape::vacant`] is empty.
///  6. The target's contents satisfy [`MoveShape::capture`].
///
/// This knows nothing about whose king may capture; that is decided by the game.
pub fn validate(
    board: &BoardState,
    side_to_move: Color,
    source: BoardSquare,
    target: BoardSquare,
) -> Result<MoveKind> {
    let moving = board.get(source)?;
    let occupant = board.get(target)?;
    let Some(piece) = moving else {
        return Err(Error::SourcePieceMissing(source));
    };
    if piece.color != side_to_move {
        return Err(Error::WrongSide {
            piece,
            square: source,
        });
    }
    let mv = Move::new(source, target);
    let Some(shape) = MoveShape::of(piece, source, target) else {
        return Err(Error::MoveNeverLegal { piece, mv });
    };
    if occupant.is_some_and(|occupant| occupant.color == piece.color) {
        return Err(Error::OwnPieceAtTarget(mv));
    }
    if board.occupied().intersects(shape.vacant) {
        return Err(Error::MoveBlocked { piece, mv });
    }
    match (occupant, shape.capture) {
        (Some(_), CaptureRule::Forbidden) => Err(Error::MoveBlocked { piece, mv }),
        (Some(captured), _) => Ok(MoveKind::Capture { captured }),
        (None, CaptureRule::Required) => Err(Error::CaptureTargetMissing(mv)),
        (None, _) => Ok(MoveKind::Relocation),
    }
}

/// All the squares the piece on `source` could legally move to on its side's turn
///
/// Empty if `source` is empty or off the board.
pub fn legal_targets(board: &BoardState, source: BoardSquare) -> Bitboard {
    let Ok(Some(piece)) = board.get(source) else {
        return Bitboard::empty();
    };
    BoardSquare::all_squares()
        .filter(|&target| validate(board, piece.color, source, target).is_ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use quickcheck::{quickcheck, Arbitrary, Gen, TestResult};

    /// A board with a few pieces scattered at random, to get in the way of moves
    #[derive(Clone, Debug)]
    struct ClutteredBoard(BoardState);

    impl Arbitrary for ClutteredBoard {
        fn arbitrary(g: &mut Gen) -> Self {
            let mut board = BoardState::EMPTY;
            for square in BoardSquare::all_squares() {
                // About one square in five gets a piece
                if u8::arbitrary(g) % 5 == 0 {
                    board.place(square, Some(Piece::arbitrary(g))).unwrap();
                }
            }
            Self(board)
        }
    }

    /// Step from `source` towards `target` one square at a time, checking every square strictly
    /// between them is empty
    fn line_is_clear(board: &BoardState, source: BoardSquare, target: BoardSquare) -> bool {
        let (source_rank, source_file) = source.to_rank_file().unwrap();
        let (target_rank, target_file) = target.to_rank_file().unwrap();
        let rank_step = (target_rank as i8 - source_rank as i8).signum();
        let file_step = (target_file as i8 - source_file as i8).signum();
        let mut square = source.offset(rank_step, file_step);
        while square != target {
            if board.get(square).unwrap().is_some() {
                return false;
            }
            square = square.offset(rank_step, file_step);
        }
        true
    }

    /// Whether `piece` can move from `source` to `target`, worked out the long way
    fn oracle(board: &BoardState, piece: Piece, source: BoardSquare, target: BoardSquare) -> bool {
        let (source_rank, source_file) = source.to_rank_file().unwrap();
        let (target_rank, target_file) = target.to_rank_file().unwrap();
        let rank = target_rank as i8 - source_rank as i8;
        let file = target_file as i8 - source_file as i8;
        let occupant = board.get(target).unwrap();
        if source == target || occupant.is_some_and(|p| p.color == piece.color) {
            return false;
        }
        let diagonal = rank.abs() == file.abs();
        let straight = rank == 0 || file == 0;
        match piece.kind {
            PieceKind::King => rank.abs() <= 1 && file.abs() <= 1,
            PieceKind::Knight => {
                (rank.abs(), file.abs()) == (1, 2) || (rank.abs(), file.abs()) == (2, 1)
            }
            PieceKind::Bishop => diagonal && line_is_clear(board, source, target),
            PieceKind::Rook => straight && line_is_clear(board, source, target),
            PieceKind::Queen => (diagonal || straight) && line_is_clear(board, source, target),
            PieceKind::Pawn => {
                let forward = if piece.color == Color::White { 1 } else { -1 };
                let start = if piece.color == Color::White { 1 } else { 6 };
                if file == 0 && rank == forward {
                    occupant.is_none()
                } else if file == 0 && rank == 2 * forward && source_rank == start {
                    occupant.is_none() && line_is_clear(board, source, target)
                } else {
                    file.abs() == 1 && rank == forward && occupant.is_some()
                }
            }
        }
    }

    fn rook() -> Piece {
        Piece::new(Color::White, PieceKind::Rook)
    }

    quickcheck! {
        fn test_lone_piece_follows_geometry(piece: Piece, source: BoardSquare, target: BoardSquare) -> bool {
            let mut board = BoardState::EMPTY;
            board.place(source, Some(piece)).unwrap();
            validate(&board, piece.color, source, target).is_ok()
                == oracle(&board, piece, source, target)
        }

        fn test_matches_oracle_among_clutter(
            board: ClutteredBoard,
            piece: Piece,
            source: BoardSquare,
            target: BoardSquare
        ) -> bool {
            let mut board = board.0;
            board.place(source, Some(piece)).unwrap();
            validate(&board, piece.color, source, target).is_ok()
                == oracle(&board, piece, source, target)
        }

        fn test_wrong_side_always_rejected(board: ClutteredBoard, source: BoardSquare, target: BoardSquare) -> TestResult {
            let Some(piece) = board.0.get(source).unwrap() else {
                return TestResult::discard();
            };
            TestResult::from_bool(matches!(
                validate(&board.0, piece.color.other(), source, target),
                Err(Error::WrongSide { .. })
            ))
        }

        fn test_legal_targets_agree_with_validate(board: ClutteredBoard, source: BoardSquare) -> bool {
            let targets = legal_targets(&board.0, source);
            match board.0.get(source).unwrap() {
                None => targets.is_empty(),
                Some(piece) => BoardSquare::all_squares().all(|target| {
                    targets.contains(Bitboard::from(target))
                        == validate(&board.0, piece.color, source, target).is_ok()
                }),
            }
        }

        fn test_never_onto_own_piece(board: ClutteredBoard, source: BoardSquare, target: BoardSquare) -> TestResult {
            let (Some(piece), Some(occupant)) = (board.0.get(source).unwrap(), board.0.get(target).unwrap()) else {
                return TestResult::discard();
            };
            if piece.color != occupant.color {
                return TestResult::discard();
            }
            TestResult::from_bool(validate(&board.0, piece.color, source, target).is_err())
        }
    }

    #[test]
    fn test_empty_source() {
        let board = BoardState::initial();
        assert!(matches!(
            validate(&board, Color::White, BoardSquare::E4, BoardSquare::E5),
            Err(Error::SourcePieceMissing(BoardSquare::E4))
        ));
    }

    #[test]
    fn test_invalid_squares() {
        let board = BoardState::initial();
        assert!(matches!(
            validate(&board, Color::White, BoardSquare::E2, BoardSquare::INVALID),
            Err(Error::InvalidSquare(_))
        ));
        assert!(matches!(
            validate(&board, Color::White, BoardSquare::INVALID, BoardSquare::E4),
            Err(Error::InvalidSquare(_))
        ));
    }

    #[test]
    fn test_opening_moves() {
        let board = BoardState::initial();
        let targets = |square| legal_targets(&board, square);
        assert_eq!(
            targets(BoardSquare::E2),
            Bitboard::from(BoardSquare::E3) | BoardSquare::E4
        );
        assert_eq!(
            targets(BoardSquare::G8),
            Bitboard::from(BoardSquare::F6) | BoardSquare::H6
        );
        for boxed_in in [BoardSquare::A1, BoardSquare::C1, BoardSquare::D1, BoardSquare::E1] {
            assert!(targets(boxed_in).is_empty(), "{boxed_in} should be stuck");
        }
        assert!(matches!(
            validate(&board, Color::White, BoardSquare::A1, BoardSquare::A2),
            Err(Error::OwnPieceAtTarget(_))
        ));
        assert!(matches!(
            validate(&board, Color::White, BoardSquare::A1, BoardSquare::A3),
            Err(Error::MoveBlocked { .. })
        ));
    }

    #[test]
    fn test_pawn_rules() {
        let mut board = BoardState::EMPTY;
        let white_pawn = Piece::new(Color::White, PieceKind::Pawn);
        let black_pawn = Piece::new(Color::Black, PieceKind::Pawn);
        board.place(BoardSquare::D2, Some(white_pawn)).unwrap();
        board.place(BoardSquare::D3, Some(black_pawn)).unwrap();
        board.place(BoardSquare::E3, Some(black_pawn)).unwrap();
        board.place(BoardSquare::F4, Some(white_pawn)).unwrap();

        // Straight pushes can't take anything, nor jump the blocker
        assert!(matches!(
            validate(&board, Color::White, BoardSquare::D2, BoardSquare::D3),
            Err(Error::MoveBlocked { .. })
        ));
        assert!(matches!(
            validate(&board, Color::White, BoardSquare::D2, BoardSquare::D4),
            Err(Error::MoveBlocked { .. })
        ));
        assert_eq!(
            validate(&board, Color::White, BoardSquare::D2, BoardSquare::E3).unwrap(),
            MoveKind::Capture { captured: black_pawn }
        );
        assert!(matches!(
            validate(&board, Color::White, BoardSquare::D2, BoardSquare::C3),
            Err(Error::CaptureTargetMissing(_))
        ));
        // Only from the starting rank may a pawn move two squares
        assert!(matches!(
            validate(&board, Color::White, BoardSquare::F4, BoardSquare::F6),
            Err(Error::MoveNeverLegal { .. })
        ));
        // Black moves down the board
        assert_eq!(
            validate(&board, Color::Black, BoardSquare::E3, BoardSquare::F2).unwrap_err().to_string(),
            "attempted to capture on f2, but no piece there to be captured",
        );
        assert_eq!(
            validate(&board, Color::Black, BoardSquare::E3, BoardSquare::D2).unwrap(),
            MoveKind::Capture { captured: white_pawn }
        );
        assert!(validate(&board, Color::Black, BoardSquare::E3, BoardSquare::E4).is_err());
        assert_eq!(
            validate(&board, Color::Black, BoardSquare::E3, BoardSquare::E2).unwrap(),
            MoveKind::Relocation
        );
    }

    #[test]
    fn test_sliders_stop_at_blockers() {
        let mut board = BoardState::EMPTY;
        board.place(BoardSquare::A1, Some(rook())).unwrap();
        board
            .place(BoardSquare::A5, Some(Piece::new(Color::Black, PieceKind::Knight)))
            .unwrap();
        let targets = legal_targets(&board, BoardSquare::A1);
        assert!(
            targets.contains(Bitboard::from(BoardSquare::A5)),
            "rook can't take the blocker:\n{targets}"
        );
        assert!(
            !targets.contains(Bitboard::from(BoardSquare::A6)),
            "rook jumped the blocker:\n{targets}"
        );
        assert!(targets.contains(Bitboard::from(BoardSquare::H1)), "{targets}");
        assert_eq!(targets.num_set(), 4 + 7, "wrong targets:\n{targets}");
    }

    #[test]
    fn test_null_move_illegal() {
        for piece in Piece::all_pieces() {
            assert!(MoveShape::of(piece, BoardSquare::D4, BoardSquare::D4).is_none());
        }
    }
}
