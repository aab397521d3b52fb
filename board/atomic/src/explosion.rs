//! Atomic captures: the capturing piece, the captured piece, and every non-pawn touching the
//! capture square are all destroyed together.

use board::{BoardSquare, Color, Piece, PieceKind};
use utils::{invariant, InvariantExpect};

use crate::{Bitboard, BoardState, Result};

/// The squares an explosion centred on `center` reaches, not counting the center
///
/// Squares past the edge of the board are simply absent.
pub const fn blast_radius(center: BoardSquare) -> Bitboard {
    Bitboard::adjacent(center)
}

/// What an explosion destroyed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Explosion {
    /// The square where the capture happened
    pub center: BoardSquare,
    /// Each destroyed piece with the square it stood on, in the order they were removed: the
    /// capturing piece, the captured piece, then the caught neighbours from a1 upwards.
    pub destroyed: Vec<(BoardSquare, Piece)>,
}

impl Explosion {
    /// The squares which were emptied
    pub fn squares(&self) -> Bitboard {
        self.destroyed.iter().map(|&(square, _)| square).collect()
    }

    /// Whether the given side's king was among the destroyed pieces
    pub fn destroyed_king(&self, color: Color) -> bool {
        self.destroyed
            .iter()
            .any(|&(_, piece)| piece == Piece::new(color, PieceKind::King))
    }
}

/// Carry out the capture of whatever is on `target` by whatever is on `source`.
///
/// Both squares are cleared. Every piece in [`blast_radius`] of `target` is cleared too, unless
/// it is a pawn. Pawns are only destroyed by being the capturing or captured piece.
///
/// This does not check that the capture is legal, which is the caller's job. The board is only
/// changed if both squares are on it.
///
/// # Panics
/// If `source` and `target` are the same square, since no piece can capture itself.
pub fn resolve(
    board: &mut BoardState,
    source: BoardSquare,
    target: BoardSquare,
) -> Result<Explosion> {
    invariant!(source != target, "a piece on {source} can't capture itself");
    let mover = board.get(source)?;
    let captured = board.get(target)?;
    let caught = blast_radius(target)
        .squares_iter()
        // The mover may have started next to the target, but it is already accounted for
        .filter(|&square| square != source)
        .filter_map(|square| {
            let piece = board.get(square).ok().flatten()?;
            (piece.kind != PieceKind::Pawn).then_some((square, piece))
        });
    let destroyed: Vec<_> = [(source, mover), (target, captured)]
        .into_iter()
        .filter_map(|(square, piece)| Some((square, piece?)))
        .chain(caught)
        .collect();

    for &(square, _) in &destroyed {
        board
            .place(square, None)
            .expect_invariant("square was read from the board moments ago");
    }
    Ok(Explosion {
        center: target,
        destroyed,
    })
}
