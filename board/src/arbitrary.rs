//! [`quickcheck::Arbitrary`] implementations, for property tests here and in engine crates

use quickcheck::{Arbitrary, Gen};

use crate::{BoardSquare, Color, Move, Piece, PieceKind};

/// Always produces a valid square
impl Arbitrary for BoardSquare {
    fn arbitrary(g: &mut Gen) -> Self {
        let idx = u8::arbitrary(g) & 0x3F;
        Self::from_rank_file(idx >> 3, idx & 0x07)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        // Shrink towards a1, along the rank and then along the file
        let Some((rank, file)) = self.to_rank_file() else {
            return quickcheck::empty_shrinker();
        };
        Box::new(
            (0..rank)
                .map(move |rank| Self::from_rank_file(rank, file))
                .chain((0..file).map(move |file| Self::from_rank_file(0, file))),
        )
    }
}

impl Arbitrary for Color {
    fn arbitrary(g: &mut Gen) -> Self {
        if bool::arbitrary(g) {
            Color::White
        } else {
            Color::Black
        }
    }
}

impl Arbitrary for PieceKind {
    fn arbitrary(g: &mut Gen) -> Self {
        *g.choose(&PieceKind::KINDS).unwrap_or(&PieceKind::Pawn)
    }
}

impl Arbitrary for Piece {
    fn arbitrary(g: &mut Gen) -> Self {
        Self {
            kind: PieceKind::arbitrary(g),
            color: Color::arbitrary(g),
        }
    }
}

impl Arbitrary for Move {
    fn arbitrary(g: &mut Gen) -> Self {
        Self {
            source: BoardSquare::arbitrary(g),
            target: BoardSquare::arbitrary(g),
        }
    }
}
