//! Assertions for conditions no caller input can ever break.
//!
//! These are for programmer errors only. A breach panics in every build profile, because
//! continuing past one would silently corrupt a game.

/// Assert that the given condition holds.
///
/// Unlike [`debug_assert`], this is checked with and without debug assertions.
///
/// ```should_panic
/// utils::invariant!(1 + 1 == 3, "arithmetic broke");
/// ```
#[macro_export]
macro_rules! invariant {
    ($cond:expr $(,)?) => {
        if !$cond {
            ::core::panic!(
                "invariant violated: {}",
                ::core::stringify!($cond)
            )
        }
    };
    ($cond:expr, $( $tt:tt )+) => {
        if !$cond {
            ::core::panic!($( $tt )+)
        }
    };
}

/// A type which can be unwrapped on the assumption that an invariant holds
pub trait InvariantExpect {
    /// The type which we expect to produce
    type Target;

    /// Produce the [`Self::Target`] value, or panic naming the broken invariant.
    fn expect_invariant(self, msg: &str) -> Self::Target;
}

impl<T> InvariantExpect for Option<T> {
    type Target = T;

    #[inline]
    #[track_caller]
    fn expect_invariant(self, msg: &str) -> Self::Target {
        match self {
            Some(value) => value,
            None => panic!("invariant violated: {msg}"),
        }
    }
}

impl<T, E: core::fmt::Debug> InvariantExpect for Result<T, E> {
    type Target = T;

    #[inline]
    #[track_caller]
    fn expect_invariant(self, msg: &str) -> Self::Target {
        match self {
            Ok(value) => value,
            Err(e) => panic!("invariant violated: {msg}: {e:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holding_invariants_pass_through() {
        invariant!(true);
        invariant!(2 > 1, "ordering broke: {}", 2);
        assert_eq!(Some(3).expect_invariant("present"), 3);
        assert_eq!(Ok::<_, ()>(4).expect_invariant("present"), 4);
    }

    #[test]
    #[should_panic(expected = "invariant violated: missing")]
    fn test_missing_option_panics() {
        None::<u8>.expect_invariant("missing");
    }

    #[test]
    #[should_panic(expected = "invariant violated: false")]
    fn test_failed_condition_names_itself() {
        invariant!(false);
    }
}
