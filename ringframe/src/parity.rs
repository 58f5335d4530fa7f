use std::ops::Mul;

/// The parity of a permutation.  `Even` permutations are made of an even number of swaps, and
/// `Odd` ones of an odd number.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Parity {
    Even = 0,
    Odd = 1,
}

impl Parity {
    /// The `Parity` of a permutation made of `num_swaps` swaps
    #[inline]
    pub fn from_number(num_swaps: usize) -> Parity {
        if num_swaps % 2 == 0 {
            Parity::Even
        } else {
            Parity::Odd
        }
    }

    /// The sign of this `Parity`, i.e. `+1` for even and `-1` for odd.
    ///
    /// ```
    /// use ringframe::Parity;
    ///
    /// assert_eq!(Parity::Even.sign(), 1);
    /// assert_eq!(Parity::Odd.sign(), -1);
    /// ```
    #[inline]
    pub fn sign(self) -> i8 {
        match self {
            Parity::Even => 1,
            Parity::Odd => -1,
        }
    }
}

impl Mul for Parity {
    type Output = Parity;

    /// Combines the parities of two permutations into the parity of their product
    fn mul(self, rhs: Parity) -> Parity {
        if self == rhs {
            Parity::Even
        } else {
            Parity::Odd
        }
    }
}
