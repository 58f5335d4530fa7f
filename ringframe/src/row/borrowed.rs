use std::{
    fmt::{Debug, Display, Formatter, Write},
    ops::{Div, Index, Mul, MulAssign, Not},
};

use gcd::Gcd;

use crate::{Bell, IncompatibleStages, Parity, RowBuf, Stage};

use super::RowAccumulator;

pub type BellIter<'a> = std::iter::Copied<std::slice::Iter<'a, Bell>>;

/// A borrowed `Row` of [`Bell`]s.
///
/// This can be viewed as a permutation of [rounds](RowBuf::rounds) on a given [`Stage`].
///
/// `Row`s and [`RowBuf`]s must always be valid permutations - i.e. they must contain every
/// [`Bell`] up to their [`Stage`] once and precisely once.  This is only checked in the
/// constructors and then used as assumed knowledge to avoid further checks.  This is similar to
/// how [`&str`](str) and [`String`] are required to be valid UTF-8.
///
/// # Example
/// ```
/// use ringframe::{Bell, RowBuf, Stage, InvalidRowError};
///
/// // Create rounds on 8 bells.  Rounds is always valid on any `Stage`
/// let rounds_on_8 = RowBuf::rounds(Stage::MAJOR);
/// assert_eq!(rounds_on_8.stage(), Stage::MAJOR);
/// assert_eq!(rounds_on_8.to_string(), "12345678");
///
/// // Parse a row from a string
/// let queens = RowBuf::parse("1357924680")?;
/// assert_eq!(queens.stage(), Stage::ROYAL);
/// assert_eq!(queens, RowBuf::queens(Stage::ROYAL));
///
/// // If we try to parse an invalid `Row`, we get an error.  This means
/// // that we can assume that all `Row`s are valid permutations
/// assert_eq!(
///     RowBuf::parse("112345").unwrap_err().reason,
///     InvalidRowError::DuplicateBell(Bell::from_name('1').unwrap())
/// );
/// #
/// # Ok::<(), ringframe::InvalidPermutation>(())
/// ```
#[derive(Eq, PartialEq, PartialOrd, Ord, Hash)]
#[repr(transparent)] // Required so we can safely cast between &[Bell] and &Row
pub struct Row {
    /// The [`Bell`]s in the order that they would be rung.  Because of the 'valid row' invariant,
    /// this can't contain duplicate [`Bell`]s or any [`Bell`]s with number greater than the
    /// [`Stage`] of this `Row`.
    bell_slice: [Bell],
}

impl Row {
    /// Returns the [`Stage`] of this `Row`.
    ///
    /// # Example
    /// ```
    /// use ringframe::{RowBuf, Stage};
    ///
    /// assert_eq!(RowBuf::rounds(Stage::MINIMUS).stage(), Stage::MINIMUS);
    /// assert_eq!(RowBuf::parse("41325")?.stage(), Stage::DOUBLES);
    /// # Ok::<(), ringframe::InvalidPermutation>(())
    /// ```
    #[inline]
    pub fn stage(&self) -> Stage {
        Stage::new(self.bell_slice.len() as u8)
    }

    /// Returns the underlying slice of [`Bell`]s.
    #[inline]
    pub fn bells(&self) -> &[Bell] {
        &self.bell_slice
    }

    /// Returns an iterator over the [`Bell`]s in this `Row`.
    #[inline]
    pub fn bell_iter(&self) -> BellIter {
        self.bell_slice.iter().copied()
    }

    /// Gets the **0-indexed** place at which a given [`Bell`] appears in this `Row`, returning
    /// `None` if the [`Bell`] is out of the stage.  This performs a linear search of the `Row`.
    ///
    /// # Example
    /// ```
    /// use ringframe::{Bell, RowBuf};
    ///
    /// let titums = RowBuf::parse("15263748")?;
    /// assert_eq!(titums.place_of(Bell::from_name('1').unwrap()), Some(0));
    /// assert_eq!(titums.place_of(Bell::from_name('5').unwrap()), Some(1));
    /// assert_eq!(titums.place_of(Bell::from_name('9').unwrap()), None);
    /// # Ok::<(), ringframe::InvalidPermutation>(())
    /// ```
    #[inline]
    pub fn place_of(&self, bell: Bell) -> Option<usize> {
        // `Bell` is a transparent `u8`, so rows can be searched as bytes
        memchr::memchr(bell.index_u8(), self.bytes())
    }

    /// The [`Bell`]s of this `Row`, as their indices
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.bells())
    }

    /// Perform an in-place check that this `Row` is equal to rounds.  `x.is_rounds()` is an
    /// optimised version of `x == RowBuf::rounds(x.stage())`.
    ///
    /// # Example
    /// ```
    /// use ringframe::{RowBuf, Stage};
    ///
    /// assert!(RowBuf::rounds(Stage::MAXIMUS).is_rounds());
    /// assert!(!RowBuf::parse("18423756")?.is_rounds());
    /// # Ok::<(), ringframe::InvalidPermutation>(())
    /// ```
    pub fn is_rounds(&self) -> bool {
        self.bell_iter().enumerate().all(|(i, b)| b.index() == i)
    }

    /// Perform an in-place check that this `Row` is equal to [backrounds](RowBuf::backrounds).
    pub fn is_backrounds(&self) -> bool {
        self.bell_iter()
            .rev() // Assert that the bells are in reverse order
            .enumerate()
            .all(|(i, b)| b.index() == i)
    }

    /// Swap two [`Bell`]s round in this `Row`, panicking if either of the indices point out of
    /// bounds.
    ///
    /// # Example
    /// ```
    /// use ringframe::{RowBuf, Stage};
    ///
    /// let mut rounds = RowBuf::rounds(Stage::MAJOR);
    /// rounds.swap(0, 1); // Note we are using 0-indexing
    /// assert_eq!(rounds.to_string(), "21345678");
    /// rounds.swap(2, 5);
    /// assert_eq!(rounds.to_string(), "21645378");
    /// ```
    #[inline]
    pub fn swap(&mut self, a: usize, b: usize) {
        self.bell_slice.swap(a, b);
    }

    /// Returns the [`Parity`] of this `Row`, computed from its cycle decomposition (a cycle of
    /// length `l` is made of `l - 1` swaps).
    ///
    /// # Example
    /// ```
    /// use ringframe::{Parity, RowBuf, Stage};
    ///
    /// assert_eq!(RowBuf::rounds(Stage::MAJOR).parity(), Parity::Even);
    /// assert_eq!(RowBuf::parse("2134")?.parity(), Parity::Odd);
    /// assert_eq!(RowBuf::parse("2314")?.parity(), Parity::Even);
    /// # Ok::<(), ringframe::InvalidPermutation>(())
    /// ```
    pub fn parity(&self) -> Parity {
        let num_swaps: usize = self.cycle_lengths().map(|l| l - 1).sum();
        Parity::from_number(num_swaps)
    }

    /// Returns the sign of this `Row` as a permutation (`+1` if even, `-1` if odd)
    #[inline]
    pub fn sign(&self) -> i8 {
        self.parity().sign()
    }

    /* PERMUTATION ARITHMETIC */

    /// Multiply two `Row`s (i.e. use the RHS to permute the LHS), checking that the [`Stage`]s are
    /// compatible.  `(a * b)[i] = a[b[i]]`.  This is like using the `*` operator, except that this
    /// returns a [`Result`] instead of [`panic!`]ing when the [`Stage`]s don't match.
    ///
    /// # Example
    /// ```
    /// use ringframe::RowBuf;
    ///
    /// assert_eq!(
    ///     RowBuf::parse("13425678")?.try_mul(&RowBuf::parse("43217568")?),
    ///     Ok(RowBuf::parse("24317568")?)
    /// );
    /// assert_eq!(
    ///     RowBuf::parse("13425678")?
    ///         .try_mul(&RowBuf::parse("4321")?)
    ///         .unwrap_err()
    ///         .to_string(),
    ///     "Can't combine Major (left) with Minimus (right)"
    /// );
    /// # Ok::<(), ringframe::InvalidPermutation>(())
    /// ```
    pub fn try_mul(&self, rhs: &Self) -> Result<RowBuf, IncompatibleStages> {
        IncompatibleStages::check(self.stage(), rhs.stage())?;
        // This unsafety is OK because the `self` and `rhs` are both assumed to be valid, and we
        // have already checked that their stages are equal
        Ok(unsafe { self.mul_unchecked(rhs) })
    }

    /// Multiply two `Row`s without checking that the [`Stage`]s are compatible.
    ///
    /// # Safety
    ///
    /// This is safe if the two `Row`s have the same [`Stage`].
    pub unsafe fn mul_unchecked(&self, rhs: &Row) -> RowBuf {
        // If two Rows are valid and share a Stage, then so is their product
        RowBuf::from_bell_iter_unchecked(rhs.bell_iter().map(|b| self.bell_slice[b.index()]))
    }

    /// Multiply two `Row`s, storing the result in an existing [`RowBuf`].  This will change the
    /// [`Stage`] of the output [`RowBuf`] if needed.
    #[track_caller]
    pub fn mul_into(&self, rhs: &Row, out: &mut RowBuf) {
        self.check_stage(rhs);
        // This unsafety is OK because we've just checked that the stages match
        unsafe { self.mul_into_unchecked(rhs, out) }
    }

    /// Multiply two `Row`s, storing the result in an existing [`RowBuf`].
    ///
    /// # Safety
    ///
    /// This function is safe if `self` and `rhs` have the same stage
    pub unsafe fn mul_into_unchecked(&self, rhs: &Row, out: &mut RowBuf) {
        out.bell_vec.clear();
        out.bell_vec
            .extend(rhs.bell_iter().map(|b| self.bell_slice[b.index()]));
    }

    /// Find the inverse of a `Row`.  If `X` is the input `Row`, and `Y = X.inv()`, then `XY = YX =
    /// I` where `I` is the identity on the same stage as `X` (i.e. rounds).  This operation cannot
    /// fail, since all valid `Row`s have an inverse.  This is equivalent to using the `!` operator.
    ///
    /// # Example
    /// ```
    /// use ringframe::{RowBuf, Stage};
    ///
    /// // The inverse of Queens is Titums
    /// assert_eq!(RowBuf::queens(Stage::MINOR).inv(), RowBuf::titums(Stage::MINOR));
    /// // Backrounds is self-inverse
    /// assert_eq!(!RowBuf::backrounds(Stage::MAJOR), RowBuf::backrounds(Stage::MAJOR));
    /// assert_eq!(!&*RowBuf::parse("1342")?, RowBuf::parse("1423")?);
    /// # Ok::<(), ringframe::InvalidPermutation>(())
    /// ```
    pub fn inv(&self) -> RowBuf {
        let mut inv_bells = vec![Bell::TREBLE; self.stage().num_bells()];
        for (i, b) in self.bell_slice.iter().enumerate() {
            inv_bells[b.index()] = Bell::from_index(i as u8);
        }
        // This unsafety is OK because the inverse of a permutation is a permutation
        unsafe { RowBuf::from_vec_unchecked(inv_bells) }
    }

    /// Multiplies `self` by the inverse of `rhs`, checking that the [`Stage`]s match.  This is the
    /// fallible version of the `/` operator.
    pub fn try_div(&self, rhs: &Self) -> Result<RowBuf, IncompatibleStages> {
        self.try_mul(&rhs.inv())
    }

    /// Raises `self` to some positive `exponent`
    pub fn pow_u(&self, exponent: usize) -> RowBuf {
        let mut accumulator = RowAccumulator::rounds(self.stage());
        for _ in 0..exponent {
            // SAFETY: the accumulator has the same stage as `self`
            unsafe { accumulator.post_accumulate_unchecked(self) };
        }
        accumulator.into_total()
    }

    /* CYCLES */

    /// Iterates over the disjoint cycles of this `Row` (following `i -> self[i]`), each as a
    /// [`Vec`] of 0-indexed places starting at its smallest element.  Cycles are returned in
    /// increasing order of their first element, and fixed [`Bell`]s are cycles of length 1.
    pub fn cycles(&self) -> Vec<Vec<usize>> {
        let mut visited = vec![false; self.bell_slice.len()];
        let mut cycles = Vec::new();
        for start in 0..self.bell_slice.len() {
            if visited[start] {
                continue;
            }
            let mut cycle = Vec::new();
            let mut i = start;
            while !visited[i] {
                visited[i] = true;
                cycle.push(i);
                i = self.bell_slice[i].index();
            }
            cycles.push(cycle);
        }
        cycles
    }

    /// The lengths of the disjoint cycles of this `Row`, in the same order as [`Row::cycles`].
    pub fn cycle_lengths(&self) -> impl Iterator<Item = usize> {
        self.cycles().into_iter().map(|c| c.len())
    }

    /// Writes the cycle decomposition of this `Row` using bell names.
    ///
    /// # Example
    /// ```
    /// use ringframe::RowBuf;
    ///
    /// assert_eq!(RowBuf::parse("13527486")?.cycle_string(), "(1)(2357864)");
    /// assert_eq!(RowBuf::parse("2143")?.cycle_string(), "(12)(34)");
    /// assert_eq!(RowBuf::parse("123")?.cycle_string(), "(1)(2)(3)");
    /// # Ok::<(), ringframe::InvalidPermutation>(())
    /// ```
    pub fn cycle_string(&self) -> String {
        let mut s = String::new();
        for cycle in self.cycles() {
            s.push('(');
            for i in cycle {
                s.push(Bell::from_index(i as u8).name());
            }
            s.push(')');
        }
        s
    }

    /// Gets the smallest non-zero number `n` such that `self.pow_u(n).is_rounds()`.  This is the
    /// lowest common multiple of the lengths of the cycles.
    ///
    /// # Example
    /// ```
    /// use ringframe::{RowBuf, Stage};
    ///
    /// assert_eq!(RowBuf::rounds(Stage::MAJOR).order(), 1);
    /// assert_eq!(RowBuf::pblh(Stage::MAJOR, 1).order(), 7);
    /// assert_eq!(RowBuf::parse("23154")?.order(), 6);
    /// # Ok::<(), ringframe::InvalidPermutation>(())
    /// ```
    pub fn order(&self) -> usize {
        self.cycle_lengths()
            .fold(1, |lcm, len| lcm / lcm.gcd(len) * len)
    }

    /// Generate all the `Row`s formed by repeatedly permuting a given `Row`.  The first item
    /// returned will always be the input `Row`, and the last will always be `rounds`.
    ///
    /// # Example
    /// ```
    /// use ringframe::RowBuf;
    ///
    /// assert_eq!(
    ///     RowBuf::parse("1342")?.closure(),
    ///     vec![RowBuf::parse("1342")?, RowBuf::parse("1423")?, RowBuf::parse("1234")?]
    /// );
    /// # Ok::<(), ringframe::InvalidPermutation>(())
    /// ```
    pub fn closure(&self) -> Vec<RowBuf> {
        let mut closure = Vec::new();
        let mut row = self.to_owned();
        loop {
            let is_rounds = row.is_rounds();
            // This unsafety is OK, because `row` and `self` have the same Stage
            let next_row = unsafe { row.mul_unchecked(self) };
            closure.push(row);
            if is_rounds {
                return closure;
            }
            row = next_row;
        }
    }

    /// If this `Row` is a power of the [Plain Bob lead head](RowBuf::pblh) with `hunts` hunt
    /// bells, returns that power (between `0` and the order of the lead head).
    ///
    /// # Example
    /// ```
    /// use ringframe::{RowBuf, Stage};
    ///
    /// assert_eq!(RowBuf::rounds(Stage::MAJOR).pblh_index(1), Some(0));
    /// assert_eq!(RowBuf::parse("13527486")?.pblh_index(1), Some(1));
    /// assert_eq!(RowBuf::parse("15738264")?.pblh_index(1), Some(2));
    /// assert_eq!(RowBuf::parse("12436587")?.pblh_index(1), None);
    /// # Ok::<(), ringframe::InvalidPermutation>(())
    /// ```
    pub fn pblh_index(&self, hunts: usize) -> Option<usize> {
        let lead_head = RowBuf::pblh(self.stage(), hunts);
        lead_head
            .closure()
            .iter()
            .position(|r| r.as_row() == self)
            // `closure` ends with rounds, which is power 0
            .map(|idx| (idx + 1) % lead_head.order())
    }

    /// Creates a `&Row` from a `&[Bell]`, **without** checking that that slice forms a valid
    /// [`Row`].
    ///
    /// # Safety
    ///
    /// This is safe if the [`Bell`]s in `slice` are a valid permutation.
    #[inline]
    pub unsafe fn from_slice_unchecked(slice: &[Bell]) -> &Row {
        // The unsafe pointer cast here is OK, because Row is a `#[repr(transparent)]` wrapper
        // around slices of `Bell`s and the pointer cast doesn't change the lifetime of the
        // underlying data.
        &*(slice as *const [Bell] as *const Row)
    }

    /// Creates a `&mut Row` from a `&mut [Bell]`, **without** checking that the slice forms a
    /// valid [`Row`].
    ///
    /// # Safety
    ///
    /// This is safe if the [`Bell`]s in `slice` are a valid permutation.
    #[inline]
    pub unsafe fn from_mut_slice_unchecked(slice: &mut [Bell]) -> &mut Row {
        &mut *(slice as *mut [Bell] as *mut Row)
    }

    #[track_caller]
    fn check_stage(&self, row: &Row) {
        assert_eq!(
            self.stage(),
            row.stage(),
            "Stage mismatch: LHS has stage {:?} but RHS has stage {:?}",
            self.stage(),
            row.stage(),
        );
    }
}

impl Index<usize> for Row {
    type Output = Bell;

    /// `row[n]` gets the `n`th bell in `row` (0-indexed).
    ///
    /// # Panics
    ///
    /// Panics if `n >= row.stage().num_bells()`
    fn index(&self, index: usize) -> &Bell {
        &self.bell_slice[index]
    }
}

impl Not for &Row {
    type Output = RowBuf;

    /// Find the inverse of a [`Row`].  Equivalent to [`Row::inv`].
    fn not(self) -> Self::Output {
        self.inv()
    }
}

impl Not for &RowBuf {
    type Output = RowBuf;

    fn not(self) -> Self::Output {
        self.inv()
    }
}

impl Not for RowBuf {
    type Output = RowBuf;

    fn not(self) -> Self::Output {
        self.inv()
    }
}

impl Mul for &Row {
    type Output = RowBuf;

    /// Uses the RHS to permute the LHS without consuming either argument.
    ///
    /// # Example
    /// ```
    /// use ringframe::RowBuf;
    ///
    /// assert_eq!(
    ///     &RowBuf::parse("13425678")? * &RowBuf::parse("43217568")?,
    ///     RowBuf::parse("24317568")?
    /// );
    /// # Ok::<(), ringframe::InvalidPermutation>(())
    /// ```
    ///
    /// ```should_panic
    /// use ringframe::RowBuf;
    ///
    /// // Multiplying two Rows of different Stages will panic rather than
    /// // produce undefined behaviour
    /// let _unrow = &*RowBuf::parse("13425678")? * &*RowBuf::parse("4321")?;
    /// # Ok::<(), ringframe::InvalidPermutation>(())
    /// ```
    #[inline]
    #[track_caller]
    fn mul(self, rhs: &Row) -> Self::Output {
        match self.try_mul(rhs) {
            Ok(row) => row,
            Err(e) => panic!("{}", e),
        }
    }
}

impl Div for &Row {
    type Output = RowBuf;

    /// Multiplies the LHS by the inverse of the RHS, so that `(a / b) * b == a`.
    ///
    /// # Example
    /// ```
    /// use ringframe::RowBuf;
    ///
    /// let a = RowBuf::parse("13527486")?;
    /// let b = RowBuf::parse("15738264")?;
    /// assert_eq!(&(&a / &b) * &b, a);
    /// # Ok::<(), ringframe::InvalidPermutation>(())
    /// ```
    #[inline]
    #[track_caller]
    fn div(self, rhs: &Row) -> Self::Output {
        match self.try_div(rhs) {
            Ok(row) => row,
            Err(e) => panic!("{}", e),
        }
    }
}

macro_rules! op_impl {
    ($trait: ident, $method: ident, $lhs: ty, $rhs: ty) => {
        impl $trait<$rhs> for $lhs {
            type Output = RowBuf;

            #[inline]
            #[track_caller]
            fn $method(self, rhs: $rhs) -> Self::Output {
                $trait::$method(AsRef::<Row>::as_ref(&self), AsRef::<Row>::as_ref(&rhs))
            }
        }
    };
}

// Add impls for every pair within `RowBuf`, `&RowBuf` and `&Row` (except `&Row op &Row`, which
// are implemented explicitly above)
op_impl!(Mul, mul, RowBuf, RowBuf);
op_impl!(Mul, mul, RowBuf, &RowBuf);
op_impl!(Mul, mul, RowBuf, &Row);
op_impl!(Mul, mul, &RowBuf, RowBuf);
op_impl!(Mul, mul, &RowBuf, &RowBuf);
op_impl!(Mul, mul, &RowBuf, &Row);
op_impl!(Mul, mul, &Row, RowBuf);
op_impl!(Mul, mul, &Row, &RowBuf);
op_impl!(Div, div, RowBuf, RowBuf);
op_impl!(Div, div, RowBuf, &RowBuf);
op_impl!(Div, div, RowBuf, &Row);
op_impl!(Div, div, &RowBuf, RowBuf);
op_impl!(Div, div, &RowBuf, &RowBuf);
op_impl!(Div, div, &RowBuf, &Row);
op_impl!(Div, div, &Row, RowBuf);
op_impl!(Div, div, &Row, &RowBuf);

impl AsRef<Row> for Row {
    #[inline]
    fn as_ref(&self) -> &Row {
        self
    }
}

impl MulAssign<&Row> for RowBuf {
    #[track_caller]
    fn mul_assign(&mut self, rhs: &Row) {
        *self = &*self * rhs;
    }
}

impl MulAssign<&RowBuf> for RowBuf {
    #[track_caller]
    fn mul_assign(&mut self, rhs: &RowBuf) {
        *self *= rhs.as_row();
    }
}

impl<'row> IntoIterator for &'row Row {
    type Item = Bell;
    type IntoIter = BellIter<'row>;

    fn into_iter(self) -> Self::IntoIter {
        self.bell_iter()
    }
}

////////////////
// FORMATTING //
////////////////

impl Debug for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Row({})", self)
    }
}

impl Display for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for b in self.bell_iter() {
            f.write_char(b.name())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use crate::{Parity, RowBuf, Stage};

    #[test]
    fn order() {
        #[track_caller]
        fn check(row: &str, exp_order: usize) {
            assert_eq!(RowBuf::parse(row).unwrap().order(), exp_order);
        }

        check("1", 1);
        check("1234", 1);
        check("123456789", 1);
        check("21", 2);
        check("2134", 2);
        check("2143", 2);
        check("23145", 3);
        check("23451", 5);
        check("23154", 6);
        check("231564", 3);
        check("1452367890", 2);
    }

    #[test]
    fn cycles() {
        #[track_caller]
        fn check(row: &str, exp: &str) {
            assert_eq!(RowBuf::parse(row).unwrap().cycle_string(), exp);
        }

        check("1", "(1)");
        check("21", "(12)");
        check("13527486", "(1)(2357864)");
        check("135264", "(1)(23564)");
        check("87654321", "(18)(27)(36)(45)");
        check("23451", "(12345)");
        check("51234", "(15432)");
    }

    #[test]
    fn named_row_parities() {
        #[track_caller]
        fn check(row: RowBuf, exp: Parity) {
            assert_eq!(row.parity(), exp, "{}", row);
        }

        check(RowBuf::rounds(Stage::ROYAL), Parity::Even);
        check(RowBuf::backrounds(Stage::MINIMUS), Parity::Even);
        check(RowBuf::backrounds(Stage::MINOR), Parity::Odd);
        check(RowBuf::pblh(Stage::MAJOR, 1), Parity::Even);
        check(RowBuf::queens(Stage::MINOR), Parity::Odd);
    }

    #[test]
    fn closure_and_pblh_index() {
        let lh = RowBuf::pblh(Stage::MINOR, 1);
        let closure = lh.closure();
        assert_eq!(closure.len(), 5);
        assert!(closure.last().unwrap().is_rounds());
        for (i, r) in closure.iter().enumerate() {
            assert_eq!(r.pblh_index(1), Some((i + 1) % 5));
        }
        assert_eq!(RowBuf::parse("214365").unwrap().pblh_index(1), None);
    }

    #[test]
    #[should_panic]
    fn mul_stage_mismatch() {
        let _ = RowBuf::rounds(Stage::MAJOR) * RowBuf::rounds(Stage::MINOR);
    }

    #[quickcheck]
    fn rounds_is_identity(r: RowBuf) -> bool {
        let rounds = RowBuf::rounds(r.stage());
        &rounds * &r == r && &r * &rounds == r
    }

    #[quickcheck]
    fn inverse(r: RowBuf) -> bool {
        let rounds = RowBuf::rounds(r.stage());
        &r * !&r == rounds && !&r * &r == rounds
    }

    #[quickcheck]
    fn associativity(a: RowBuf, b: RowBuf, c: RowBuf) -> bool {
        // Bring every row up to the same stage
        let stage = a.stage().max(b.stage()).max(c.stage());
        let mut rows = [a, b, c];
        for r in &mut rows {
            r.extend_to_stage(stage);
        }
        let [a, b, c] = rows;
        (&a * &b) * &c == &a * (&b * &c)
    }

    #[quickcheck]
    fn division(a: RowBuf, b: RowBuf) -> bool {
        let stage = a.stage().max(b.stage());
        let (mut a, mut b) = (a, b);
        a.extend_to_stage(stage);
        b.extend_to_stage(stage);
        &(&a / &b) * &b == a
    }

    #[quickcheck]
    fn order_matches_closure(r: RowBuf) -> bool {
        let order = r.order();
        r.closure().len() == order && r.pow_u(order).is_rounds()
    }

    #[quickcheck]
    fn parity_is_homomorphism(a: RowBuf, b: RowBuf) -> bool {
        let stage = a.stage().max(b.stage());
        let (mut a, mut b) = (a, b);
        a.extend_to_stage(stage);
        b.extend_to_stage(stage);
        (&a * &b).parity() == a.parity() * b.parity()
    }
}
