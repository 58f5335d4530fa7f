use std::fmt::{Display, Formatter};

use number_prefix::NumberPrefix;

/// Wrapper over a [`usize`] which displays it with an SI prefix, e.g. `1234567` displays as
/// `"  1.2M"`.  Numbers smaller than 1000 are displayed as-is.  The output is always padded to
/// six characters so that columns of these line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BigNumInt(pub usize);

impl Display for BigNumInt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match NumberPrefix::decimal(self.0 as f64) {
            NumberPrefix::Standalone(n) => write!(f, "{:>6.0}", n),
            NumberPrefix::Prefixed(prefix, n) => write!(f, "{:>5.1}{}", n, prefix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BigNumInt;

    #[test]
    fn display() {
        #[track_caller]
        fn check(n: usize, exp: &str) {
            assert_eq!(BigNumInt(n).to_string(), exp);
        }

        check(0, "     0");
        check(7, "     7");
        check(999, "   999");
        check(1_000, "  1.0k");
        check(15_360, " 15.4k");
        check(2_500_000, "  2.5M");
        check(7_000_000_000, "  7.0G");
    }
}
