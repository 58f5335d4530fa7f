use crate::{Row, RowBuf, Stage};

/// Multiplies many [`Row`]s together, whilst reusing the same two allocations.
#[derive(Debug, Clone)]
pub struct RowAccumulator {
    total: RowBuf,
    temp_row: RowBuf,
}

impl RowAccumulator {
    /// Creates a `RowAccumulator` with an accumulated value of [rounds](RowBuf::rounds)
    #[inline]
    pub fn rounds(stage: Stage) -> Self {
        Self::new(RowBuf::rounds(stage))
    }

    /// Creates a `RowAccumulator` with a given accumulated value
    #[inline]
    pub fn new(total: RowBuf) -> Self {
        Self {
            temp_row: RowBuf::rounds(total.stage()),
            total,
        }
    }

    /// Performs `self = self * row`
    #[inline]
    #[track_caller]
    pub fn post_accumulate(&mut self, row: &Row) {
        self.total.mul_into(row, &mut self.temp_row);
        std::mem::swap(&mut self.total, &mut self.temp_row);
    }

    /// Performs `self = self * row`, without checking that the stages match.
    ///
    /// # Safety
    ///
    /// This is safe if `row.stage() == self.total().stage()`.
    #[inline]
    pub unsafe fn post_accumulate_unchecked(&mut self, row: &Row) {
        self.total.mul_into_unchecked(row, &mut self.temp_row);
        std::mem::swap(&mut self.total, &mut self.temp_row);
    }

    /// Gets the accumulated value of `self`
    #[inline]
    pub fn total(&self) -> &Row {
        &self.total
    }

    /// Gets the accumulated value, consuming `self`
    #[inline]
    pub fn into_total(self) -> RowBuf {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::RowAccumulator;
    use crate::{RowBuf, Stage};

    #[test]
    fn accumulate() {
        let lh = RowBuf::pblh(Stage::MAJOR, 1);
        let mut acc = RowAccumulator::rounds(Stage::MAJOR);
        for _ in 0..7 {
            acc.post_accumulate(&lh);
        }
        assert!(acc.total().is_rounds());
        acc.post_accumulate(&lh);
        assert_eq!(acc.into_total(), lh);
    }
}
