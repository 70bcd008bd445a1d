/// Inclusive integer interval; `lower <= upper` always holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    lower: i32,
    upper: i32,
}

impl Range {
    /// Create a range, swapping the bounds if they arrive reversed
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            lower: a.min(b),
            upper: a.max(b),
        }
    }

    /// Lower bound (inclusive)
    pub fn lower(&self) -> i32 {
        self.lower
    }

    /// Upper bound (inclusive)
    pub fn upper(&self) -> i32 {
        self.upper
    }

    /// Check if `value` lies inside the range
    pub fn contains(&self, value: i32) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Number of integers covered
    pub fn len(&self) -> usize {
        (self.upper - self.lower) as usize + 1
    }

    /// Always false; a range holds at least one value
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Move the lower bound down by `below` and the upper bound up by `above`
    pub fn widen(&self, below: i32, above: i32) -> Self {
        Self::new(self.lower - below, self.upper + above)
    }

    /// Every integer in the range, ascending
    pub fn values(&self) -> std::ops::RangeInclusive<i32> {
        self.lower..=self.upper
    }
}
