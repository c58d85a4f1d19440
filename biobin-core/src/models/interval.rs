// https://github.com/sstadick/rust-lapper/blob/7e3904daed85181f1faa39b15f51935f13945976/src/lib.rs#L92
use num_traits::{PrimInt, Unsigned, identities::one};
use std::cmp::Ordering;

/// Represent a range from [start, end)
/// Inclusive start, exclusive of end
#[derive(Eq, Debug, Clone)]
pub struct Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    pub start: I,
    pub end: I,
    pub val: T,
}

impl<I, T> Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Build a half-open interval from closed bounds `[first, last]`.
    ///
    /// Saturates at the maximum of `I`, so a region ending on the last
    /// representable coordinate covers everything but that coordinate.
    pub fn from_closed(first: I, last: I, val: T) -> Self {
        Interval {
            start: first,
            end: last.saturating_add(one::<I>()),
            val,
        }
    }

    /// Check if a single position falls inside the interval
    #[inline]
    pub fn covers(&self, pos: I) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Check if two intervals overlap
    #[inline]
    pub fn overlap(&self, start: I, end: I) -> bool {
        self.start < end && self.end > start
    }

    /// The last position covered, i.e. the closed right bound.
    #[inline]
    pub fn last(&self) -> I {
        self.end.saturating_sub(one::<I>())
    }
}

impl<I, T> Ord for Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    #[inline]
    fn cmp(&self, other: &Interval<I, T>) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.end.cmp(&other.end))
    }
}

impl<I, T> PartialOrd for Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<I, T> PartialEq for Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    #[inline]
    fn eq(&self, other: &Interval<I, T>) -> bool {
        self.start == other.start && self.end == other.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(99, false)]
    #[case(100, true)]
    #[case(300, true)]
    #[case(301, false)]
    fn test_closed_bounds_cover_both_ends(#[case] pos: u32, #[case] expected: bool) {
        let iv = Interval::from_closed(100u32, 300, 5u32);
        assert_eq!(iv.covers(pos), expected);
        assert_eq!(iv.last(), 300);
    }

    #[rstest]
    fn test_from_closed_saturates() {
        let iv = Interval::from_closed(10u32, u32::MAX, ());
        assert_eq!(iv.end, u32::MAX);
        assert!(iv.covers(u32::MAX - 1));
    }

    #[rstest]
    fn test_ordering_uses_start_then_end() {
        let mut ivs = vec![
            Interval { start: 5u32, end: 9, val: 'c' },
            Interval { start: 1, end: 8, val: 'b' },
            Interval { start: 1, end: 4, val: 'a' },
        ];
        ivs.sort();
        let vals: Vec<char> = ivs.iter().map(|iv| iv.val).collect();
        assert_eq!(vals, vec!['a', 'b', 'c']);
    }
}
