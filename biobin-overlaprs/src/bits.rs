use num_traits::{PrimInt, Unsigned, identities::zero};

use super::Overlapper;
use biobin_core::models::Interval;

/// A Binary Interval Search data structure for region coverage queries.
///
/// From the journal article: <https://academic.oup.com/bioinformatics/article/29/1/1/273289>
///
/// Intervals are kept sorted by start. A query first binary-searches for the
/// earliest interval that could still reach the query (its start is at least
/// `query_start - max_len`), then scans forward until starts pass the query end.
///
/// # Examples
///
/// ```
/// use biobin_overlaprs::{Bits, Overlapper, Interval};
///
/// let genes = vec![
///     Interval::from_closed(100u32, 300, 5u32),
///     Interval::from_closed(280, 320, 6),
///     Interval::from_closed(900, 950, 7),
/// ];
///
/// let bits = Bits::build(genes);
/// let ids: Vec<u32> = bits.covering(290).map(|iv| iv.val).collect();
/// assert_eq!(ids, vec![5, 6]);
/// assert_eq!(bits.count(0, 1000), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Bits<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Intervals sorted by (start, end)
    intervals: Vec<Interval<I, T>>,
    /// Sorted start positions
    starts: Vec<I>,
    /// Sorted end positions
    ends: Vec<I>,
    /// The length of the longest interval
    max_len: I,
}

impl<I, T> Overlapper<I, T> for Bits<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    fn build(mut intervals: Vec<Interval<I, T>>) -> Self
    where
        Self: Sized,
    {
        intervals.sort();
        let (mut starts, mut ends): (Vec<_>, Vec<_>) =
            intervals.iter().map(|x| (x.start, x.end)).unzip();
        starts.sort();
        ends.sort();

        let max_len = intervals
            .iter()
            .map(|iv| iv.end.checked_sub(&iv.start).unwrap_or_else(zero::<I>))
            .max()
            .unwrap_or_else(zero::<I>);

        Bits {
            intervals,
            starts,
            ends,
            max_len,
        }
    }

    fn find_iter<'a>(
        &'a self,
        start: I,
        stop: I,
    ) -> Box<dyn Iterator<Item = &'a Interval<I, T>> + 'a> {
        Box::new(self.find(start, stop))
    }
}

impl<I, T> Bits<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Find all intervals that overlap start .. stop without boxing the iterator.
    #[inline]
    pub fn find(&self, start: I, stop: I) -> IterFind<'_, I, T> {
        IterFind {
            inner: self,
            off: Self::lower_bound(
                start.checked_sub(&self.max_len).unwrap_or_else(zero::<I>),
                &self.intervals,
            ),
            start,
            stop,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// All intervals in start order.
    pub fn intervals(&self) -> &[Interval<I, T>] {
        &self.intervals
    }

    /// First index whose start is not below `start`.
    #[inline]
    fn lower_bound(start: I, intervals: &[Interval<I, T>]) -> usize {
        intervals.partition_point(|iv| iv.start < start)
    }

    /// Count intervals overlapping start .. stop with two binary searches: everything
    /// that ends at or before `start` and everything that begins at or after `stop`
    /// is excluded. See [BITS](https://arxiv.org/pdf/1208.3407.pdf).
    #[inline]
    pub fn count(&self, start: I, stop: I) -> usize {
        let ended_before = self.ends.partition_point(|&end| end <= start);
        let start_after = self.starts.len() - self.starts.partition_point(|&s| s < stop);
        self.intervals
            .len()
            .saturating_sub(ended_before + start_after)
    }
}

/// An iterator over intervals in a [`Bits`] structure that overlap with a query range.
#[derive(Debug)]
pub struct IterFind<'a, I, T>
where
    T: Eq + Clone + Send + Sync + 'a,
    I: PrimInt + Unsigned + Send + Sync,
{
    inner: &'a Bits<I, T>,
    off: usize,
    start: I,
    stop: I,
}

impl<'a, I, T> Iterator for IterFind<'a, I, T>
where
    T: Eq + Clone + Send + Sync + 'a,
    I: PrimInt + Unsigned + Send + Sync,
{
    type Item = &'a Interval<I, T>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        while let Some(interval) = self.inner.intervals.get(self.off) {
            self.off += 1;
            if interval.overlap(self.start, self.stop) {
                return Some(interval);
            } else if interval.start >= self.stop {
                break;
            }
        }
        None
    }
}
