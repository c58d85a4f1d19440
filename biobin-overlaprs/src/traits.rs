use num_traits::{PrimInt, Unsigned, identities::one};

pub use biobin_core::models::Interval;

pub trait Overlapper<I, T>: Send + Sync
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    fn build(intervals: Vec<Interval<I, T>>) -> Self
    where
        Self: Sized;

    fn find_iter<'a>(
        &'a self,
        start: I,
        end: I,
    ) -> Box<dyn Iterator<Item = &'a Interval<I, T>> + 'a>;

    /// Every interval containing the single position `pos`.
    fn covering<'a>(&'a self, pos: I) -> Box<dyn Iterator<Item = &'a Interval<I, T>> + 'a> {
        self.find_iter(pos, pos.saturating_add(one::<I>()))
    }
}
