use std::cmp::Ordering;

/// A strict weak ordering expressed as a less-than predicate.
///
/// `less(a, b)` must return `true` if and only if `a` sorts strictly before `b`. Two keys are
/// equivalent when neither is less than the other; lookups and duplicate detection rely on that
/// definition.
pub trait Compare<K: ?Sized> {
    fn less(&self, a: &K, b: &K) -> bool;
}

impl<K, F> Compare<K> for F
where
    K: ?Sized,
    F: Fn(&K, &K) -> bool,
{
    fn less(&self, a: &K, b: &K) -> bool {
        self(a, b)
    }
}

/// Orders keys by their `PartialOrd` implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct Natural;

impl<K> Compare<K> for Natural
where
    K: PartialOrd + ?Sized,
{
    fn less(&self, a: &K, b: &K) -> bool {
        a < b
    }
}

/// Adapts a three-way comparator into a less-than predicate.
///
/// # Examples
///
/// ```
/// use rb_collections::red_black_tree::{Compare, Ordered};
///
/// let by_len = Ordered(|a: &&str, b: &&str| a.len().cmp(&b.len()));
/// assert!(by_len.less(&"ab", &"abc"));
/// assert!(!by_len.less(&"abc", &"xyz"));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Ordered<F>(pub F);

impl<K, F> Compare<K> for Ordered<F>
where
    K: ?Sized,
    F: Fn(&K, &K) -> Ordering,
{
    fn less(&self, a: &K, b: &K) -> bool {
        (self.0)(a, b) == Ordering::Less
    }
}

#[cfg(test)]
mod tests {
    use super::{Compare, Natural, Ordered};

    #[test]
    fn test_natural() {
        assert!(Natural.less(&1, &2));
        assert!(!Natural.less(&2, &2));
        assert!(!Natural.less(&3, &2));
    }

    #[test]
    fn test_closure() {
        let greater = |a: &u32, b: &u32| a > b;
        assert!(greater.less(&3, &2));
        assert!(!greater.less(&2, &3));
    }

    #[test]
    fn test_ordered() {
        let reverse = Ordered(|a: &u32, b: &u32| b.cmp(a));
        assert!(reverse.less(&5, &1));
        assert!(!reverse.less(&1, &1));
    }
}
