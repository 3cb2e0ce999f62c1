//! Range bounds for ordered range queries
//!
//! A missing bound means the range is unbounded on that side. Each present
//! bound carries its own inclusivity flag.

use std::ops::Bound;

/// Borrowed bounds of a range query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRange<'a, K> {
    /// Lower bound (None = unbounded)
    pub from: Option<&'a K>,
    /// Whether `from` itself is included
    pub from_inclusive: bool,
    /// Upper bound (None = unbounded)
    pub to: Option<&'a K>,
    /// Whether `to` itself is included
    pub to_inclusive: bool,
}

impl<'a, K: Ord> KeyRange<'a, K> {
    /// Create a range from explicit bounds
    pub fn new(from: Option<&'a K>, from_inclusive: bool, to: Option<&'a K>, to_inclusive: bool) -> Self {
        Self {
            from,
            from_inclusive,
            to,
            to_inclusive,
        }
    }

    /// Range covering every key
    pub fn full() -> Self {
        Self::new(None, true, None, true)
    }

    /// `[from, to]`
    pub fn inclusive(from: &'a K, to: &'a K) -> Self {
        Self::new(Some(from), true, Some(to), true)
    }

    /// Keys greater than (or equal to, when `inclusive`) `from`
    pub fn starting_at(from: &'a K, inclusive: bool) -> Self {
        Self::new(Some(from), inclusive, None, true)
    }

    /// Keys less than (or equal to, when `inclusive`) `to`
    pub fn ending_at(to: &'a K, inclusive: bool) -> Self {
        Self::new(None, true, Some(to), inclusive)
    }

    /// Bounds in the form accepted by `BTreeMap::range` and `SkipMap::range`
    pub fn bounds(&self) -> (Bound<&'a K>, Bound<&'a K>) {
        let lower = match self.from {
            None => Bound::Unbounded,
            Some(k) if self.from_inclusive => Bound::Included(k),
            Some(k) => Bound::Excluded(k),
        };
        let upper = match self.to {
            None => Bound::Unbounded,
            Some(k) if self.to_inclusive => Bound::Included(k),
            Some(k) => Bound::Excluded(k),
        };
        (lower, upper)
    }

    /// True when no key can satisfy both bounds
    ///
    /// `BTreeMap::range` panics on inverted bounds and on `(Excluded(k), Excluded(k))`,
    /// so callers check this first and return an empty result.
    pub fn is_empty(&self) -> bool {
        match (self.from, self.to) {
            (Some(from), Some(to)) => {
                from > to || (from == to && !(self.from_inclusive && self.to_inclusive))
            }
            _ => false,
        }
    }

    /// Whether `key` lies inside the range
    pub fn contains(&self, key: &K) -> bool {
        let above = match self.from {
            None => true,
            Some(from) if self.from_inclusive => key >= from,
            Some(from) => key > from,
        };
        let below = match self.to {
            None => true,
            Some(to) if self.to_inclusive => key <= to,
            Some(to) => key < to,
        };
        above && below
    }
}
