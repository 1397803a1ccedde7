//! Utility structs and methods
use std::cmp::Ordering::{Equal, Less};

/// Iterator of all one-way pairwise combinations of the inner slice
///
/// Each pair `(a, b)` is yielded once, with `a` preceding `b` in the slice.
/// Items are never paired with themselves.
///
/// # Examples
/// ```
/// use ncda::utils::Combinations;
///
/// let items = [1, 2, 3];
/// let mut c = Combinations::new(&items);
///
/// assert_eq!(c.next(), Some((&1, &2)));
/// assert_eq!(c.next(), Some((&1, &3)));
/// assert_eq!(c.next(), Some((&2, &3)));
/// assert!(c.next().is_none());
/// ```
pub struct Combinations<'a, T> {
    inner: &'a [T],
    idx1: usize,
    idx2: usize,
}

impl<'a, T> Combinations<'a, T> {
    /// Creates a new Combinations iterator
    pub fn new(inner: &'a [T]) -> Self {
        Self {
            inner,
            idx1: 0,
            idx2: 1,
        }
    }
}

impl<'a, T> Iterator for Combinations<'a, T> {
    type Item = (&'a T, &'a T);
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match (
                self.idx1 < self.inner.len(),
                self.idx2.cmp(&self.inner.len()),
            ) {
                (true, Less) => {
                    self.idx2 += 1;
                    return Some((&self.inner[self.idx1], &self.inner[self.idx2 - 1]));
                }
                (true, Equal) => {
                    self.idx1 += 1;
                    self.idx2 = self.idx1 + 1;
                }
                _ => return None,
            }
        }
    }
}

/// Returns the index pairs `(i, j)` with `i < j` of a square matrix of size `n`
///
/// The order is row-major over the upper triangle, which is the order
/// in which pairwise results are written back into a matrix.
pub fn upper_triangle(n: usize) -> Vec<(usize, usize)> {
    let indices: Vec<usize> = (0..n).collect();
    Combinations::new(&indices).map(|(a, b)| (*a, *b)).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn combinations() {
        let a = vec![1, 2, 3, 4];
        let mut c = Combinations::new(&a);
        assert_eq!(c.next(), Some((&1, &2)));
        assert_eq!(c.next(), Some((&1, &3)));
        assert_eq!(c.next(), Some((&1, &4)));
        assert_eq!(c.next(), Some((&2, &3)));
        assert_eq!(c.next(), Some((&2, &4)));
        assert_eq!(c.next(), Some((&3, &4)));
        assert_eq!(c.next(), None);
    }

    #[test]
    fn combinations_empty() {
        let a: Vec<usize> = vec![];
        let mut c = Combinations::new(&a);
        assert_eq!(c.next(), None);
    }

    #[test]
    fn combinations_single() {
        let a = vec![1];
        let mut c = Combinations::new(&a);
        assert_eq!(c.next(), None);
    }

    #[test]
    fn triangle() {
        assert_eq!(upper_triangle(3), vec![(0, 1), (0, 2), (1, 2)]);
        assert!(upper_triangle(1).is_empty());
        assert_eq!(upper_triangle(20).len(), 190);
    }
}
