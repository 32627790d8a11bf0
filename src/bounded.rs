//! Bounds-checked containers indexed over an explicit inclusive range
//!
//! Several formulas (Nelson-Siegel anchors, spot-rate bootstrap, historical
//! curve lookup) are written against 1-based maturity indices. These
//! containers keep that numbering first-class: a `BoundedVec` over `[1, 10]`
//! is indexed with `1..=10`, and a `BoundedTable` carries one range per axis.
//!
//! `Index`/`IndexMut` panic on an out-of-range index (a fatal precondition
//! violation); `get` returns `ScenarioError::IndexOutOfRange` instead.

use std::ops::{Index, IndexMut};

use crate::error::{Result, ScenarioError};

/// Inclusive index range `[lo, hi]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    pub lo: i32,
    pub hi: i32,
}

impl IndexRange {
    pub const fn new(lo: i32, hi: i32) -> Self {
        Self { lo, hi }
    }

    /// Range `[0, count - 1]`
    pub const fn zero_based(count: usize) -> Self {
        Self { lo: 0, hi: count as i32 - 1 }
    }

    /// Number of slots covered; zero when `hi < lo`
    pub fn len(&self) -> usize {
        if self.hi < self.lo {
            0
        } else {
            (self.hi - self.lo + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, idx: i32) -> bool {
        idx >= self.lo && idx <= self.hi
    }

    fn offset(&self, idx: i32) -> Result<usize> {
        if self.contains(idx) {
            Ok((idx - self.lo) as usize)
        } else {
            Err(ScenarioError::IndexOutOfRange {
                index: idx as i64,
                lo: self.lo as i64,
                hi: self.hi as i64,
            })
        }
    }

    fn offset_or_panic(&self, idx: i32) -> usize {
        match self.offset(idx) {
            Ok(offset) => offset,
            Err(err) => panic!("{}", err),
        }
    }
}

/// One-dimensional array over an inclusive index range
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedVec<T> {
    range: IndexRange,
    data: Vec<T>,
}

impl<T: Clone + Default> BoundedVec<T> {
    /// Create a vector over `range` filled with `T::default()`
    pub fn new(range: IndexRange) -> Self {
        Self::filled(range, T::default())
    }
}

impl<T: Clone> BoundedVec<T> {
    /// Create a vector over `range` filled with `value`
    pub fn filled(range: IndexRange, value: T) -> Self {
        Self {
            range,
            data: vec![value; range.len()],
        }
    }
}

impl<T> BoundedVec<T> {
    /// Wrap existing values, the first of which sits at index `lo`
    pub fn from_vec(lo: i32, data: Vec<T>) -> Self {
        let hi = lo + data.len() as i32 - 1;
        Self {
            range: IndexRange::new(lo, hi),
            data,
        }
    }

    pub fn range(&self) -> IndexRange {
        self.range
    }

    pub fn lower_bound(&self) -> i32 {
        self.range.lo
    }

    pub fn upper_bound(&self) -> i32 {
        self.range.hi
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Checked lookup
    pub fn get(&self, idx: i32) -> Result<&T> {
        let offset = self.range.offset(idx)?;
        Ok(&self.data[offset])
    }

    /// Values in index order
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// `(index, value)` pairs in index order
    pub fn iter_indexed(&self) -> impl Iterator<Item = (i32, &T)> {
        let lo = self.range.lo;
        self.data.iter().enumerate().map(move |(i, v)| (lo + i as i32, v))
    }
}

impl<T> Index<i32> for BoundedVec<T> {
    type Output = T;

    fn index(&self, idx: i32) -> &T {
        &self.data[self.range.offset_or_panic(idx)]
    }
}

impl<T> IndexMut<i32> for BoundedVec<T> {
    fn index_mut(&mut self, idx: i32) -> &mut T {
        let offset = self.range.offset_or_panic(idx);
        &mut self.data[offset]
    }
}

/// Two-dimensional table with an inclusive range per axis, stored row-major in `x`
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedTable<T> {
    x_range: IndexRange,
    y_range: IndexRange,
    data: Vec<T>,
}

impl<T: Clone + Default> BoundedTable<T> {
    /// Create a table filled with `T::default()`
    pub fn new(x_range: IndexRange, y_range: IndexRange) -> Self {
        Self::filled(x_range, y_range, T::default())
    }

    /// Create a zero-based `size_x` by `size_y` table
    pub fn zero_based(size_x: usize, size_y: usize) -> Self {
        Self::new(IndexRange::zero_based(size_x), IndexRange::zero_based(size_y))
    }
}

impl<T: Clone> BoundedTable<T> {
    pub fn filled(x_range: IndexRange, y_range: IndexRange, value: T) -> Self {
        Self {
            x_range,
            y_range,
            data: vec![value; x_range.len() * y_range.len()],
        }
    }
}

impl<T> BoundedTable<T> {
    pub fn x_range(&self) -> IndexRange {
        self.x_range
    }

    pub fn y_range(&self) -> IndexRange {
        self.y_range
    }

    fn strided(&self, x: i32, y: i32) -> Result<usize> {
        let xo = self.x_range.offset(x)?;
        let yo = self.y_range.offset(y)?;
        Ok(xo * self.y_range.len() + yo)
    }

    /// Checked lookup
    pub fn get(&self, x: i32, y: i32) -> Result<&T> {
        let idx = self.strided(x, y)?;
        Ok(&self.data[idx])
    }

    /// All values along `y` for a fixed `x`
    pub fn row(&self, x: i32) -> &[T] {
        let start = self.x_range.offset_or_panic(x) * self.y_range.len();
        &self.data[start..start + self.y_range.len()]
    }
}

impl<T> Index<(i32, i32)> for BoundedTable<T> {
    type Output = T;

    fn index(&self, (x, y): (i32, i32)) -> &T {
        match self.strided(x, y) {
            Ok(idx) => &self.data[idx],
            Err(err) => panic!("{}", err),
        }
    }
}

impl<T> IndexMut<(i32, i32)> for BoundedTable<T> {
    fn index_mut(&mut self, (x, y): (i32, i32)) -> &mut T {
        match self.strided(x, y) {
            Ok(idx) => &mut self.data[idx],
            Err(err) => panic!("{}", err),
        }
    }
}
