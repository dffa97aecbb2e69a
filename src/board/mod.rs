//! Generic board algebra
//!
//! A [`Board`] is an immutable rectangular grid of cells, generic over the
//! cell domain so that the same transform code runs on concrete bits and on
//! symbolic nodes. All operations are pure: they return a fresh board and
//! never mutate the receiver.

use std::fmt;

use crate::ir::types::{BitOp, Direction, Transform};

/// Cell domain a board can range over
///
/// Concrete execution uses `bool` with a unit context; symbolic execution
/// threads a node arena through the context so the boolean combinators can
/// allocate graph nodes.
pub trait CellDomain: Clone + PartialEq + fmt::Debug {
    /// Context threaded through every boolean combinator
    type Ctx;

    fn zero() -> Self;
    fn one() -> Self;

    fn from_bit(bit: bool) -> Self {
        if bit {
            Self::one()
        } else {
            Self::zero()
        }
    }

    fn and(ctx: &mut Self::Ctx, a: &Self, b: &Self) -> Self;
    fn or(ctx: &mut Self::Ctx, a: &Self, b: &Self) -> Self;
    fn xor(ctx: &mut Self::Ctx, a: &Self, b: &Self) -> Self;
    fn not(ctx: &mut Self::Ctx, a: &Self) -> Self;
}

impl CellDomain for bool {
    type Ctx = ();

    fn zero() -> Self {
        false
    }

    fn one() -> Self {
        true
    }

    fn and(_ctx: &mut (), a: &Self, b: &Self) -> Self {
        *a && *b
    }

    fn or(_ctx: &mut (), a: &Self, b: &Self) -> Self {
        *a || *b
    }

    fn xor(_ctx: &mut (), a: &Self, b: &Self) -> Self {
        *a != *b
    }

    fn not(_ctx: &mut (), a: &Self) -> Self {
        !*a
    }
}

/// Width mismatch between two boards being concatenated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionMismatch {
    pub left: usize,
    pub right: usize,
}

impl fmt::Display for DimensionMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "incompatible widths: {} vs {}", self.left, self.right)
    }
}

impl std::error::Error for DimensionMismatch {}

/// Immutable rectangular grid of cells, stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board<T> {
    height: usize,
    width: usize,
    cells: Vec<T>,
}

impl<T> Board<T> {
    /// Build a board by evaluating `f` at every (row, column) pair
    pub fn plot<F>(height: usize, width: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let mut cells = Vec::with_capacity(height * width);
        for i in 0..height {
            for j in 0..width {
                cells.push(f(i, j));
            }
        }
        Board {
            height,
            width,
            cells,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn size(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn area(&self) -> usize {
        self.height * self.width
    }

    /// Cell at (i, j); panics when out of range
    pub fn at(&self, i: usize, j: usize) -> &T {
        assert!(i < self.height && j < self.width, "cell out of range");
        &self.cells[i * self.width + j]
    }

    /// Row `i` as a slice
    pub fn row(&self, i: usize) -> &[T] {
        if self.width == 0 {
            &[]
        } else {
            &self.cells[i * self.width..(i + 1) * self.width]
        }
    }

    /// Iterate rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        (0..self.height).map(|i| self.row(i))
    }

    /// Map every cell into another domain, preserving dimensions
    pub fn map<U, F>(&self, mut f: F) -> Board<U>
    where
        F: FnMut(&T) -> U,
    {
        Board::plot(self.height, self.width, |i, j| f(self.at(i, j)))
    }
}

impl<T: CellDomain> Board<T> {
    /// All-zero board
    pub fn empty(height: usize, width: usize) -> Self {
        Board::plot(height, width, |_, _| T::zero())
    }

    /// All-one board
    pub fn full(height: usize, width: usize) -> Self {
        Board::plot(height, width, |_, _| T::one())
    }

    // Cells outside the board read as zero. Binary cellwise ops rely on
    // this when the operand is smaller than the focus.
    fn cell_or_zero(&self, i: usize, j: usize) -> T {
        if i < self.height && j < self.width {
            self.at(i, j).clone()
        } else {
            T::zero()
        }
    }

    /// Split into the first `n` rows and the rest; `n` is clamped
    pub fn cut_rows(&self, n: usize) -> (Board<T>, Board<T>) {
        let n = n.min(self.height);
        let top = Board::plot(n, self.width, |i, j| self.at(i, j).clone());
        let bottom = Board::plot(self.height - n, self.width, |i, j| {
            self.at(i + n, j).clone()
        });
        (top, bottom)
    }

    /// Concatenate `other` below this board; widths must match
    pub fn glue(&self, other: &Board<T>) -> Result<Board<T>, DimensionMismatch> {
        if self.width != other.width {
            return Err(DimensionMismatch {
                left: self.width,
                right: other.width,
            });
        }
        Ok(Board::plot(
            self.height + other.height,
            self.width,
            |i, j| {
                if i < self.height {
                    self.at(i, j).clone()
                } else {
                    other.at(i - self.height, j).clone()
                }
            },
        ))
    }

    /// Stack `n` copies of this board vertically
    pub fn repeat_rows(&self, n: usize) -> Board<T> {
        Board::plot(self.height * n, self.width, |i, j| {
            self.at(i % self.height, j).clone()
        })
    }

    /// Reverse the row order
    pub fn reverse_rows(&self) -> Board<T> {
        Board::plot(self.height, self.width, |i, j| {
            self.at(self.height - 1 - i, j).clone()
        })
    }

    /// Mirror across the main diagonal
    pub fn transpose(&self) -> Board<T> {
        Board::plot(self.width, self.height, |i, j| self.at(j, i).clone())
    }

    /// Apply one of the eight dihedral transforms
    pub fn transform(&self, tf: Transform) -> Board<T> {
        match tf {
            Transform::Identity => self.clone(),
            Transform::FlipVertical => self.reverse_rows(),
            Transform::Transpose => self.transpose(),
            Transform::FlipHorizontal => self.transpose().reverse_rows().transpose(),
            Transform::RotateCw => self.reverse_rows().transpose(),
            Transform::RotateCcw => self.transpose().reverse_rows(),
            Transform::Rotate180 => self.transpose().reverse_rows().transpose().reverse_rows(),
            Transform::AntiTranspose => self
                .transpose()
                .reverse_rows()
                .transpose()
                .reverse_rows()
                .transpose(),
        }
    }

    /// Self-inverse transform that carries `dir` onto the canonical bottom
    /// direction
    pub fn transform_for(dir: Direction) -> Transform {
        match dir {
            Direction::Bottom => Transform::Identity,
            Direction::Right => Transform::Transpose,
            Direction::Top => Transform::FlipVertical,
            Direction::Left => Transform::AntiTranspose,
        }
    }

    /// Run `f` in transformed space and transform the result back
    ///
    /// Only self-inverse transforms (i, v, d, z) are used here, so applying
    /// the same transform on the way out restores the original frame.
    fn under_transform<F>(&self, tf: Transform, f: F) -> Board<T>
    where
        F: FnOnce(Board<T>) -> Board<T>,
    {
        f(self.transform(tf)).transform(tf)
    }

    /// Keep the first `n` rows measured from edge `dir`
    pub fn take(&self, dir: Direction, n: usize) -> Board<T> {
        let tf = match dir {
            Direction::Top => Transform::Identity,
            Direction::Bottom => Transform::FlipVertical,
            Direction::Right => Transform::AntiTranspose,
            Direction::Left => Transform::Transpose,
        };
        self.under_transform(tf, |b| b.cut_rows(n).0)
    }

    /// Drop the last `n` rows measured from edge `dir`
    pub fn delete(&self, dir: Direction, n: usize) -> Board<T> {
        self.under_transform(Self::transform_for(dir), |b| {
            let keep = b.height().saturating_sub(n);
            b.cut_rows(keep).0
        })
    }

    /// Replicate the board `n` times toward edge `dir`
    pub fn copy_times(&self, dir: Direction, n: usize) -> Board<T> {
        self.under_transform(Self::transform_for(dir), |b| b.repeat_rows(n))
    }

    /// Pad with `n` zero rows at edge `dir`
    pub fn extend(&self, dir: Direction, n: usize) -> Board<T> {
        self.under_transform(Self::transform_for(dir), |b| {
            Board::plot(b.height() + n, b.width(), |i, j| {
                if i < b.height() {
                    b.at(i, j).clone()
                } else {
                    T::zero()
                }
            })
        })
    }

    /// Shift rows by `n` toward edge `dir`; vacated rows are zero
    pub fn shift(&self, dir: Direction, n: usize) -> Board<T> {
        self.under_transform(Self::transform_for(dir), |b| {
            Board::plot(b.height(), b.width(), |i, j| {
                if i >= n {
                    b.at(i - n, j).clone()
                } else {
                    T::zero()
                }
            })
        })
    }

    /// Rotate rows by `n` toward edge `dir`, wrapping
    pub fn roll(&self, dir: Direction, n: usize) -> Board<T> {
        self.under_transform(Self::transform_for(dir), |b| {
            let h = b.height();
            if h == 0 {
                return b;
            }
            let k = n % h;
            Board::plot(h, b.width(), |i, j| b.at((i + h - k) % h, j).clone())
        })
    }

    /// Concatenate `other` onto this board along edge `dir`
    pub fn append(&self, dir: Direction, other: &Board<T>) -> Result<Board<T>, DimensionMismatch> {
        let tf = Self::transform_for(dir);
        let other = other.transform(tf);
        let glued = self.transform(tf).glue(&other)?;
        Ok(glued.transform(tf))
    }

    /// Cellwise AND with `other`, over this board's dimensions
    pub fn bitand(&self, other: &Board<T>, ctx: &mut T::Ctx) -> Board<T> {
        self.zip_with(other, T::and, ctx)
    }

    /// Cellwise OR with `other`, over this board's dimensions
    pub fn bitor(&self, other: &Board<T>, ctx: &mut T::Ctx) -> Board<T> {
        self.zip_with(other, T::or, ctx)
    }

    /// Cellwise XOR with `other`, over this board's dimensions
    pub fn bitxor(&self, other: &Board<T>, ctx: &mut T::Ctx) -> Board<T> {
        self.zip_with(other, T::xor, ctx)
    }

    /// Cellwise NOT
    pub fn bitnot(&self, ctx: &mut T::Ctx) -> Board<T> {
        Board::plot(self.height, self.width, |i, j| {
            T::not(ctx, self.at(i, j))
        })
    }

    fn zip_with(
        &self,
        other: &Board<T>,
        f: fn(&mut T::Ctx, &T, &T) -> T,
        ctx: &mut T::Ctx,
    ) -> Board<T> {
        Board::plot(self.height, self.width, |i, j| {
            f(ctx, self.at(i, j), &other.cell_or_zero(i, j))
        })
    }

    /// Fold each row down to one cell under a direction
    ///
    /// Left/right folds run along the rows as stored; top/bottom folds run
    /// along columns by working in transposed space. Fold identities are
    /// 1 for AND and 0 for OR/XOR.
    pub fn row_fold(&self, op: BitOp, dir: Direction, ctx: &mut T::Ctx) -> Board<T> {
        let tf = match dir {
            Direction::Left | Direction::Right => Transform::Identity,
            Direction::Top | Direction::Bottom => Transform::Transpose,
        };
        let inner = self.transform(tf);
        let folded = match op {
            BitOp::And => inner.fold_rows(T::one(), T::and, ctx),
            BitOp::Or => inner.fold_rows(T::zero(), T::or, ctx),
            BitOp::Xor => inner.fold_rows(T::zero(), T::xor, ctx),
        };
        folded.transform(tf)
    }

    fn fold_rows(&self, seed: T, f: fn(&mut T::Ctx, &T, &T) -> T, ctx: &mut T::Ctx) -> Board<T> {
        Board::plot(self.height, 1, |i, _| {
            let mut acc = seed.clone();
            for cell in self.row(i) {
                acc = f(ctx, &acc, cell);
            }
            acc
        })
    }

    /// Whole-board equality as a 1x1 board
    ///
    /// AND over all cells of NOT(XOR) of corresponding cells; differing
    /// dimensions collapse immediately to a 1x1 zero board.
    pub fn equals_board(&self, other: &Board<T>, ctx: &mut T::Ctx) -> Board<T> {
        if self.height != other.height || self.width != other.width {
            return Board::empty(1, 1);
        }
        let mut acc = T::one();
        for i in 0..self.height {
            for j in 0..self.width {
                let diff = T::xor(ctx, self.at(i, j), other.at(i, j));
                let same = T::not(ctx, &diff);
                acc = T::and(ctx, &acc, &same);
            }
        }
        Board::plot(1, 1, |_, _| acc.clone())
    }
}

impl fmt::Display for Board<bool> {
    /// `#` + rows of `0`/`1` joined by `/`, or `o{H}x{W}` for zero area
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.area() == 0 {
            return write!(f, "o{}x{}", self.height, self.width);
        }
        write!(f, "#")?;
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            for &bit in row {
                write!(f, "{}", if bit { '1' } else { '0' })?;
            }
        }
        Ok(())
    }
}
