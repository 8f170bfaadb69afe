use core::ops::{Bound, Index, IndexMut, RangeBounds};

use crate::cell::VolatileCell;

/// A slice whose elements are only ever touched with volatile accesses.
///
/// Bulk operations are element-wise volatile loops, so every store reaches memory in program
/// order. That is what a device scanning the buffer (such as a display controller) needs.
#[repr(transparent)]
#[derive(Debug)]
pub struct VolatileSlice<T>([T]);

impl<T> VolatileSlice<T> {
    /// Creates a `&VolatileSlice<T>` from a reference to a slice of type `T`.
    pub fn from_slice(slice: &[T]) -> &Self {
        // SAFETY: `VolatileSlice<T>` is `repr(transparent)` over `[T]`
        unsafe { &*(slice as *const [T] as *const Self) }
    }

    /// Creates a `&mut VolatileSlice<T>` from a mutable reference to a slice of type `T`.
    pub fn from_slice_mut(slice: &mut [T]) -> &mut Self {
        // SAFETY: `VolatileSlice<T>` is `repr(transparent)` over `[T]`
        unsafe { &mut *(slice as *mut [T] as *mut Self) }
    }

    /// Creates a `&mut VolatileSlice<T>` over `len` elements starting at `ptr`.
    ///
    /// # Safety
    /// `ptr` must be non-null, aligned and valid for reads and writes of `len` elements for
    /// the whole lifetime `'a`, and nothing else may create a reference to that memory while
    /// the returned slice is alive. Memory-mapped device memory qualifies once it is mapped.
    pub unsafe fn from_raw_parts_mut<'a>(ptr: *mut T, len: usize) -> &'a mut Self {
        // SAFETY: guaranteed by the caller
        Self::from_slice_mut(unsafe { core::slice::from_raw_parts_mut(ptr, len) })
    }

    /// Returns the length of the slice, which is the number of elements in the slice.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the slice is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a raw pointer to the first element.
    pub fn as_ptr(&self) -> *const T {
        self.0.as_ptr()
    }

    /// Returns a raw mut pointer to the first element.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.0.as_mut_ptr()
    }

    fn bounds<R: RangeBounds<usize>>(&self, range: R) -> (usize, usize) {
        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start + 1,
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&end) => end + 1,
            Bound::Excluded(&end) => end,
            Bound::Unbounded => self.len(),
        };
        assert!(start <= end);
        assert!(end <= self.len());
        (start, end)
    }
}

impl<T: Copy> VolatileSlice<T> {
    /// Volatile writes `value` into every element.
    pub fn fill(&mut self, value: T) {
        let ptr = self.as_mut_ptr();
        for i in 0..self.len() {
            // SAFETY: `i` is in bounds
            unsafe { ptr.add(i).write_volatile(value) };
        }
    }

    /// Copies the elements from `other` into `self`
    ///
    /// # Panics
    ///
    /// Panics if `other.len()` is not equal to `self.len()`.
    pub fn copy_from_slice(&mut self, other: &[T]) {
        assert!(other.len() == self.len());
        let dst = self.as_mut_ptr();
        for (i, value) in other.iter().enumerate() {
            // SAFETY: `i` is in bounds for both slices
            unsafe { dst.add(i).write_volatile(*value) };
        }
    }

    /// Copies the elements from `self` into `other`
    ///
    /// # Panics
    ///
    /// Panics if `other.len()` is not equal to `self.len()`.
    pub fn copy_to_slice(&self, other: &mut [T]) {
        assert!(other.len() == self.len());
        let src = self.as_ptr();
        for (i, value) in other.iter_mut().enumerate() {
            // SAFETY: `i` is in bounds for both slices
            *value = unsafe { src.add(i).read_volatile() };
        }
    }

    /// Copies elements within the slice, from `src` to `dst`. The ranges may overlap.
    ///
    /// # Panics
    ///
    /// Panics if `src` is out of bounds, if start is greater than end, or if the destination
    /// range does not fit in the slice.
    pub fn copy_within<R: RangeBounds<usize>>(&mut self, src: R, dst: usize) {
        let (start, end) = self.bounds(src);
        let count = end - start;
        assert!(dst <= self.len() - count);
        let ptr = self.as_mut_ptr();
        // Walk away from the overlap so no element is read after it was overwritten
        let step = |i: usize| {
            // SAFETY: `start + i` and `dst + i` are in bounds
            unsafe { ptr.add(dst + i).write_volatile(ptr.add(start + i).read_volatile()) }
        };
        if dst <= start {
            (0..count).for_each(step);
        } else {
            (0..count).rev().for_each(step);
        }
    }
}

/// A trait that is not `usize`.
/// This is bit of a hack to make the `Index` impls work.
trait NotUsize {}
impl<T> NotUsize for core::ops::Range<T> {}
impl<T> NotUsize for core::ops::RangeInclusive<T> {}
impl<T> NotUsize for core::ops::RangeFrom<T> {}
impl<T> NotUsize for core::ops::RangeToInclusive<T> {}
impl<T> NotUsize for core::ops::RangeTo<T> {}
impl NotUsize for core::ops::RangeFull {}

impl<T> Index<usize> for VolatileSlice<T>
where
    T: Copy,
{
    type Output = VolatileCell<T>;

    fn index(&self, index: usize) -> &Self::Output {
        VolatileCell::from_ref(&self.0[index])
    }
}

impl<T> IndexMut<usize> for VolatileSlice<T>
where
    T: Copy,
{
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        VolatileCell::from_mut(&mut self.0[index])
    }
}

impl<T, R> Index<R> for VolatileSlice<T>
where
    T: Copy,
    R: RangeBounds<usize> + NotUsize,
{
    type Output = VolatileSlice<T>;

    fn index(&self, index: R) -> &Self::Output {
        let (start, end) = self.bounds(index);
        VolatileSlice::from_slice(&self.0[start..end])
    }
}

impl<T, R> IndexMut<R> for VolatileSlice<T>
where
    T: Copy,
    R: RangeBounds<usize> + NotUsize,
{
    fn index_mut(&mut self, index: R) -> &mut Self::Output {
        let (start, end) = self.bounds(index);
        VolatileSlice::from_slice_mut(&mut self.0[start..end])
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    #[should_panic]
    fn test_volatile_slice_out_of_bounds() {
        let mut slice = [0u16; 10];
        let vslice = VolatileSlice::from_slice_mut(&mut slice);
        vslice[10].get();
    }

    #[test]
    #[should_panic]
    fn test_volatile_slice_range_out_of_bounds() {
        let mut slice = [0u16; 10];
        let vslice = VolatileSlice::from_slice_mut(&mut slice);
        vslice[0..11].len();
    }

    #[test]
    #[should_panic]
    fn test_copy_within_destination_out_of_bounds() {
        let mut slice = [0u16; 10];
        let vslice = VolatileSlice::from_slice_mut(&mut slice);
        vslice.copy_within(0..4, 8);
    }

    #[test]
    #[should_panic]
    fn test_copy_from_slice_different_length() {
        let mut slice = [0u16; 10];
        let vslice = VolatileSlice::from_slice_mut(&mut slice);
        vslice.copy_from_slice(&[0u16; 11]);
    }

    #[test]
    fn test_index_range() {
        let mut slice = [0u16; 10];
        let vslice = VolatileSlice::from_slice_mut(&mut slice);
        assert_eq!(vslice[2..4].len(), 2);
        vslice[2..4][0].set(1);
        vslice[2..=3][1].set(2);
        assert_eq!(slice[..5], [0, 0, 1, 2, 0]);
    }

    #[test]
    fn test_fill() {
        let mut slice = [0u16; 6];
        VolatileSlice::from_slice_mut(&mut slice)[1..5].fill(0x0720);
        assert_eq!(slice, [0, 0x0720, 0x0720, 0x0720, 0x0720, 0]);
    }

    #[test]
    fn test_copy_within_backwards_overlap() {
        // The shape of a one-row scroll: rows 1.. move onto rows 0..
        let mut slice = [1u16, 2, 3, 4, 5, 6];
        VolatileSlice::from_slice_mut(&mut slice).copy_within(2.., 0);
        assert_eq!(slice, [3, 4, 5, 6, 5, 6]);
    }

    #[test]
    fn test_copy_within_forwards_overlap() {
        let mut slice = [1u16, 2, 3, 4, 5, 6];
        VolatileSlice::from_slice_mut(&mut slice).copy_within(..4, 2);
        assert_eq!(slice, [1, 2, 1, 2, 3, 4]);
    }

    #[test]
    fn test_copy_to_slice() {
        let mut slice = [1u8, 2, 3, 4];
        let vslice = VolatileSlice::from_slice_mut(&mut slice);
        let mut result = [0u8; 2];
        vslice[..2].copy_to_slice(&mut result);
        assert_eq!(result, [1, 2]);
        vslice[2..4].copy_to_slice(&mut result);
        assert_eq!(result, [3, 4]);
    }

    #[test]
    fn test_from_raw_parts() {
        let mut backing = [0u16; 4];
        let vslice = unsafe { VolatileSlice::from_raw_parts_mut(backing.as_mut_ptr(), backing.len()) };
        vslice[3].set(9);
        assert_eq!(backing[3], 9);
    }
}
