//! Fixed-size, heap-allocated, element-owning buffer.
//!
//! Used to hold whole-file contents and uniform array data. Unlike `Vec`,
//! the size is fixed at allocation time and a failed allocation leaves the
//! buffer empty instead of aborting: callers are expected to check
//! [`FixedBuffer::is_empty`] after any allocation. An optional alignment
//! parameter covers SIMD-friendly buffers; the plain and aligned flavors
//! share one implementation and one deallocation path.

use std::alloc::{alloc, dealloc, Layout};
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use tracing::error;

/// A fixed-size owning buffer of `count` live elements.
///
/// Move-only: ownership transfers on move, there is no `Clone`. Dropping the
/// buffer drops every element and releases the storage with the exact layout
/// it was allocated with.
pub struct FixedBuffer<T> {
    ptr: NonNull<T>,
    len: usize,
    layout: Option<Layout>,
}

/// Raw ownership of a buffer's storage, obtained from [`FixedBuffer::into_raw`].
///
/// The holder is responsible for eventually releasing it through
/// [`FixedBuffer::from_raw`], which restores the matching deallocation path.
pub struct RawParts<T> {
    ptr: NonNull<T>,
    len: usize,
    layout: Layout,
}

impl<T> RawParts<T> {
    pub fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

unsafe impl<T: Send> Send for FixedBuffer<T> {}
unsafe impl<T: Sync> Sync for FixedBuffer<T> {}

impl<T> FixedBuffer<T> {
    /// An empty buffer that owns no storage.
    pub fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            layout: None,
        }
    }

    /// Allocates `len` default-initialized elements at the type's natural
    /// alignment. On allocation failure the result is empty.
    pub fn alloc(len: usize) -> Self
    where
        T: Default,
    {
        Self::alloc_aligned(mem::align_of::<T>(), len)
    }

    /// Allocates `len` clones of `value`. On allocation failure the result
    /// is empty.
    pub fn alloc_with(len: usize, value: &T) -> Self
    where
        T: Clone,
    {
        Self::alloc_aligned_with(mem::align_of::<T>(), len, value)
    }

    /// Allocates `len` default-initialized elements with the storage aligned
    /// to at least `align` bytes.
    pub fn alloc_aligned(align: usize, len: usize) -> Self
    where
        T: Default,
    {
        Self::alloc_raw(align, len, |ptr, count| {
            for i in 0..count {
                unsafe { ptr.add(i).write(T::default()) };
            }
        })
    }

    /// Aligned variant of [`FixedBuffer::alloc_with`].
    pub fn alloc_aligned_with(align: usize, len: usize, value: &T) -> Self
    where
        T: Clone,
    {
        Self::alloc_raw(align, len, |ptr, count| {
            for i in 0..count {
                unsafe { ptr.add(i).write(value.clone()) };
            }
        })
    }

    fn alloc_raw(align: usize, len: usize, init: impl FnOnce(*mut T, usize)) -> Self {
        if len == 0 || mem::size_of::<T>() == 0 {
            return Self::new();
        }
        let layout = match Layout::array::<T>(len)
            .and_then(|l| l.align_to(align.max(mem::align_of::<T>())))
        {
            Ok(layout) => layout.pad_to_align(),
            Err(e) => {
                error!("invalid buffer layout for {} elements: {e}", len);
                return Self::new();
            }
        };
        let raw = unsafe { alloc(layout) } as *mut T;
        let Some(ptr) = NonNull::new(raw) else {
            error!("allocation of {} bytes failed", layout.size());
            return Self::new();
        };
        init(ptr.as_ptr(), len);
        Self {
            ptr,
            len,
            layout: Some(layout),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Zero-fills the raw bytes of every element.
    pub fn clear(&mut self)
    where
        T: bytemuck::Zeroable,
    {
        self.clear_range(0, self.len);
    }

    /// Zero-fills the raw bytes of `count` elements starting at `base`.
    /// Panics if the range is out of bounds.
    pub fn clear_range(&mut self, base: usize, count: usize)
    where
        T: bytemuck::Zeroable,
    {
        assert!(
            base.checked_add(count).is_some_and(|end| end <= self.len),
            "clear_range out of bounds"
        );
        unsafe { self.ptr.as_ptr().add(base).write_bytes(0, count) };
    }

    /// Assigns `value` to every element.
    pub fn fill(&mut self, value: &T)
    where
        T: Clone,
    {
        self.fill_range(value, 0, self.len);
    }

    /// Assigns `value` to `count` elements starting at `base`.
    /// Panics if the range is out of bounds.
    pub fn fill_range(&mut self, value: &T, base: usize, count: usize)
    where
        T: Clone,
    {
        for slot in &mut self.as_mut_slice()[base..base + count] {
            *slot = value.clone();
        }
    }

    /// Copies `self.len()` elements from `src`. Panics if `src` is shorter.
    pub fn copy_from(&mut self, src: &[T])
    where
        T: Copy,
    {
        let len = self.len;
        self.as_mut_slice().copy_from_slice(&src[..len]);
    }

    /// Transfers ownership of the storage out of the buffer, leaving it
    /// empty. Returns `None` when there is nothing to release. Dropping the
    /// emptied buffer afterwards is a no-op.
    pub fn into_raw(mut self) -> Option<RawParts<T>> {
        let layout = self.layout.take()?;
        let parts = RawParts {
            ptr: self.ptr,
            len: self.len,
            layout,
        };
        self.ptr = NonNull::dangling();
        self.len = 0;
        Some(parts)
    }

    /// Reconstitutes a buffer from parts previously produced by
    /// [`FixedBuffer::into_raw`], so that elements and storage are released
    /// through the allocation path they came from.
    ///
    /// # Safety
    ///
    /// `parts` must come from `into_raw` on a buffer of the same element
    /// type, and the elements must still be live (not dropped or moved out
    /// through the raw pointer).
    pub unsafe fn from_raw(parts: RawParts<T>) -> Self {
        Self {
            ptr: parts.ptr,
            len: parts.len,
            layout: Some(parts.layout),
        }
    }
}

impl<T> Default for FixedBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for FixedBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for FixedBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for FixedBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T> Drop for FixedBuffer<T> {
    fn drop(&mut self) {
        let Some(layout) = self.layout.take() else {
            return;
        };
        unsafe {
            std::ptr::drop_in_place(std::ptr::slice_from_raw_parts_mut(
                self.ptr.as_ptr(),
                self.len,
            ));
            dealloc(self.ptr.as_ptr() as *mut u8, layout);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_alloc_default_initializes_every_element() {
        let buf = FixedBuffer::<u32>::alloc(64);
        assert_eq!(buf.len(), 64);
        assert!(buf.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_alloc_with_clones_value() {
        let buf = FixedBuffer::alloc_with(5, &7i32);
        assert_eq!(buf.as_slice(), &[7, 7, 7, 7, 7]);
    }

    #[test]
    fn test_zero_length_allocation_is_empty() {
        let buf = FixedBuffer::<f32>::alloc(0);
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn test_aligned_allocation_respects_alignment() {
        let buf = FixedBuffer::<f32>::alloc_aligned(64, 16);
        assert_eq!(buf.len(), 16);
        assert_eq!(buf.as_slice().as_ptr() as usize % 64, 0);
    }

    #[test]
    fn test_fill_and_clear() {
        let mut buf = FixedBuffer::<u8>::alloc(8);
        buf.fill(&0xab);
        assert!(buf.iter().all(|&b| b == 0xab));
        buf.clear_range(2, 4);
        assert_eq!(buf.as_slice(), &[0xab, 0xab, 0, 0, 0, 0, 0xab, 0xab]);
        buf.clear();
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_fill_range() {
        let mut buf = FixedBuffer::<i32>::alloc(6);
        buf.fill_range(&-1, 1, 3);
        assert_eq!(buf.as_slice(), &[0, -1, -1, -1, 0, 0]);
    }

    #[test]
    fn test_copy_from() {
        let mut buf = FixedBuffer::<u16>::alloc(4);
        buf.copy_from(&[1, 2, 3, 4]);
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_into_raw_empties_buffer_without_double_free() {
        let buf = FixedBuffer::alloc_with(3, &9u64);
        let parts = buf.into_raw().unwrap();
        assert_eq!(parts.len(), 3);
        // re-adopt so the storage is released exactly once
        let restored = unsafe { FixedBuffer::from_raw(parts) };
        assert_eq!(restored.as_slice(), &[9, 9, 9]);
    }

    #[test]
    fn test_into_raw_on_empty_buffer_is_none() {
        let buf = FixedBuffer::<u8>::new();
        assert!(buf.into_raw().is_none());
    }

    #[test]
    fn test_drop_runs_element_destructors() {
        let marker = Rc::new(());
        {
            let _buf = FixedBuffer::alloc_with(10, &Rc::clone(&marker));
            assert_eq!(Rc::strong_count(&marker), 11);
        }
        assert_eq!(Rc::strong_count(&marker), 1);
    }

    #[test]
    #[should_panic(expected = "clear_range out of bounds")]
    fn test_clear_range_out_of_bounds_panics() {
        let mut buf = FixedBuffer::<u8>::alloc(4);
        buf.clear_range(2, 4);
    }

    #[test]
    #[should_panic(expected = "clear_range out of bounds")]
    fn test_clear_range_overflowing_end_panics() {
        let mut buf = FixedBuffer::<u8>::alloc(4);
        buf.clear_range(usize::MAX, 2);
    }
}
