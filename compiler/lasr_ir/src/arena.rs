//! Bump allocator backing every IR node and payload.
//!
//! The [`Allocator`] owns one growable byte region with a fixed budget.
//! Allocation only ever moves the bump offset forward; nothing is freed
//! until the allocator itself is dropped. Handles into the region are
//! plain offsets ([`ArenaPtr`]), so the region can be moved or cloned
//! without fixing up pointers.

use std::fmt;

use thiserror::Error;

/// Allocation exhaustion. Fatal for the translation unit being compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("arena out of memory: requested {requested} bytes with {used} of {total} bytes in use")]
pub struct AllocError {
    pub requested: usize,
    pub used: usize,
    pub total: usize,
}

/// Offset of an allocation inside an [`Allocator`] region.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ArenaPtr(u32);

impl ArenaPtr {
    /// Handle used by empty containers that never allocated.
    pub const NULL: ArenaPtr = ArenaPtr(u32::MAX);

    #[inline]
    pub const fn offset(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        ArenaPtr(raw)
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == u32::MAX
    }
}

impl fmt::Debug for ArenaPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "ArenaPtr::NULL")
        } else {
            write!(f, "ArenaPtr({:#x})", self.0)
        }
    }
}

impl Default for ArenaPtr {
    fn default() -> Self {
        Self::NULL
    }
}

/// Round `n` up to the allocator alignment.
#[inline]
const fn align(n: usize) -> usize {
    (n + Allocator::ALIGNMENT - 1) & !(Allocator::ALIGNMENT - 1)
}

/// Bump-pointer arena with a fixed byte budget.
///
/// # Invariants
///
/// - `region.len()` is the bump offset and is always a multiple of
///   [`Allocator::ALIGNMENT`].
/// - `region.len() <= size`.
/// - The offset never decreases.
#[derive(Clone)]
pub struct Allocator {
    region: Vec<u8>,
    size: usize,
}

impl Allocator {
    /// Every allocation starts on an 8-byte boundary.
    pub const ALIGNMENT: usize = 8;

    /// Budget used by [`Allocator::default`] (64 MiB). Memory is committed
    /// lazily, so a large budget costs nothing until it is used.
    pub const DEFAULT_SIZE: usize = 64 * 1024 * 1024;

    /// Create an allocator with a budget of `size` bytes.
    ///
    /// Offsets are `u32`, so the budget is clamped to `u32::MAX - 1`.
    pub fn new(size: usize) -> Self {
        let max = u32::MAX as usize - 1;
        Allocator {
            region: Vec::new(),
            size: size.min(max),
        }
    }

    /// Allocate `n` bytes, zero-initialized and 8-byte aligned.
    pub fn try_alloc(&mut self, n: usize) -> Result<ArenaPtr, AllocError> {
        let start = self.region.len();
        let end = start
            .checked_add(align(n))
            .filter(|&end| end <= self.size)
            .ok_or(AllocError {
                requested: n,
                used: start,
                total: self.size,
            })?;
        self.region.resize(end, 0);
        // `end <= size <= u32::MAX - 1`, so `start` fits.
        Ok(ArenaPtr(start as u32))
    }

    /// Allocate `n` bytes. Exhaustion aborts compilation of the unit.
    #[track_caller]
    pub fn alloc(&mut self, n: usize) -> ArenaPtr {
        match self.try_alloc(n) {
            Ok(ptr) => ptr,
            Err(err) => panic!("{err}"),
        }
    }

    /// Allocate room for `n` values of `elem_size` bytes each.
    #[track_caller]
    pub fn alloc_array(&mut self, elem_size: usize, n: usize) -> ArenaPtr {
        match elem_size.checked_mul(n) {
            Some(bytes) => self.alloc(bytes),
            None => panic!(
                "{}",
                AllocError {
                    requested: usize::MAX,
                    used: self.size_current(),
                    total: self.size,
                }
            ),
        }
    }

    /// Charge the budget for one node of type `T` stored in a typed pool.
    #[track_caller]
    pub fn charge<T>(&mut self) {
        self.alloc(std::mem::size_of::<T>());
    }

    /// Bytes `ptr..ptr + len` of the region.
    #[inline]
    pub fn bytes(&self, ptr: ArenaPtr, len: usize) -> &[u8] {
        if len == 0 {
            return &[];
        }
        &self.region[ptr.offset()..ptr.offset() + len]
    }

    /// Mutable bytes `ptr..ptr + len` of the region.
    #[inline]
    pub fn bytes_mut(&mut self, ptr: ArenaPtr, len: usize) -> &mut [u8] {
        if len == 0 {
            return &mut [];
        }
        &mut self.region[ptr.offset()..ptr.offset() + len]
    }

    /// Copy `len` bytes from `src` to `dst` within the region.
    pub fn copy_within(&mut self, src: ArenaPtr, dst: ArenaPtr, len: usize) {
        if len == 0 {
            return;
        }
        self.region
            .copy_within(src.offset()..src.offset() + len, dst.offset());
    }

    /// Bytes handed out so far (including alignment padding).
    #[inline]
    pub fn size_current(&self) -> usize {
        self.region.len()
    }

    /// Total budget in bytes.
    #[inline]
    pub fn size_total(&self) -> usize {
        self.size
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Allocator::new(Self::DEFAULT_SIZE)
    }
}

impl fmt::Debug for Allocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Allocator")
            .field("size_current", &self.size_current())
            .field("size_total", &self.size)
            .finish()
    }
}
