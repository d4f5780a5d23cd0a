//! Growable sequences and strings whose storage lives in an [`Allocator`].
//!
//! [`ArenaVec`] and [`ArenaStr`] are `Copy` handles: they never own memory,
//! they only describe a range of the arena region. Growing an `ArenaVec`
//! allocates a fresh buffer twice the size and copies the old bytes over;
//! the old buffer stays behind as garbage until the arena is dropped.
//!
//! Elements are stored in a fixed-size byte encoding described by
//! [`ArenaValue`], so any `Copy` value with a stable width can live in an
//! arena vector without `unsafe`.

use std::fmt;
use std::marker::PhantomData;

use crate::arena::{Allocator, ArenaPtr};

/// A fixed-width value that can be stored in arena bytes.
pub trait ArenaValue: Copy {
    /// Encoded width in bytes.
    const SIZE: usize;

    /// Encode into exactly `SIZE` bytes.
    fn store(self, out: &mut [u8]);

    /// Decode from exactly `SIZE` bytes.
    fn load(bytes: &[u8]) -> Self;
}

#[inline]
pub(crate) fn load_u32(bytes: &[u8]) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(raw)
}

#[inline]
fn load_8(bytes: &[u8]) -> [u8; 8] {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[..8]);
    raw
}

impl ArenaValue for u8 {
    const SIZE: usize = 1;
    fn store(self, out: &mut [u8]) {
        out[0] = self;
    }
    fn load(bytes: &[u8]) -> Self {
        bytes[0]
    }
}

impl ArenaValue for bool {
    const SIZE: usize = 1;
    fn store(self, out: &mut [u8]) {
        out[0] = u8::from(self);
    }
    fn load(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

impl ArenaValue for u32 {
    const SIZE: usize = 4;
    fn store(self, out: &mut [u8]) {
        out[..4].copy_from_slice(&self.to_le_bytes());
    }
    fn load(bytes: &[u8]) -> Self {
        load_u32(bytes)
    }
}

impl ArenaValue for i64 {
    const SIZE: usize = 8;
    fn store(self, out: &mut [u8]) {
        out[..8].copy_from_slice(&self.to_le_bytes());
    }
    fn load(bytes: &[u8]) -> Self {
        i64::from_le_bytes(load_8(bytes))
    }
}

impl ArenaValue for f64 {
    const SIZE: usize = 8;
    fn store(self, out: &mut [u8]) {
        out[..8].copy_from_slice(&self.to_bits().to_le_bytes());
    }
    fn load(bytes: &[u8]) -> Self {
        f64::from_bits(u64::from_le_bytes(load_8(bytes)))
    }
}

/// Ordered sequence stored in arena memory.
///
/// Create one with [`ArenaVec::reserve`] (or use [`ArenaVec::EMPTY`]) and
/// grow it with [`ArenaVec::push_back`]. `len <= capacity` always holds and
/// capacity never shrinks.
pub struct ArenaVec<T> {
    ptr: ArenaPtr,
    len: u32,
    cap: u32,
    _marker: PhantomData<T>,
}

impl<T> Clone for ArenaVec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ArenaVec<T> {}

impl<T> PartialEq for ArenaVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr && self.len == other.len && self.cap == other.cap
    }
}

impl<T> Eq for ArenaVec<T> {}

impl<T> std::hash::Hash for ArenaVec<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.ptr.hash(state);
        self.len.hash(state);
    }
}

impl<T> Default for ArenaVec<T> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl<T> fmt::Debug for ArenaVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArenaVec({:?}, len={}, cap={})", self.ptr, self.len, self.cap)
    }
}

impl<T> ArenaVec<T> {
    /// A vector with no storage. Pushing onto it allocates.
    pub const EMPTY: Self = ArenaVec {
        ptr: ArenaPtr::NULL,
        len: 0,
        cap: 0,
        _marker: PhantomData,
    };

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        self.cap as usize
    }
}

impl<T: ArenaValue> ArenaVec<T> {
    /// Allocate storage for `n` elements (at least one).
    #[track_caller]
    pub fn reserve(al: &mut Allocator, n: usize) -> Self {
        let cap = n.max(1);
        ArenaVec {
            ptr: al.alloc_array(T::SIZE, cap),
            len: 0,
            cap: to_u32(cap),
            _marker: PhantomData,
        }
    }

    /// Copy `items` into a freshly reserved vector.
    #[track_caller]
    pub fn from_slice(al: &mut Allocator, items: &[T]) -> Self {
        if items.is_empty() {
            return Self::EMPTY;
        }
        let mut v = Self::reserve(al, items.len());
        for &item in items {
            v.push_back(al, item);
        }
        v
    }

    /// Append `x`, doubling capacity through a fresh allocation when full.
    #[track_caller]
    pub fn push_back(&mut self, al: &mut Allocator, x: T) {
        if self.len == self.cap {
            let new_cap = (self.capacity() * 2).max(1);
            let new_ptr = al.alloc_array(T::SIZE, new_cap);
            al.copy_within(self.ptr, new_ptr, self.len() * T::SIZE);
            self.ptr = new_ptr;
            self.cap = to_u32(new_cap);
        }
        let at = self.slot(self.len());
        x.store(al.bytes_mut(at, T::SIZE));
        self.len += 1;
    }

    /// Element at `index`.
    ///
    /// # Panics
    /// Panics if `index >= len`.
    #[track_caller]
    pub fn get(&self, al: &Allocator, index: usize) -> T {
        assert!(
            index < self.len(),
            "ArenaVec index {index} out of bounds (len {})",
            self.len
        );
        T::load(al.bytes(self.slot(index), T::SIZE))
    }

    /// Overwrite the element at `index`.
    ///
    /// # Panics
    /// Panics if `index >= len`.
    #[track_caller]
    pub fn set(&self, al: &mut Allocator, index: usize, x: T) {
        assert!(
            index < self.len(),
            "ArenaVec index {index} out of bounds (len {})",
            self.len
        );
        x.store(al.bytes_mut(self.slot(index), T::SIZE));
    }

    pub fn iter<'a>(&self, al: &'a Allocator) -> impl Iterator<Item = T> + 'a
    where
        T: 'a,
    {
        let this = *self;
        (0..this.len()).map(move |i| this.get(al, i))
    }

    pub fn to_vec(&self, al: &Allocator) -> Vec<T> {
        self.iter(al).collect()
    }

    #[inline]
    fn slot(&self, index: usize) -> ArenaPtr {
        ArenaPtr::from_raw(self.ptr.raw() + to_u32(index * T::SIZE))
    }
}

impl<T: ArenaValue> ArenaValue for ArenaVec<T> {
    const SIZE: usize = 12;
    fn store(self, out: &mut [u8]) {
        self.ptr.raw().store(&mut out[0..4]);
        self.len.store(&mut out[4..8]);
        self.cap.store(&mut out[8..12]);
    }
    fn load(bytes: &[u8]) -> Self {
        ArenaVec {
            ptr: ArenaPtr::from_raw(load_u32(&bytes[0..4])),
            len: load_u32(&bytes[4..8]),
            cap: load_u32(&bytes[8..12]),
            _marker: PhantomData,
        }
    }
}

/// Arena offsets are bounded by the allocator budget, which fits in `u32`.
#[inline]
#[track_caller]
fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or_else(|_| panic!("arena container length {n} exceeds u32::MAX"))
}

/// UTF-8 string stored in arena memory, not NUL-terminated.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct ArenaStr {
    ptr: ArenaPtr,
    len: u32,
}

impl ArenaStr {
    pub const EMPTY: ArenaStr = ArenaStr {
        ptr: ArenaPtr::NULL,
        len: 0,
    };

    /// Copy `s` into the arena.
    #[track_caller]
    pub fn from_str(al: &mut Allocator, s: &str) -> Self {
        if s.is_empty() {
            return Self::EMPTY;
        }
        let ptr = al.alloc(s.len());
        al.bytes_mut(ptr, s.len()).copy_from_slice(s.as_bytes());
        ArenaStr {
            ptr,
            len: to_u32(s.len()),
        }
    }

    pub fn as_str<'a>(&self, al: &'a Allocator) -> &'a str {
        match std::str::from_utf8(al.bytes(self.ptr, self.len())) {
            Ok(s) => s,
            Err(_) => unreachable!("ArenaStr is only ever built from UTF-8 input"),
        }
    }

    /// Copy into a fresh allocation with a trailing NUL terminator.
    ///
    /// The returned handle's length includes the terminator.
    #[track_caller]
    pub fn c_str(&self, al: &mut Allocator) -> ArenaStr {
        let n = self.len();
        let ptr = al.alloc(n + 1);
        al.copy_within(self.ptr, ptr, n);
        al.bytes_mut(ptr, n + 1)[n] = 0;
        ArenaStr {
            ptr,
            len: to_u32(n + 1),
        }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for ArenaStr {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for ArenaStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArenaStr({:?}, len={})", self.ptr, self.len)
    }
}

impl ArenaValue for ArenaStr {
    const SIZE: usize = 8;
    fn store(self, out: &mut [u8]) {
        self.ptr.raw().store(&mut out[0..4]);
        self.len.store(&mut out[4..8]);
    }
    fn load(bytes: &[u8]) -> Self {
        ArenaStr {
            ptr: ArenaPtr::from_raw(load_u32(&bytes[0..4])),
            len: load_u32(&bytes[4..8]),
        }
    }
}
