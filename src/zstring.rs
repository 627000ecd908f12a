//! Reference-counted byte string
//!
//! A `ZString` is a handle to a shared, NUL-terminated byte buffer. Cloning a
//! handle bumps the reference count and dropping one releases it; the buffer
//! is freed with the last handle. Every mutating operation checks whether the
//! handle is the sole owner and copies the buffer first when it is not, so a
//! mutation through one handle is never observed through another.
//!
//! The buffer always carries a trailing NUL after the logical content, which
//! makes [`ZString::as_cstr`] free and keeps `capacity() > len()`.

use std::borrow::Cow;
use std::ffi::CStr;
use std::fmt;
use std::rc::Rc;

#[derive(Clone)]
pub struct ZString {
    // Content followed by one NUL byte.
    buf: Rc<Vec<u8>>,
}

impl ZString {
    /// Allocate a new string holding a copy of `bytes`
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            buf: Rc::new(with_nul(bytes, bytes.len() + 1)),
        }
    }

    /// Allocate an empty string with room for `capacity` bytes of content
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Rc::new(with_nul(&[], capacity + 1)),
        }
    }

    /// Logical length in bytes, excluding the trailing NUL
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes available without reallocating, including room for the NUL
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Number of handles sharing this buffer
    #[inline]
    pub fn refcount(&self) -> usize {
        Rc::strong_count(&self.buf)
    }

    /// True when both handles share one buffer
    pub fn ptr_eq(a: &ZString, b: &ZString) -> bool {
        Rc::ptr_eq(&a.buf, &b.buf)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len()]
    }

    /// C-style view. Content past an embedded NUL is not visible through it.
    pub fn as_cstr(&self) -> &CStr {
        CStr::from_bytes_until_nul(&self.buf).unwrap_or_default()
    }

    pub fn to_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// Replace the content with a copy of `from`.
    ///
    /// A sole owner keeps its buffer; a shared one gets a fresh buffer so
    /// other holders are untouched.
    pub fn copy_from(&mut self, from: &ZString) {
        if ZString::ptr_eq(self, from) {
            return;
        }
        match Rc::get_mut(&mut self.buf) {
            Some(buf) => {
                buf.clear();
                reserve_geometric(buf, from.len() + 1);
                buf.extend_from_slice(from.as_bytes());
                buf.push(0);
            }
            None => {
                self.buf = Rc::new(with_nul(from.as_bytes(), from.len() + 1));
            }
        }
    }

    /// Write `bytes` at offset `at`; the new length is `at + bytes.len()`.
    ///
    /// `at` past the current end is clamped to the end. Capacity grows
    /// geometrically and never shrinks.
    pub fn update(&mut self, at: usize, bytes: &[u8]) {
        debug_assert!(at <= self.len(), "update offset past end of string");
        let at = at.min(self.len());
        let needed = at + bytes.len() + 1;
        if Rc::get_mut(&mut self.buf).is_none() {
            self.buf = Rc::new(with_nul(&self.buf[..at], needed));
        }
        // Sole owner from here on, so this never clones.
        let buf = Rc::make_mut(&mut self.buf);
        buf.truncate(at);
        reserve_geometric(buf, needed);
        buf.extend_from_slice(bytes);
        buf.push(0);
    }

    /// Append the content of `from`
    pub fn extend(&mut self, from: &ZString) {
        if from.is_empty() {
            return;
        }
        // `from` may share our buffer; hold our own handle on its bytes.
        let src = from.clone();
        let at = self.len();
        self.update(at, src.as_bytes());
    }

    /// Append raw bytes
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        let at = self.len();
        self.update(at, bytes);
    }
}

/// Build a NUL-terminated buffer with at least `capacity` bytes reserved
fn with_nul(bytes: &[u8], capacity: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity(capacity.max(bytes.len() + 1));
    buf.extend_from_slice(bytes);
    buf.push(0);
    buf
}

fn reserve_geometric(buf: &mut Vec<u8>, needed: usize) {
    if needed > buf.capacity() {
        let target = needed.max(buf.capacity() * 2);
        buf.reserve_exact(target - buf.len());
    }
}

impl Default for ZString {
    fn default() -> Self {
        Self::new(b"")
    }
}

impl PartialEq for ZString {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.as_bytes() == other.as_bytes()
    }
}

impl Eq for ZString {}

impl PartialOrd for ZString {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ZString {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl fmt::Debug for ZString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZString({:?})", self.to_str_lossy())
    }
}

impl fmt::Display for ZString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_lossy())
    }
}

impl From<&str> for ZString {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl From<&[u8]> for ZString {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl From<String> for ZString {
    fn from(s: String) -> Self {
        let mut buf = s.into_bytes();
        buf.push(0);
        Self { buf: Rc::new(buf) }
    }
}
