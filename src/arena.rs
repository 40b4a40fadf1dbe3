/*!
Chunked byte storage for decoded string content.

Decoded strings need somewhere stable to live: handing a caller a slice of
unescaped bytes must not be invalidated when some other string on the same
document is decoded later. A `Vec<u8>` can't promise that (it moves when it
grows), so the arena keeps a list of fixed-capacity chunks and only ever
appends to the newest one, within its capacity. A chunk that has been
started is never grown, moved, or dropped until [`ByteArena::reset`], which
takes the arena by `&mut` and so can't run while any handed-out slice is
still borrowed.

Allocations are addressed by [`ArenaSlice`] handles (chunk index + offset +
length) rather than pointers, so the handles stay `Copy` and the parser that
stores them stays `Send`.
*/

use std::{cell::RefCell, ptr, slice};

/// Granularity of fresh chunks.
const MIN_CHUNK: usize = 1024;

/// Capacity worth holding onto across resets.
///
/// A chunk bigger than this was grown for an unusually escape-heavy
/// document and gets released rather than pinned for the parser's lifetime.
const MAX_RETAINED: usize = 64 * 1024;

/**
A handle to a byte run stored in a [`ByteArena`].

The handle stays valid until the arena is reset.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ArenaSlice {
    chunk: u32,
    start: u32,
    len: u32,
}

impl ArenaSlice {
    /**
    The same run, shortened to `len` bytes.

    Unescaping never grows its input, so a decoded slice is re-addressed
    by truncating the handle of the raw copy it was decoded into.
    */
    #[inline]
    pub(crate) fn truncated(self, len: usize) -> Self {
        debug_assert!(len as u32 <= self.len);

        ArenaSlice {
            len: len as u32,
            ..self
        }
    }
}

/**
An append-only pool of byte chunks with stable addresses.

Allocation takes `&self` so that decoding can happen lazily behind shared
value handles; the interior `RefCell` is never held across a call boundary.
*/
#[derive(Debug, Default)]
pub(crate) struct ByteArena {
    chunks: RefCell<Vec<Vec<u8>>>,
}

impl ByteArena {
    /**
    Copy `bytes` into the arena.

    Returns the handle for the copy along with an exclusive view of it, so
    the caller can decode in place before publishing the (possibly
    truncated) handle.
    */
    pub(crate) fn alloc<'a>(&'a self, bytes: &[u8]) -> (ArenaSlice, &'a mut [u8]) {
        let mut chunks = self.chunks.borrow_mut();

        // only the newest chunk accepts writes, and only within the
        // capacity it was created with; anything else would move bytes
        // that outstanding slices point into
        let fits = match chunks.last() {
            Some(chunk) => chunk.capacity() - chunk.len() >= bytes.len(),
            None => false,
        };

        if !fits {
            let grown = chunks.last().map(|c| c.capacity() * 2).unwrap_or(0);
            let cap = MIN_CHUNK.max(grown).max(bytes.len());
            chunks.push(Vec::with_capacity(cap));
        }

        let chunk_index = chunks.len() - 1;
        let chunk = &mut chunks[chunk_index];
        let start = chunk.len();

        debug_assert!(start + bytes.len() <= chunk.capacity());

        // manually copy into the chunk instead of calling `extend_from_slice`;
        // a method that may reallocate would move bytes that outstanding
        // slices point into

        // SAFETY: the destination is within the chunk's reserved capacity
        // and does not overlap `bytes`. The written region lives in a chunk
        // that only ever grows within that capacity and is only dropped by
        // `reset`, which needs `&mut self` and therefore can't run while any
        // borrow of `self` is live. Each region is handed out exactly once,
        // here.
        let copied = unsafe {
            let dst = chunk.as_mut_ptr().add(start);
            ptr::copy_nonoverlapping(bytes.as_ptr(), dst, bytes.len());
            chunk.set_len(start + bytes.len());

            slice::from_raw_parts_mut(dst, bytes.len())
        };

        let handle = ArenaSlice {
            chunk: chunk_index as u32,
            start: start as u32,
            len: bytes.len() as u32,
        };

        (handle, copied)
    }

    /**
    Resolve a handle previously returned by [`alloc`](Self::alloc).
    */
    #[inline]
    pub(crate) fn get(&self, handle: ArenaSlice) -> &[u8] {
        let chunks = self.chunks.borrow();
        let chunk = &chunks[handle.chunk as usize];

        debug_assert!((handle.start + handle.len) as usize <= chunk.len());

        // SAFETY: chunk buffers are stable (see `alloc`) for as long as
        // this borrow of the arena lives, and the handle addresses bytes
        // that were fully written by `alloc` before it was constructed.
        unsafe { slice::from_raw_parts(chunk.as_ptr().add(handle.start as usize), handle.len as usize) }
    }

    /**
    Invalidate every outstanding handle and release all but a baseline
    working set of capacity.
    */
    pub(crate) fn reset(&mut self) {
        let chunks = self.chunks.get_mut();

        // chunk capacities grow monotonically, so the newest chunk is the
        // biggest; keep it as the working set unless it has ballooned
        let keep = chunks.pop().filter(|c| c.capacity() <= MAX_RETAINED);
        chunks.clear();

        if let Some(mut chunk) = keep {
            chunk.clear();
            chunks.push(chunk);
        }
    }
}
