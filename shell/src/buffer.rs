//! Line acquisition over a byte region that grows in fixed increments.
//!
//! [`LineBuffer`] reads straight from a [`Read`] source into memory it owns.
//! When a read fills the region without producing a terminator, the region
//! grows by one increment: contiguously when the allocator can extend it,
//! otherwise by moving the content into a fresh, larger region. Bytes read
//! past the end of a line stay in the region for the next call.

use crate::error::{Result, ShellError};
use std::io::{ErrorKind, Read};
use tracing::{debug, trace};

/// Source of the memory regions backing a [`LineBuffer`].
pub trait RegionAllocator {
    /// The region type. `Default` must be an empty region that owns nothing.
    type Region: AsRef<[u8]> + AsMut<[u8]> + Default;

    /// Allocate a zeroed region of exactly `len` bytes.
    fn allocate(&mut self, len: usize) -> Result<Self::Region>;

    /// Extend `region` by `additional` zeroed bytes without moving it.
    ///
    /// Returns false when the memory right after the region is not available,
    /// in which case `region` must be left untouched.
    fn extend_in_place(&mut self, region: &mut Self::Region, additional: usize) -> bool;
}

/// Regions on the global heap.
///
/// A region extends in place only while its vector still has spare capacity.
/// Regions are reserved exactly, so in practice growth takes the copy path.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAllocator;

impl RegionAllocator for HeapAllocator {
    type Region = Vec<u8>;

    fn allocate(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut region = Vec::new();
        region
            .try_reserve_exact(len)
            .map_err(|_| ShellError::OutOfMemory { requested: len })?;
        region.resize(len, 0);
        Ok(region)
    }

    fn extend_in_place(&mut self, region: &mut Vec<u8>, additional: usize) -> bool {
        if region.capacity() - region.len() < additional {
            return false;
        }
        let len = region.len();
        region.resize(len + additional, 0);
        true
    }
}

/// Owned, growable buffer holding the line currently being read.
///
/// Capacity is always a multiple of the growth increment and growth never
/// discards bytes already read. The region is allocated on the first read.
pub struct LineBuffer<A: RegionAllocator = HeapAllocator> {
    allocator: A,
    region: A::Region,
    increment: usize,
    /// Bytes before this offset were handed out as a line.
    consumed: usize,
    /// Bytes before this offset came from the source.
    filled: usize,
    /// Length of the line last handed out.
    line_len: usize,
}

impl LineBuffer {
    pub fn new(increment: usize) -> Self {
        Self::with_allocator(HeapAllocator, increment)
    }
}

impl<A: RegionAllocator> LineBuffer<A> {
    pub fn with_allocator(allocator: A, increment: usize) -> Self {
        Self {
            allocator,
            region: A::Region::default(),
            increment,
            consumed: 0,
            filled: 0,
            line_len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.region.as_ref().len()
    }

    pub fn increment(&self) -> usize {
        self.increment
    }

    /// Bytes already read from the source but not yet returned as a line.
    pub fn pending(&self) -> usize {
        self.filled - self.consumed
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Read the next line from `source`.
    ///
    /// The returned slice excludes its terminator, a newline or a NUL byte.
    /// Returns `Ok(None)` once the source is exhausted and nothing is
    /// pending; a final line without a terminator is still returned.
    pub fn read_line<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<Option<&[u8]>> {
        if self.next_line(source)? {
            Ok(Some(self.line()))
        } else {
            Ok(None)
        }
    }

    /// The line produced by the last successful [`next_line`](Self::next_line).
    pub fn line(&self) -> &[u8] {
        &self.region.as_ref()[..self.line_len]
    }

    /// Advance to the next line, returning false at end of input.
    ///
    /// A read interrupted by a signal yields [`ShellError::Interrupted`] and
    /// keeps every byte read so far, so the call can simply be repeated.
    pub fn next_line<R: Read + ?Sized>(&mut self, source: &mut R) -> Result<bool> {
        self.discard_consumed();

        let mut scanned = 0;
        loop {
            if let Some(end) = self.find_terminator(scanned) {
                self.line_len = end;
                self.consumed = end + 1;
                trace!(len = end, pending = self.pending(), "line complete");
                return Ok(true);
            }
            scanned = self.filled;

            if self.filled == self.capacity() {
                self.grow()?;
            }

            let filled = self.filled;
            let read = match source.read(&mut self.region.as_mut()[filled..]) {
                Ok(read) => read,
                Err(err) if err.kind() == ErrorKind::Interrupted => {
                    return Err(ShellError::Interrupted);
                }
                Err(err) => return Err(ShellError::Read(err)),
            };

            if read == 0 {
                if self.filled == 0 {
                    return Ok(false);
                }
                self.line_len = self.filled;
                self.consumed = self.filled;
                return Ok(true);
            }
            self.filled += read;
        }
    }

    fn find_terminator(&self, from: usize) -> Option<usize> {
        self.region.as_ref()[from..self.filled]
            .iter()
            .position(|&byte| byte == b'\n' || byte == 0)
            .map(|offset| from + offset)
    }

    /// Move bytes left over from the previous read to the front.
    fn discard_consumed(&mut self) {
        if self.consumed == 0 {
            return;
        }
        let (consumed, filled) = (self.consumed, self.filled);
        self.region.as_mut().copy_within(consumed..filled, 0);
        self.filled = filled - consumed;
        self.consumed = 0;
    }

    /// Add one increment of capacity, keeping the first `filled` bytes.
    ///
    /// The very first call allocates; an empty region has nothing to extend.
    fn grow(&mut self) -> Result<()> {
        let capacity = self.capacity();
        let grown = capacity
            .checked_add(self.increment)
            .ok_or(ShellError::OutOfMemory {
                requested: usize::MAX,
            })?;

        if capacity > 0 && self.allocator.extend_in_place(&mut self.region, self.increment) {
            debug!(capacity = grown, "line buffer extended in place");
            return Ok(());
        }

        let mut fresh = self.allocator.allocate(grown)?;
        fresh.as_mut()[..self.filled].copy_from_slice(&self.region.as_ref()[..self.filled]);
        // The old region is released here, after its content was copied.
        self.region = fresh;
        debug!(capacity = grown, copied = self.filled, "line buffer moved to a new region");
        Ok(())
    }
}

impl<A: RegionAllocator> std::fmt::Debug for LineBuffer<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineBuffer")
            .field("capacity", &self.capacity())
            .field("increment", &self.increment)
            .field("consumed", &self.consumed)
            .field("filled", &self.filled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Chunked, ScriptedAllocator};
    use std::io::{self, Cursor};

    fn long_line(len: usize) -> Vec<u8> {
        (0..len).map(|i| b'a' + (i % 26) as u8).collect()
    }

    #[test]
    fn short_line_needs_no_growth() {
        let allocator = ScriptedAllocator::new(vec![]);
        let ledger = allocator.ledger();
        let mut buffer = LineBuffer::with_allocator(allocator, 16);

        let line = buffer
            .read_line(&mut Cursor::new(b"echo hi\n".to_vec()))
            .unwrap();
        assert_eq!(line, Some(&b"echo hi"[..]));
        assert_eq!(buffer.capacity(), 16);
        assert_eq!(ledger.allocated(), 1);
        assert_eq!(ledger.released(), 0);
    }

    #[test]
    fn long_line_survives_growth_in_place() {
        let allocator = ScriptedAllocator::new(vec![true; 8]);
        let ledger = allocator.ledger();
        let mut buffer = LineBuffer::with_allocator(allocator, 8);

        let content = long_line(30);
        let mut input = content.clone();
        input.push(b'\n');

        let line = buffer.read_line(&mut Chunked::new(&input, 5)).unwrap();
        assert_eq!(line, Some(content.as_slice()));
        assert_eq!(buffer.capacity(), 32);
        // Only the initial region was ever allocated.
        assert_eq!(ledger.allocated(), 1);
        assert_eq!(ledger.released(), 0);
    }

    #[test]
    fn long_line_survives_growth_by_copy() {
        let allocator = ScriptedAllocator::new(vec![false; 8]);
        let ledger = allocator.ledger();
        let mut buffer = LineBuffer::with_allocator(allocator, 8);

        let content = long_line(30);
        let mut input = content.clone();
        input.push(b'\n');

        let line = buffer.read_line(&mut Chunked::new(&input, 5)).unwrap();
        assert_eq!(line, Some(content.as_slice()));
        assert_eq!(buffer.capacity(), 32);
        assert_eq!(ledger.allocated(), 4);
        assert_eq!(ledger.released(), 3);
    }

    #[test]
    fn mixed_growth_paths_keep_content() {
        let allocator = ScriptedAllocator::new(vec![true, false, true, false, false]);
        let ledger = allocator.ledger();
        let mut buffer = LineBuffer::with_allocator(allocator, 4);

        let content = long_line(21);
        let mut input = content.clone();
        input.push(b'\n');

        let line = buffer.read_line(&mut Chunked::new(&input, 3)).unwrap();
        assert_eq!(line, Some(content.as_slice()));
        assert_eq!(buffer.capacity() % 4, 0);
        assert!(buffer.capacity() >= 22);
        assert_eq!(ledger.allocated() - ledger.released(), 1);
    }

    #[test]
    fn bulk_input_is_split_into_lines() {
        let mut buffer = LineBuffer::new(64);
        let mut input = Cursor::new(b"a b\ncd\n\nlast".to_vec());

        assert_eq!(buffer.read_line(&mut input).unwrap(), Some(&b"a b"[..]));
        assert_eq!(buffer.pending(), 8);
        assert_eq!(buffer.read_line(&mut input).unwrap(), Some(&b"cd"[..]));
        assert_eq!(buffer.read_line(&mut input).unwrap(), Some(&b""[..]));
        assert_eq!(buffer.read_line(&mut input).unwrap(), Some(&b"last"[..]));
        assert_eq!(buffer.read_line(&mut input).unwrap(), None);
    }

    #[test]
    fn leftover_bytes_carry_across_growth() {
        let mut buffer = LineBuffer::new(8);
        let mut input = Chunked::new(b"ab\ncdefghijklmnop\n", 6);

        assert_eq!(buffer.read_line(&mut input).unwrap(), Some(&b"ab"[..]));
        assert_eq!(
            buffer.read_line(&mut input).unwrap(),
            Some(&b"cdefghijklmnop"[..])
        );
        assert_eq!(buffer.capacity() % 8, 0);
    }

    #[test]
    fn immediate_end_of_input_is_not_an_error() {
        let mut buffer = LineBuffer::new(16);
        let line = buffer.read_line(&mut Cursor::new(Vec::new())).unwrap();
        assert_eq!(line, None);
    }

    #[test]
    fn nul_byte_terminates_a_line() {
        let mut buffer = LineBuffer::new(16);
        let mut input = Cursor::new(b"/bin/true\0rest\n".to_vec());
        assert_eq!(buffer.read_line(&mut input).unwrap(), Some(&b"/bin/true"[..]));
        assert_eq!(buffer.read_line(&mut input).unwrap(), Some(&b"rest"[..]));
    }

    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("device gone"))
        }
    }

    #[test]
    fn read_failure_is_reported() {
        let mut buffer = LineBuffer::new(16);
        let err = buffer.read_line(&mut Failing).unwrap_err();
        assert!(matches!(err, ShellError::Read(_)));
        assert!(!err.is_fatal());
    }

    /// Delivers "ec", then an EINTR, then "ho\n".
    struct InterruptedOnce {
        step: usize,
    }

    impl Read for InterruptedOnce {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.step += 1;
            let chunk: &[u8] = match self.step {
                1 => b"ec",
                2 => return Err(io::Error::from(ErrorKind::Interrupted)),
                3 => b"ho\n",
                _ => b"",
            };
            buf[..chunk.len()].copy_from_slice(chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn interrupted_read_keeps_partial_line() {
        let mut buffer = LineBuffer::new(16);
        let mut input = InterruptedOnce { step: 0 };

        assert!(matches!(
            buffer.read_line(&mut input),
            Err(ShellError::Interrupted)
        ));
        assert_eq!(buffer.read_line(&mut input).unwrap(), Some(&b"echo"[..]));
    }

    #[test]
    fn allocation_failure_is_fatal() {
        let allocator = ScriptedAllocator::new(vec![false; 4]).fail_after(2);
        let mut buffer = LineBuffer::with_allocator(allocator, 4);

        let input = long_line(20);
        let err = buffer
            .read_line(&mut Chunked::new(&input, 4))
            .unwrap_err();
        assert!(matches!(err, ShellError::OutOfMemory { requested: 12 }));
        assert!(err.is_fatal());
    }

    #[test]
    fn dropping_releases_every_region_once() {
        let allocator = ScriptedAllocator::new(vec![false; 8]);
        let ledger = allocator.ledger();
        let mut buffer = LineBuffer::with_allocator(allocator, 4);

        let mut input = long_line(17);
        input.push(b'\n');
        buffer.read_line(&mut Chunked::new(&input, 4)).unwrap();
        assert_eq!(ledger.allocated() - ledger.released(), 1);

        drop(buffer);
        assert_eq!(ledger.allocated(), ledger.released());
    }

    #[test]
    fn heap_regions_handle_lines_longer_than_one_increment() {
        let mut buffer = LineBuffer::new(4096);
        let content = long_line(10_000);
        let mut input = content.clone();
        input.push(b'\n');

        let line = buffer.read_line(&mut Cursor::new(input)).unwrap();
        assert_eq!(line, Some(content.as_slice()));
        assert_eq!(buffer.capacity(), 12_288);
    }
}
