//! Helpers shared by the unit tests of this crate.

use crate::buffer::RegionAllocator;
use crate::error::{Result, ShellError};
use std::cell::Cell;
use std::collections::VecDeque;
use std::io::{self, Read};
use std::rc::Rc;
use std::sync::{Mutex, MutexGuard, OnceLock};

/// Serializes tests that change the working directory or fork children.
///
/// `wait` collects any child of the process, so two tests reaping at the same
/// time would steal each other's children.
pub(crate) fn lock_process() -> MutexGuard<'static, ()> {
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Counts region allocations and releases.
#[derive(Debug, Default)]
pub(crate) struct Ledger {
    allocated: Cell<usize>,
    released: Cell<usize>,
}

impl Ledger {
    pub(crate) fn allocated(&self) -> usize {
        self.allocated.get()
    }

    pub(crate) fn released(&self) -> usize {
        self.released.get()
    }
}

#[derive(Debug, Default)]
pub(crate) struct TrackedRegion {
    bytes: Vec<u8>,
    ledger: Option<Rc<Ledger>>,
}

impl AsRef<[u8]> for TrackedRegion {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsMut<[u8]> for TrackedRegion {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl Drop for TrackedRegion {
    fn drop(&mut self) {
        if let Some(ledger) = &self.ledger {
            ledger.released.set(ledger.released.get() + 1);
        }
    }
}

/// Allocator whose contiguity answers come from a script.
///
/// Each growth pops the next answer; an exhausted script means "not
/// contiguous".
#[derive(Debug)]
pub(crate) struct ScriptedAllocator {
    contiguous: VecDeque<bool>,
    ledger: Rc<Ledger>,
    fail_after: Option<usize>,
}

impl ScriptedAllocator {
    pub(crate) fn new(contiguous: Vec<bool>) -> Self {
        Self {
            contiguous: contiguous.into(),
            ledger: Rc::new(Ledger::default()),
            fail_after: None,
        }
    }

    /// Refuse every allocation once `count` regions were handed out.
    pub(crate) fn fail_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    pub(crate) fn ledger(&self) -> Rc<Ledger> {
        Rc::clone(&self.ledger)
    }
}

impl RegionAllocator for ScriptedAllocator {
    type Region = TrackedRegion;

    fn allocate(&mut self, len: usize) -> Result<TrackedRegion> {
        if self
            .fail_after
            .is_some_and(|limit| self.ledger.allocated() >= limit)
        {
            return Err(ShellError::OutOfMemory { requested: len });
        }
        self.ledger.allocated.set(self.ledger.allocated() + 1);
        Ok(TrackedRegion {
            bytes: vec![0; len],
            ledger: Some(Rc::clone(&self.ledger)),
        })
    }

    fn extend_in_place(&mut self, region: &mut TrackedRegion, additional: usize) -> bool {
        if !self.contiguous.pop_front().unwrap_or(false) {
            return false;
        }
        let len = region.bytes.len();
        region.bytes.resize(len + additional, 0);
        true
    }
}

/// Reader that hands out at most `chunk` bytes per call.
pub(crate) struct Chunked<'a> {
    data: &'a [u8],
    chunk: usize,
}

impl<'a> Chunked<'a> {
    pub(crate) fn new(data: &'a [u8], chunk: usize) -> Self {
        Self { data, chunk }
    }
}

impl Read for Chunked<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.chunk.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}
