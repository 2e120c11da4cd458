//! Engine core: ring lifecycle, slot arena, completion polling

mod accept;
mod read;
mod write;

use crate::completion::Completion;
use crate::conn::{ConnHandle, ConnRec, OpKind};
use crate::error::EngineError;
use crate::owner::Owner;
use crate::EngineCapacityKind;

use capacity::Capacity;
use capacity::Setting as CapacitySetting;

use io_uring::IoUring;
use ringmux_listener::{listen, local_port};
use slab::Slab;

use core::net::SocketAddr;
use std::os::fd::{AsRawFd, OwnedFd, RawFd};

/// Drives one io_uring instance over one listening socket and a fixed arena
/// of connection slots.
///
/// The engine has no loop or thread of its own. The caller enqueues
/// accepts, reads and writes against slot handles and drains finished
/// operations one at a time with [`poll`](ConnEngine::poll); every state
/// transition of a connection is an explicit caller action triggered by a
/// polled completion. For horizontal scaling, run one engine per thread —
/// the listeners share a port via SO_REUSEPORT and share nothing else.
pub struct ConnEngine {
    /// io_uring managed instance. Declared first so ring teardown runs
    /// before the records it may still reference are freed.
    ring: IoUring,
    /// The bound, listening socket. Closed when the engine drops.
    listener: OwnedFd,
    /// Connection slot arena. Records are boxed so the pointers handed to
    /// the kernel survive slab growth within capacity.
    conns: Slab<Box<ConnRec>>,
    /// Arena capacity; `add_conn` refuses to grow past it.
    slot_capacity: usize,
    /// Bumped on every slot allocation to invalidate stale handles.
    next_gen: u32,
}

/// Flat capacity plan used by [`ConnEngine::bind`]: one figure for the ring
/// depth and the slot arena alike.
#[derive(Clone, Debug)]
struct FlatCapacity(u32);

impl CapacitySetting<EngineCapacityKind> for FlatCapacity {
    fn setting(&self, _v: &EngineCapacityKind) -> usize {
        self.0 as usize
    }
}

impl ConnEngine {
    /// Bind `port` and create a ring of `queue_depth` entries, with as many
    /// connection slots as queue entries.
    ///
    /// Pass port `0` for an ephemeral port and query it back with
    /// [`local_port`](ConnEngine::local_port).
    pub fn bind(port: u16, queue_depth: u32) -> Result<Self, EngineError> {
        let caps =
            Capacity::<FlatCapacity, EngineCapacityKind>::with_planned(FlatCapacity(queue_depth));
        Self::with_capacity(port, caps)
    }

    /// Bind `port` and create the engine from planned capacities.
    ///
    /// `CoreQueue` sizes the ring, bounding how many operations the kernel
    /// tracks simultaneously; `ConnSlots` sizes the arena. Setup is
    /// all-or-nothing: the first failing step returns its error and no
    /// half-configured engine exists.
    pub fn with_capacity<H: CapacitySetting<EngineCapacityKind>>(
        port: u16,
        caps: Capacity<H, EngineCapacityKind>,
    ) -> Result<Self, EngineError> {
        let listener = listen(port).map_err(EngineError::Listener)?;
        let ring = IoUring::builder()
            .build(caps.of_unbounded(&EngineCapacityKind::CoreQueue) as u32)
            .map_err(|e| EngineError::RingCreate(e.to_string()))?;
        let slot_capacity = caps.of_unbounded(&EngineCapacityKind::ConnSlots);
        Ok(Self {
            ring,
            listener,
            conns: Slab::with_capacity(slot_capacity),
            slot_capacity,
            next_gen: 0,
        })
    }

    /// Allocate a connection slot and return its handle.
    pub fn add_conn(&mut self) -> Result<ConnHandle, EngineError> {
        if self.conns.len() >= self.slot_capacity {
            return Err(EngineError::SlotsFull(self.slot_capacity));
        }
        let gen = self.next_gen;
        self.next_gen = self.next_gen.wrapping_add(1);
        let index = self.conns.insert(Box::new(ConnRec::new(gen))) as u32;
        Ok(ConnHandle { index, gen })
    }

    /// Release a connection slot, closing its adopted socket if one is set.
    ///
    /// Refused while the kernel owns the record: its buffer and address
    /// fields are referenced by an in-flight operation and must outlive it.
    pub fn remove_conn(&mut self, conn: ConnHandle) -> Result<(), EngineError> {
        let rec = self.rec(conn)?;
        if rec.owner == Owner::Kernel {
            return Err(EngineError::InvalidOwnership(rec.owner, conn.index));
        }
        let rec = self.conns.remove(conn.index as usize);
        if let Some(fd) = rec.fd {
            unsafe { libc::close(fd) };
        }
        Ok(())
    }

    /// Store an accepted socket descriptor into a slot.
    ///
    /// Typically called with the result of an Accept completion, either on
    /// the slot that carried the accept or on a freshly added one.
    pub fn adopt_socket(&mut self, conn: ConnHandle, fd: RawFd) -> Result<(), EngineError> {
        if fd < 0 {
            return Err(EngineError::InvalidSocket(fd));
        }
        let rec = self.rec_mut(conn)?;
        if rec.owner == Owner::Kernel {
            return Err(EngineError::InvalidOwnership(rec.owner, conn.index));
        }
        rec.fd = Some(fd);
        Ok(())
    }

    /// Read-only view of a slot's buffer.
    ///
    /// Refused while the kernel owns the record; the bytes are meaningful
    /// up to the result count of the slot's last polled Read completion.
    pub fn buffer(&self, conn: ConnHandle) -> Result<&[u8], EngineError> {
        let rec = self.rec(conn)?;
        if rec.owner == Owner::Kernel {
            return Err(EngineError::InvalidOwnership(rec.owner, conn.index));
        }
        Ok(&rec.buf[..])
    }

    /// Peer address recorded by a completed Accept on this slot.
    pub fn peer_addr(&self, conn: ConnHandle) -> Result<Option<SocketAddr>, EngineError> {
        let rec = self.rec(conn)?;
        if rec.owner == Owner::Kernel {
            return Err(EngineError::InvalidOwnership(rec.owner, conn.index));
        }
        Ok(rec.peer_sockaddr())
    }

    /// The adopted socket descriptor of a slot, if any.
    pub fn socket_fd(&self, conn: ConnHandle) -> Result<Option<RawFd>, EngineError> {
        Ok(self.rec(conn)?.fd)
    }

    /// Raw descriptor of the listening socket.
    pub fn listener_fd(&self) -> RawFd {
        self.listener.as_raw_fd()
    }

    /// Port the listening socket is bound to.
    pub fn local_port(&self) -> Result<u16, EngineError> {
        local_port(&self.listener).map_err(EngineError::Listener)
    }

    /// Non-blocking check for one finished operation.
    ///
    /// Returns `Ok(None)` right away when nothing has completed — distinct
    /// from a completion that carries an error result. Otherwise the entry
    /// at the completion queue head is consumed, decoded back into the slot
    /// handle it was submitted with, the record is handed back to userspace
    /// and the typed completion is returned. One completion per call;
    /// callers drain in a loop.
    pub fn poll(&mut self) -> Result<Option<Completion>, EngineError> {
        let (user_data, result) = match self.ring.completion().next() {
            None => return Ok(None),
            Some(cqe) => (cqe.user_data(), cqe.result()),
        };
        let conn = ConnHandle::decode(user_data);
        let rec = match self.conns.get_mut(conn.index as usize) {
            Some(rec) if rec.gen == conn.gen => rec,
            _ => {
                return Err(EngineError::CompletionBug(
                    "completion for a vacant or reused slot",
                ))
            }
        };
        rec.owner = Owner::User;
        Ok(Some(match rec.op {
            OpKind::Accept => Completion::Accept { conn, result },
            OpKind::Read => Completion::Read { conn, result },
            OpKind::Write => Completion::Write { conn, result },
        }))
    }

    /// Push one prepared entry, stamped with the slot handle, and flush it
    /// to the kernel. The caller has already marked the record as
    /// kernel-owned; a failed push rolls that back.
    pub(crate) fn push_and_submit(
        &mut self,
        conn: ConnHandle,
        entry: io_uring::squeue::Entry,
    ) -> Result<(), EngineError> {
        let entry = entry.user_data(conn.encode());
        // SAFETY: every pointer inside the entry targets the boxed record
        // held in the arena, which is neither freed nor moved while the
        // kernel owns it (remove_conn refuses kernel-owned slots).
        let pushed = unsafe { self.ring.submission().push(&entry) };
        if pushed.is_err() {
            // Hand the record back so the caller may retry or release it.
            if let Some(rec) = self.conns.get_mut(conn.index as usize) {
                rec.owner = Owner::User;
            }
            return Err(EngineError::SubmissionPush);
        }
        match self.ring.submit() {
            Ok(_) => Ok(()),
            // The entry stays staged in the shared queue, so the record
            // remains kernel-owned; no rollback here.
            Err(e) => Err(EngineError::Submission(e.to_string())),
        }
    }

    #[inline]
    pub(crate) fn rec(&self, conn: ConnHandle) -> Result<&ConnRec, EngineError> {
        match self.conns.get(conn.index as usize) {
            Some(rec) if rec.gen == conn.gen => Ok(rec),
            _ => Err(EngineError::NotFound(conn)),
        }
    }

    #[inline]
    pub(crate) fn rec_mut(&mut self, conn: ConnHandle) -> Result<&mut ConnRec, EngineError> {
        match self.conns.get_mut(conn.index as usize) {
            Some(rec) if rec.gen == conn.gen => Ok(rec),
            _ => Err(EngineError::NotFound(conn)),
        }
    }
}

impl Drop for ConnEngine {
    fn drop(&mut self) {
        for (_, rec) in self.conns.iter() {
            if let Some(fd) = rec.fd {
                unsafe { libc::close(fd) };
            }
        }
    }
}

#[cfg(test)]
mod engine_test;
