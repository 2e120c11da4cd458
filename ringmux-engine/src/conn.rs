//! Connection slot records

use crate::owner::Owner;

use core::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::os::fd::RawFd;

/// Capacity of the per-connection byte buffer. Reads are capped one byte
/// short of this; writes may use the full capacity.
pub const BUF_CAPACITY: usize = 2048;

/// Which operation a record was most recently submitted for. Set by the
/// submitter, read back when its completion is polled to decide how the
/// result code is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpKind {
    /// Waiting for an inbound connection on the listening socket.
    Accept,
    /// Reading from the connection socket into the record buffer.
    Read,
    /// Writing the record buffer out to the connection socket.
    Write,
}

/// Handle to one connection slot inside the engine arena.
///
/// Carries the slot index plus a generation counter, so a handle kept
/// around past `remove_conn` is refused instead of silently aliasing
/// whatever reuses the slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnHandle {
    pub(crate) index: u32,
    pub(crate) gen: u32,
}

impl ConnHandle {
    /// Encode into the 64-bit user_data slot of a submission entry.
    #[inline]
    pub(crate) fn encode(self) -> u64 {
        (u64::from(self.gen) << 32) | u64::from(self.index)
    }
    /// Decode back from a completion entry's user_data.
    #[inline]
    pub(crate) fn decode(user_data: u64) -> Self {
        Self {
            index: user_data as u32,
            gen: (user_data >> 32) as u32,
        }
    }
    /// Slot index, mainly useful for diagnostics.
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }
}

/// One connection slot: operation tag, adopted socket, I/O buffer and the
/// peer address filled in by Accept.
///
/// Records are boxed inside the arena so the addresses handed to the
/// kernel stay put for the whole time the kernel owns the record.
#[derive(Debug)]
pub(crate) struct ConnRec {
    pub(crate) op: OpKind,
    pub(crate) fd: Option<RawFd>,
    pub(crate) owner: Owner,
    pub(crate) gen: u32,
    pub(crate) buf: Box<[u8; BUF_CAPACITY]>,
    pub(crate) wlen: u32,
    pub(crate) sockaddr: libc::sockaddr_in,
    pub(crate) socklen: libc::socklen_t,
}

impl ConnRec {
    pub(crate) fn new(gen: u32) -> Self {
        Self {
            op: OpKind::Accept,
            fd: None,
            owner: Owner::Created,
            gen,
            buf: Box::new([0u8; BUF_CAPACITY]),
            wlen: 0,
            sockaddr: unsafe { std::mem::zeroed() },
            socklen: 0,
        }
    }

    /// Decode the peer address stored by a completed Accept, if one is
    /// present and plausible.
    pub(crate) fn peer_sockaddr(&self) -> Option<SocketAddr> {
        if self.socklen == 0 {
            return None;
        }
        if i32::from(self.sockaddr.sin_family) != libc::AF_INET {
            return None;
        }
        if self.socklen as usize > std::mem::size_of::<libc::sockaddr_in>() {
            return None;
        }
        let ip = Ipv4Addr::from_bits(u32::from_be(self.sockaddr.sin_addr.s_addr));
        let port = u16::from_be(self.sockaddr.sin_port);
        Some(SocketAddr::new(IpAddr::V4(ip), port))
    }
}
