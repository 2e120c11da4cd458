//! Completion types

use crate::conn::ConnHandle;

/// One finished operation, recovered from the completion queue.
///
/// The result code keeps the kernel convention: negative values are negated
/// OS error codes, zero and positive values are the success magnitude —
/// bytes transferred, or the new socket descriptor for Accept. A Read
/// result of zero means the peer closed its end of the stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// A pending accept finished.
    Accept {
        /// Slot the accept was submitted against.
        conn: ConnHandle,
        /// Accepted socket descriptor, or a negated errno.
        result: i32,
    },
    /// A read into the slot buffer finished.
    Read {
        /// Slot the read was submitted against.
        conn: ConnHandle,
        /// Bytes read, zero on peer close, or a negated errno.
        result: i32,
    },
    /// A write out of the slot buffer finished.
    Write {
        /// Slot the write was submitted against.
        conn: ConnHandle,
        /// Bytes written, or a negated errno.
        result: i32,
    },
}

impl Completion {
    /// Slot this completion belongs to.
    #[inline]
    pub fn conn(&self) -> ConnHandle {
        match self {
            Self::Accept { conn, .. } | Self::Read { conn, .. } | Self::Write { conn, .. } => *conn,
        }
    }
    /// Raw signed result code.
    #[inline]
    pub fn result(&self) -> i32 {
        match self {
            Self::Accept { result, .. }
            | Self::Read { result, .. }
            | Self::Write { result, .. } => *result,
        }
    }
    /// The OS error carried by a negative result code.
    #[inline]
    pub fn error(&self) -> Option<std::io::Error> {
        let res = self.result();
        (res < 0).then(|| std::io::Error::from_raw_os_error(-res))
    }
}
