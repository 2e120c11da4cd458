//! Write submission

use crate::conn::{ConnHandle, OpKind, BUF_CAPACITY};
use crate::error::EngineError;
use crate::owner::Owner;
use crate::ConnEngine;

use io_uring::{opcode, types};

impl ConnEngine {
    /// Copy `data` into the slot buffer and queue a write of that length
    /// to the slot's socket.
    ///
    /// The bytes in flight are the engine-owned copy, so the caller's
    /// slice may go away the moment this returns. A payload longer than
    /// [`BUF_CAPACITY`] is refused outright with
    /// [`EngineError::WriteTooLarge`] rather than truncated.
    pub fn push_write(&mut self, conn: ConnHandle, data: &[u8]) -> Result<(), EngineError> {
        if data.len() > BUF_CAPACITY {
            return Err(EngineError::WriteTooLarge(data.len()));
        }
        let rec = self.rec_mut(conn)?;
        if rec.owner == Owner::Kernel {
            return Err(EngineError::InvalidOwnership(rec.owner, conn.index));
        }
        let fd = rec.fd.ok_or(EngineError::NoSocket(conn))?;
        rec.op = OpKind::Write;
        rec.buf[..data.len()].copy_from_slice(data);
        rec.wlen = data.len() as u32;
        let entry = opcode::Write::new(types::Fd(fd), rec.buf.as_ptr(), rec.wlen).build();
        rec.owner = Owner::Kernel;
        self.push_and_submit(conn, entry)
    }
}
