//! Read submission

use crate::conn::{ConnHandle, OpKind, BUF_CAPACITY};
use crate::error::EngineError;
use crate::owner::Owner;
use crate::ConnEngine;

use io_uring::{opcode, types};

impl ConnEngine {
    /// Queue a read of up to [`BUF_CAPACITY`]` - 1` bytes from the slot's
    /// socket into the slot buffer.
    ///
    /// Each read starts at the socket's current stream position; the
    /// engine keeps no count of bytes previously read. The slot must have
    /// a socket adopted first.
    pub fn push_read(&mut self, conn: ConnHandle) -> Result<(), EngineError> {
        let rec = self.rec_mut(conn)?;
        if rec.owner == Owner::Kernel {
            return Err(EngineError::InvalidOwnership(rec.owner, conn.index));
        }
        let fd = rec.fd.ok_or(EngineError::NoSocket(conn))?;
        rec.op = OpKind::Read;
        let entry = opcode::Read::new(
            types::Fd(fd),
            rec.buf.as_mut_ptr(),
            (BUF_CAPACITY - 1) as u32,
        )
        .build();
        rec.owner = Owner::Kernel;
        self.push_and_submit(conn, entry)
    }
}
