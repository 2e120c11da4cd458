//! Accept submission

use crate::conn::{ConnHandle, OpKind};
use crate::error::EngineError;
use crate::owner::Owner;
use crate::ConnEngine;

use io_uring::{opcode, types};
use std::ptr::addr_of_mut;

impl ConnEngine {
    /// Queue a single-shot accept on the listening socket against `conn`.
    ///
    /// The kernel fills the slot's address field and delivers the accepted
    /// descriptor as the completion result. Nothing re-arms automatically:
    /// while no accept is outstanding, new connections only pile up in the
    /// listen backlog, so the caller pushes a fresh accept after every
    /// accept completion to keep the listener primed.
    pub fn push_accept(&mut self, conn: ConnHandle) -> Result<(), EngineError> {
        let listen_fd = self.listener_fd();
        let rec = self.rec_mut(conn)?;
        if rec.owner == Owner::Kernel {
            return Err(EngineError::InvalidOwnership(rec.owner, conn.index));
        }
        rec.op = OpKind::Accept;
        rec.socklen = std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t;
        let entry = opcode::Accept::new(
            types::Fd(listen_fd),
            addr_of_mut!(rec.sockaddr) as *mut libc::sockaddr,
            addr_of_mut!(rec.socklen),
        )
        .build();
        rec.owner = Owner::Kernel;
        self.push_and_submit(conn, entry)
    }
}
