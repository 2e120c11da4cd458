//! Engine errors

use crate::conn::{ConnHandle, BUF_CAPACITY};
use crate::owner::Owner;

use core::fmt;
use core::fmt::Display;

use std::error::Error;

use ringmux_listener::ListenerError;

/// Errors from the connection engine
#[derive(Debug)]
pub enum EngineError {
    /// Listening socket setup failed; the engine was never created.
    Listener(ListenerError),
    /// Error creating the io_uring instance.
    RingCreate(String),
    /// Submission push error, the submission queue is full.
    SubmissionPush,
    /// Something went wrong in io_uring::IoUring::submit.
    Submission(String),
    /// The slot arena is at capacity and cannot hold another connection.
    SlotsFull(usize),
    /// No slot matches the handle; it was released or never existed.
    NotFound(ConnHandle),
    /// The record is in an ownership state that forbids the request.
    InvalidOwnership(Owner, u32),
    /// The slot has no adopted socket descriptor to read from or write to.
    NoSocket(ConnHandle),
    /// A negative descriptor cannot be adopted into a slot.
    InvalidSocket(i32),
    /// Write payload exceeds the slot buffer capacity.
    WriteTooLarge(usize),
    /// A completion referenced a slot the arena cannot resolve. This is a bug.
    CompletionBug(&'static str),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listener(e) => write!(f, "Listener: {}", e),
            Self::RingCreate(s) => write!(f, "IoUring Create: {}", s),
            Self::SubmissionPush => write!(f, "Submission push error. Is the squeue full?"),
            Self::Submission(s) => write!(f, "Submission: {}", s),
            Self::SlotsFull(cap) => {
                write!(f, "Slot arena is at capacity {} and cannot add more.", cap)
            }
            Self::NotFound(h) => {
                write!(f, "No slot for handle index {} gen {}.", h.index, h.gen)
            }
            Self::InvalidOwnership(owner, idx) => {
                write!(f, "Invalid current ownership {} of slot {}", owner, idx)
            }
            Self::NoSocket(h) => {
                write!(f, "Slot {} has no adopted socket descriptor.", h.index)
            }
            Self::InvalidSocket(fd) => write!(f, "Invalid socket descriptor {}.", fd),
            Self::WriteTooLarge(len) => write!(
                f,
                "Write of {} bytes exceeds the {} byte slot buffer.",
                len, BUF_CAPACITY
            ),
            Self::CompletionBug(s) => write!(f, "Completion bug: {}", s),
        }
    }
}

impl Error for EngineError {}
