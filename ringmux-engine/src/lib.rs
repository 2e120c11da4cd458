#![warn(
    clippy::unwrap_used,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]
#![doc = include_str!("../README.md")]

//***********************************************
// Re-Exports
//***********************************************
pub use io_uring;
pub use ringmux_listener;

//-----------------------------------------------
// All Errors
//-----------------------------------------------
pub mod error;
#[doc(inline)]
pub use error::EngineError;

//-----------------------------------------------
// Capacity types
//-----------------------------------------------
mod capacity;
pub use capacity::EngineCapacityKind;

//-----------------------------------------------
// Ownership types
//-----------------------------------------------
mod owner;
#[doc(inline)]
pub use owner::Owner;

//-----------------------------------------------
// Connection slot types
//-----------------------------------------------
mod conn;
#[doc(inline)]
pub use conn::{ConnHandle, OpKind, BUF_CAPACITY};

//-----------------------------------------------
// Completion types
//-----------------------------------------------
pub mod completion;
#[doc(inline)]
pub use completion::Completion;

//-----------------------------------------------
// Engine -> Core ring driver
//-----------------------------------------------
mod uring;
#[doc(inline)]
pub use uring::ConnEngine;
