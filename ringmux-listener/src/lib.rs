#![warn(
    clippy::unwrap_used,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]
#![doc = include_str!("../README.md")]

//-----------------------------------------------
// All Errors
//-----------------------------------------------
mod error;
#[doc(inline)]
pub use error::ListenerError;

//-----------------------------------------------
// Listener setup
//-----------------------------------------------
mod listen;
#[doc(inline)]
pub use listen::{listen, local_port, LISTEN_BACKLOG};
