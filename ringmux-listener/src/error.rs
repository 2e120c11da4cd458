//! Listener setup errors

use core::fmt;
use core::fmt::Display;

use std::error::Error;

/// Errors from listening socket setup, one variant per setup stage.
/// The stage that fails aborts the whole setup.
#[derive(Debug)]
pub enum ListenerError {
    /// Could not create the socket.
    Socket(String),
    /// Could not set SO_REUSEADDR.
    ReuseAddr(String),
    /// Could not set SO_REUSEPORT.
    ReusePort(String),
    /// Could not bind the wildcard address.
    Bind(String),
    /// Could not place the socket into listening state.
    Listen(String),
    /// Could not query the bound address back from the socket.
    SockName(String),
}

impl Display for ListenerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Socket(s) => write!(f, "Socket create: {}", s),
            Self::ReuseAddr(s) => write!(f, "Setsockopt SO_REUSEADDR: {}", s),
            Self::ReusePort(s) => write!(f, "Setsockopt SO_REUSEPORT: {}", s),
            Self::Bind(s) => write!(f, "Bind: {}", s),
            Self::Listen(s) => write!(f, "Listen: {}", s),
            Self::SockName(s) => write!(f, "Getsockname: {}", s),
        }
    }
}

impl Error for ListenerError {}
