//! Listening socket setup

use crate::ListenerError;

use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

/// Accept backlog for the listening socket. Large enough not to be the
/// bottleneck; not protocol-mandated.
pub const LISTEN_BACKLOG: libc::c_int = 4096;

/// Create a bound, listening IPv4 TCP socket on the wildcard address.
///
/// `SO_REUSEADDR` and `SO_REUSEPORT` are set before binding so that several
/// engine instances may each bind the same port and let the kernel spread
/// inbound connections across their accept queues.
///
/// Pass port `0` to let the kernel pick an ephemeral port; query it back
/// with [`local_port`].
pub fn listen(port: u16) -> Result<OwnedFd, ListenerError> {
    let raw = unsafe { libc::socket(libc::AF_INET, libc::SOCK_STREAM | libc::SOCK_CLOEXEC, 0) };
    if raw < 0 {
        return Err(ListenerError::Socket(os_error()));
    }
    // Owned from here on; any early return closes it.
    let fd = unsafe { OwnedFd::from_raw_fd(raw) };

    set_sockopt(&fd, libc::SO_REUSEADDR).map_err(ListenerError::ReuseAddr)?;
    set_sockopt(&fd, libc::SO_REUSEPORT).map_err(ListenerError::ReusePort)?;

    let mut addr: libc::sockaddr_in = unsafe { std::mem::zeroed() };
    addr.sin_family = libc::AF_INET as libc::sa_family_t;
    addr.sin_addr.s_addr = libc::INADDR_ANY;
    addr.sin_port = port.to_be();

    let ret = unsafe {
        libc::bind(
            fd.as_raw_fd(),
            std::ptr::addr_of!(addr) as *const libc::sockaddr,
            std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
        )
    };
    if ret != 0 {
        return Err(ListenerError::Bind(os_error()));
    }

    if unsafe { libc::listen(fd.as_raw_fd(), LISTEN_BACKLOG) } != 0 {
        return Err(ListenerError::Listen(os_error()));
    }

    Ok(fd)
}

/// Query the port a listening socket is actually bound to.
///
/// Needed after binding port `0`.
pub fn local_port(fd: &OwnedFd) -> Result<u16, ListenerError> {
    let mut addr: libc::sockaddr_in = unsafe { std::mem::zeroed() };
    let mut len = std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t;
    let ret = unsafe {
        libc::getsockname(
            fd.as_raw_fd(),
            std::ptr::addr_of_mut!(addr) as *mut libc::sockaddr,
            &mut len,
        )
    };
    if ret != 0 {
        return Err(ListenerError::SockName(os_error()));
    }
    Ok(u16::from_be(addr.sin_port))
}

#[inline]
fn set_sockopt(fd: &OwnedFd, opt: libc::c_int) -> Result<(), String> {
    let on: libc::c_int = 1;
    let ret = unsafe {
        libc::setsockopt(
            fd.as_raw_fd(),
            libc::SOL_SOCKET,
            opt,
            std::ptr::addr_of!(on) as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    };
    if ret != 0 {
        return Err(os_error());
    }
    Ok(())
}

#[inline]
fn os_error() -> String {
    io::Error::last_os_error().to_string()
}
