//! Record ownership types

use core::{fmt, fmt::Display};

/// Where a connection record currently stands between userspace and the
/// kernel. A record belongs to the kernel from the moment an operation is
/// submitted against it until its completion is polled; every entry point
/// that touches the record checks this first, because the kernel refers to
/// the record's buffer and address fields by raw pointer for that window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Owner {
    /// Record was created and nothing was submitted against it yet.
    #[default]
    Created,
    /// Record is owned by the kernel; an operation is in flight.
    Kernel,
    /// The last submitted operation completed; the record is back with
    /// userspace.
    User,
}

impl Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Kernel => write!(f, "Kernel"),
            Self::User => write!(f, "User"),
        }
    }
}
