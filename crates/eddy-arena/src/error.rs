//! Pool-specific error types.

use std::error::Error;
use std::fmt;

use crate::handle::PoolHandle;

/// Errors from object pool configuration and handle checks.
///
/// Handle misuse is a caller bug: the panicking entry points
/// ([`deallocate`](crate::ObjectPool::deallocate),
/// [`detach`](crate::ObjectPool::detach),
/// [`attach`](crate::ObjectPool::attach)) report these variants in their
/// panic message, and `try_*` variants return them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolError {
    /// A fixed pool was configured with no instances.
    ZeroCapacity,
    /// Initial capacity does not fit in a `u32` slot index.
    CapacityOverflow {
        /// The requested capacity.
        requested: usize,
    },
    /// The handle was issued by a different pool.
    ForeignHandle {
        /// The rejected handle.
        handle: PoolHandle,
    },
    /// The handle's slot has been released since the handle was issued.
    /// Releasing the same handle twice reports this.
    StaleHandle {
        /// The rejected handle.
        handle: PoolHandle,
    },
    /// The instance is detached and must be attached before release.
    Detached {
        /// The handle whose instance is out of the pool.
        handle: PoolHandle,
    },
    /// `attach` was called for an instance that was never detached.
    NotDetached {
        /// The handle whose instance is still in the pool.
        handle: PoolHandle,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCapacity => write!(f, "fixed pool has zero capacity"),
            Self::CapacityOverflow { requested } => {
                write!(f, "pool capacity {requested} exceeds u32::MAX")
            }
            Self::ForeignHandle { handle } => {
                write!(f, "handle {handle} belongs to another pool")
            }
            Self::StaleHandle { handle } => {
                write!(f, "handle {handle} is stale (already released)")
            }
            Self::Detached { handle } => {
                write!(f, "instance for {handle} is detached")
            }
            Self::NotDetached { handle } => {
                write!(f, "instance for {handle} is not detached")
            }
        }
    }
}

impl Error for PoolError {}
