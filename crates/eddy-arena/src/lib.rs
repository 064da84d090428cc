//! Generational slabs and object pools for Eddy.
//!
//! Two allocators back the hot paths of the workspace:
//!
//! ```text
//! Slab<T>          index-addressed storage with a free list; values are
//!                  dropped on removal (task records, wait contexts)
//! ObjectPool<T>    factory-filled pool whose instances survive release
//!                  and are handed out again unchanged (flow fields)
//! ```
//!
//! Both hand out small `Copy` keys carrying a generation counter instead
//! of references, so a key that outlives its slot is detected in O(1)
//! rather than aliasing a reused slot. Neither allocator is internally
//! synchronised; wrap it in a lock if it is shared across threads.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod handle;
pub mod pool;
pub mod slab;

pub use config::{Growth, PoolConfig};
pub use error::PoolError;
pub use handle::{PoolHandle, SlotKey};
pub use pool::ObjectPool;
pub use slab::Slab;
