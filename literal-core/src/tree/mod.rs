//! Component Tree
//!
//! Persistent state behind component instances and the scheduler that
//! decides when the tree is rendered again.
//!
//! - [`StateNode`]: durable per-instance record (value slots, child registry,
//!   destroy hook).
//! - [`RenderScheduler`]: coalesces render requests into one pass per host
//!   frame.

mod node;
mod runtime;
mod scheduler;

pub use node::{ChildKey, NodeId, NodeRef, SlotKey, StateNode};
pub use scheduler::{FrameClock, FrameOutcome, ManualClock, PassKind, RenderScheduler};

pub(crate) use node::teardown;
pub(crate) use runtime::Runtime;
pub(crate) use scheduler::RenderLoop;
