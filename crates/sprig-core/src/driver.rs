//! The boundary between the statement compiler and a database client.
//!
//! Drivers receive SQL text that has already been compiled and
//! parameterized; they never see caller-influenced names unvalidated.

mod capability;
pub use capability::{Backend, Capability, Version};

mod operation;
pub use operation::{Operation, Sql, Transaction};

mod response;
pub use response::{Response, Rows, ValueSet};

use crate::Result;

use std::fmt::Debug;
use std::sync::Arc;

/// Aborts whatever statement the connection it came from is running. Safe to
/// call from any thread, and a no-op when nothing is running.
pub type InterruptHandle = Arc<dyn Fn() + Send + Sync>;

/// A live, borrowed database connection.
///
/// All calls block until the database answers. Implementations must not add
/// timeouts or retries of their own.
pub trait Connection: Debug + Send {
    /// Describes the database's capabilities.
    fn capability(&self) -> &'static Capability;

    /// Version reported by the server, when it could be determined.
    fn server_version(&self) -> Option<Version> {
        None
    }

    /// Executes a database operation.
    fn exec(&mut self, op: Operation) -> Result<Response>;

    /// Returns a handle that aborts a running statement from another thread,
    /// for drivers that support it.
    fn interrupt_handle(&self) -> Option<InterruptHandle> {
        None
    }
}

impl<T: Connection + ?Sized> Connection for Box<T> {
    fn capability(&self) -> &'static Capability {
        (**self).capability()
    }

    fn server_version(&self) -> Option<Version> {
        (**self).server_version()
    }

    fn exec(&mut self, op: Operation) -> Result<Response> {
        (**self).exec(op)
    }

    fn interrupt_handle(&self) -> Option<InterruptHandle> {
        (**self).interrupt_handle()
    }
}
