//! Command invocation and confirmation-workflow orchestration.
//!
//! The crate sits between user intent and the capability providers in
//! [`providers`]. A [`Session`] wires the pieces together:
//!
//! - [`CommandGateway`] validates input and forwards named backend commands;
//! - [`PermissionGate`] and [`NotificationDispatcher`] gate notifications;
//! - [`WorkflowEngine`] runs confirm / compute / notify / inform sequences;
//! - [`ViewStateSynchronizer`] folds backend and window events into [`ViewState`].

pub mod error;
pub mod files;
pub mod gateway;
pub mod notify;
pub mod permission;
pub mod providers;
pub mod session;
pub mod sync;
pub mod window;
pub mod workflow;

pub use error::{error_message, GatewayError, UNKNOWN_ERROR};
pub use files::FileWorkflows;
pub use gateway::{Calculation, CommandGateway, Timestamp};
pub use notify::{DispatchOutcome, NotificationDispatcher};
pub use permission::PermissionGate;
pub use session::{Providers, Session, SessionSettings};
pub use sync::{ViewState, ViewStateSynchronizer, ViewStore};
pub use window::WindowController;
pub use workflow::{Step, Workflow, WorkflowEngine, WorkflowKind, WorkflowReport, WorkflowState};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
