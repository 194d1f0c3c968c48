//! Local capability providers for running a session outside a native shell.

pub mod backend;
pub mod error;
pub mod events;
pub mod fs;
pub mod notifications;
pub mod window;

pub use backend::InProcessBackend;
pub use error::ProviderError;
pub use events::EventBus;
pub use fs::LocalFileSystem;
pub use notifications::{ConsoleNotifier, PermissionMode};
pub use window::HeadlessWindow;
