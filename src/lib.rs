// Public modules for integration tests and library usage
pub mod config;
pub mod error;
pub mod files;
pub mod git;
pub mod operations;
pub mod process;
pub mod response;
pub mod router;
pub mod scheduler;
pub mod settings;
pub mod shell;
pub mod testing;
pub mod types;

// Re-export commonly used types for convenience
pub use config::Config;
pub use operations::{AppContext, OperationRegistry, create_default_registry, create_registry, create_registry_with_config};
pub use process::{CommandOutput, ProcessRunner, SystemProcessRunner};
pub use response::{OperationResult, ResponseBuilder};
pub use router::{create_http_router, start_http_server};
pub use scheduler::AutoCommitScheduler;
pub use settings::SettingsStore;
