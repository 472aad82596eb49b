pub mod clone_ops;
pub mod commit_ops;
pub mod pull_ops;
pub mod remote_ops;

pub use clone_ops::*;
pub use commit_ops::*;
pub use pull_ops::*;
pub use remote_ops::*;
