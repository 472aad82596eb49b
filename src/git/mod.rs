pub mod operations;
pub mod repository;
pub mod url;
pub mod utils;

#[cfg(test)]
mod tests;

pub use operations::*;
pub use repository::RepositoryRef;
pub use url::{RemoteUrl, parse_remote_url};
pub use utils::GitUtils;
