mod account_directory_memory;
mod friendship_repo_memory;

pub use account_directory_memory::*;
pub use friendship_repo_memory::*;
