mod account_directory;
mod friendship_repo;

pub use account_directory::*;
pub use friendship_repo::*;
