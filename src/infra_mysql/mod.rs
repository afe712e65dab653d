mod account_directory_mysql;
mod friendship_repo_mysql;

pub use account_directory_mysql::*;
pub use friendship_repo_mysql::*;

mod util;
