mod friendship_service;
mod relationship_query_service;

pub use friendship_service::*;
pub use relationship_query_service::*;
