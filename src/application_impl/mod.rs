mod friendship_service_impl;
mod relationship_query_impl;
mod status_resolver;

pub use friendship_service_impl::*;
pub use relationship_query_impl::*;
pub use status_resolver::*;
