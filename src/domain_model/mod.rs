mod account;
mod friendship;

pub use account::*;
pub use friendship::*;
