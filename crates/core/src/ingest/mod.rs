pub mod composition;
pub mod fetch;
pub mod iex;
pub mod six;
pub mod source;
