pub mod articles;
pub mod search;
