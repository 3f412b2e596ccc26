pub mod command;
pub mod query;
pub mod slug;
