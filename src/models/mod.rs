pub mod chat;
pub mod classify;
pub mod weather;
