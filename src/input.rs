pub mod event;
pub mod handler;
