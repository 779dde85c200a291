pub mod client;
pub mod handler;
pub mod view;

pub use client::ChatClient;
pub use handler::{dispatch, drive, ChatHandler};
pub use view::{ChatView, MessageList};
