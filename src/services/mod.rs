pub mod chat;

pub use chat::{ChatGateway, ChatReply, ChatService, HttpChatGateway};
