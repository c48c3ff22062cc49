pub mod chat;
pub mod client;
pub mod image;
pub mod types;

pub use chat::OpenAiChatClient;
pub use client::{OpenAiHttpClient, DEFAULT_BASE_URL};
pub use image::OpenAiImageClient;
