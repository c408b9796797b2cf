use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("Message text is empty")]
    EmptyMessage,

    #[error("Unknown chat: {0}")]
    UnknownChat(String),
}
