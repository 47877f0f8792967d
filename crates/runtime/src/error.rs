use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Dictionary unavailable: {0}")]
    Source(#[from] emote_source::SourceError),

    #[error("{0}")]
    Core(#[from] emote_core::EmoteError),

    #[error("Load task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
