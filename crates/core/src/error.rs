use thiserror::Error;

pub type Result<T> = std::result::Result<T, EmoteError>;

#[derive(Error, Debug)]
pub enum EmoteError {
    #[error("Pattern compile error: {0}")]
    Compile(#[from] regex::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}
