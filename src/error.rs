use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parse Error at line {line}: {msg}")]
    Parse { line: usize, msg: String },

    #[error("Config Error: {0}")]
    ConfigDe(#[from] toml::de::Error),

    #[error("Config Error: {0}")]
    ConfigSer(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[cfg(feature = "opencv")]
    #[error("OpenCV Error: {0}")]
    OpenCv(#[from] opencv::Error),
}

impl Error {
    pub(crate) fn parse<S: ToString>(line: usize, msg: S) -> Self {
        Error::Parse {
            line,
            msg: msg.to_string(),
        }
    }
}
