use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("Unsupported root element: '{0}'. Only 'score-partwise' is supported.")]
    UnsupportedRoot(String),

    #[error("MXL archive error: {0}")]
    Archive(String),

    #[error("Failed to read '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Invalid color '{0}': expected #rrggbb")]
    InvalidColor(String),

    #[error("Invalid {name}: {value} is not a pitch class in 0..=11")]
    InvalidPitchClass { name: &'static str, value: i32 },

    #[error("Ticks per measure must be positive, got {0}")]
    InvalidTicksPerMeasure(i64),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
