pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A structural field the pipeline cannot do without is missing.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            Error::config("no series")
                .to_string()
                .starts_with("configuration error:")
        );
        assert!(Error::parse("bad json").to_string().starts_with("parse error:"));
    }

    #[test]
    fn io_preserves_source() {
        let err = Error::from(std::io::Error::other("boom"));
        assert!(err.to_string().contains("boom"));
    }
}
