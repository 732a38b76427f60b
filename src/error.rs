//! Error types shared by the layout and simulation modules

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("point `{id}` resolved to a negative collision radius ({radius})")]
    NegativeRadius { id: String, radius: f64 },

    #[error("invalid parameter `{name}`: {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("failed to read `{path}`")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse `{path}`")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
