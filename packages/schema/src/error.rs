use thiserror::Error;

pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Rule in layer '{layer}' matches nothing: set an object or a type")]
    UnboundRule { layer: String },
}
