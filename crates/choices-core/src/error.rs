use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Problems detected while loading a [`Config`](crate::Config).
pub enum ConfigError {
    #[error("option '{option}' is not callable")]
    /// A callback option does not name a registered callback.
    NotCallable {
        /// The offending option key.
        option: String,
    },

    #[error("regex compile error for pattern '{pattern}': {message}")]
    /// `regexFilter` failed to compile.
    InvalidRegex {
        /// The regex pattern string.
        pattern: String,
        /// The compiler error message.
        message: String,
    },

    #[error("invalid options: {0}")]
    /// The options object could not be deserialised.
    InvalidOptions(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors reported by the store and the [`Choices`](crate::Choices) controller.
///
/// Every error leaves state untouched: the failing operation is skipped.
pub enum ChoicesError {
    #[error("configuration error: {0}")]
    /// The configuration is invalid.
    Config(#[from] ConfigError),

    #[error("control has not been initialised")]
    /// A mutation was attempted before [`Choices::init`](crate::Choices::init).
    NotInitialized,

    #[error("invalid argument: {0}")]
    /// A host call passed an argument of the wrong shape.
    InvalidArgument(String),

    #[error("control has been released")]
    /// The store was torn down; late dispatches and deliveries are rejected.
    Released,

    #[error("control is disabled")]
    /// User interaction was attempted on a disabled control.
    Disabled,
}
