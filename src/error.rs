//! Error handling for the scaffold application.
//! Defines the error type shared by indexing, loading, rendering and writing.

use std::io;
use thiserror::Error;

/// Custom error types for scaffold operations.
///
/// Every stage-local variant carries the path it failed on, so callers can
/// report the offending registry entry, template file or destination.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors in the scaffold configuration
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// The registry or one of its entries could not be indexed
    #[error("Failed to index '{path}': {reason}.")]
    IndexError { path: String, reason: String },

    /// A manifest file exists but cannot be parsed
    #[error("Failed to parse manifest '{path}': {source}.")]
    ManifestError {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The template's files could not be read
    #[error("Failed to load template files '{path}': {source}.")]
    LoadError {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A render expression failed to parse or execute
    #[error("Failed to render '{path}': {source}.")]
    RenderError {
        path: String,
        #[source]
        source: minijinja::Error,
    },

    /// A rendered path would be written outside of the destination root
    #[error("Rendered path '{path}' escapes the destination root '{root}'.")]
    PathEscapeError { path: String, root: String },

    /// Two template files render to the same destination
    #[error("Both '{first}' and '{second}' render to '{path}'.")]
    DestinationConflict {
        path: String,
        first: String,
        second: String,
    },

    /// A rendered file could not be written to disk
    #[error("Failed to write '{path}': {source}.")]
    WriteError {
        path: String,
        #[source]
        source: io::Error,
    },

    /// An interactive prompt could not be shown or answered
    #[error("Prompt failed: {0}.")]
    PromptError(#[from] dialoguer::Error),

    /// The conflict policy failed to decide whether to overwrite a file
    #[error("Failed to decide whether '{path}' should be overwritten: {source}")]
    ConflictPolicyError {
        path: String,
        #[source]
        source: Box<Error>,
    },

    /// A caller supplied value does not fit the template's inputs
    #[error("Invalid input '{name}': {reason}.")]
    InputError { name: String, reason: String },

    /// No template with the requested name exists in the registry
    #[error("Template '{name}' was not found, available: {available}.")]
    TemplateNotFound { name: String, available: String },

    /// The run was cancelled before it completed
    #[error("Operation cancelled: {reason}.")]
    Cancelled { reason: String },
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The Error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
