//! scaffold renders a template from a registry into a new directory.
//! Templates are indexed from the registry, their files are loaded and
//! rendered with the user's inputs, and the results are written to disk
//! without clobbering files the user wants to keep.

/// Cancellation signal threaded through every stage
pub mod cancel;

/// Command-line interface module for the scaffold application
pub mod cli;

/// Registry location and file naming conventions
pub mod config;

/// Common constants
pub mod constants;

/// Error types and handling for the scaffold application
pub mod error;

/// Discovers the templates of a registry
pub mod indexer;

/// Reads template files and renders contents and destination paths
pub mod loader;

/// The `scaffold.yaml` data model
pub mod manifest;

/// Interactive conflict handling
pub mod prompt;

/// MiniJinja rendering with the scaffold helper functions
pub mod renderer;

/// Runtime template instances and selection
pub mod template;

/// Bounded concurrent task group
pub mod workers;

/// Writes rendered files to disk
pub mod writer;
