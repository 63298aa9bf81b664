//! Common constants used throughout the scaffold application.

/// Manifest file expected in every template directory of a registry
pub const MANIFEST_FILE: &str = "scaffold.yaml";

/// Directory inside a template holding the files to render
pub const FILES_DIR: &str = "files";

/// Suffix marking a file whose content is a render expression
pub const TEMPLATE_SUFFIX: &str = ".tmpl";

/// Environment variable overriding the registry location
pub const REGISTRY_PATH_ENV: &str = "SCAFFOLD_REGISTRY_PATH";

/// Registry location below `$HOME`, maintained by the registry fetcher
pub const DEFAULT_REGISTRY_DIR: [&str; 3] = [".scaffold", "upstream", "registry"];
