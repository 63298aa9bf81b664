//! User interaction for scaffold.
//! Provides the interactive conflict policy used by the binary.

use crate::error::Result;
use crate::loader::RenderedFile;
use crate::writer::ConflictPolicy;
use dialoguer::Confirm;

/// Asks on the terminal before an existing file is overwritten.
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }

    /// Asks a yes/no question, returning `default` when the user just hits enter.
    pub fn confirm<S: Into<String>>(&self, prompt: S, default: bool) -> Result<bool> {
        let answer = Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(answer)
    }
}

impl ConflictPolicy for DialoguerPrompter {
    fn should_overwrite(&self, file: &RenderedFile) -> Result<bool> {
        let destination = file.destination.display();
        let prompt = format!("Should override existing file?: {destination}");
        self.confirm(prompt, false)
    }
}
