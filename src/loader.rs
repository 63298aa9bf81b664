//! Template loading and rendering for scaffold.
//! Reads a template's payload from disk and renders the destination root,
//! every file's content and every file's output path. Nothing is written here.
use crate::cancel::CancellationToken;
use crate::config::ScaffoldConfig;
use crate::error::{Error, Result};
use crate::renderer::TemplateRenderer;
use crate::template::Template;
use crate::workers::run_all;
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Raw template file, read once and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub content: Vec<u8>,
    /// Location on disk
    pub path: PathBuf,
    /// Path relative to the template's files root, `/` separated
    pub rel_path: String,
}

/// Rendered output ready to be handed to the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub content: Vec<u8>,
    pub destination: PathBuf,
}

pub struct TemplateLoader<'a> {
    config: &'a ScaffoldConfig,
    renderer: &'a dyn TemplateRenderer,
}

impl<'a> TemplateLoader<'a> {
    pub fn new(config: &'a ScaffoldConfig, renderer: &'a dyn TemplateRenderer) -> Self {
        Self { config, renderer }
    }

    /// Reads every regular file below the template's files directory.
    ///
    /// Files are read concurrently and returned sorted by relative path.
    /// Symbolic links and other non-regular entries are ignored.
    ///
    /// # Errors
    /// * `Error::LoadError` if the files directory is missing or a file cannot be read
    /// * `Error::Cancelled` if the token fires before every file was read
    pub fn load(&self, template: &Template, cancel: &CancellationToken) -> Result<Vec<SourceFile>> {
        let files_root = template.path.join(&self.config.files_dir);
        let load_error = |path: &Path, source: io::Error| Error::LoadError {
            path: path.display().to_string(),
            source,
        };

        match fs::metadata(&files_root) {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => return Err(load_error(&files_root, io::Error::other("not a directory"))),
            Err(e) => return Err(load_error(&files_root, e)),
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(&files_root) {
            let entry = entry.map_err(|e| load_error(&files_root, e.into()))?;
            if entry.file_type().is_file() {
                paths.push(entry.into_path());
            } else if !entry.file_type().is_dir() {
                debug!("Ignoring non-regular entry {}", entry.path().display());
            }
        }

        let mut files = run_all(&paths, cancel, |path| {
            let content = fs::read(path).map_err(|e| load_error(path, e))?;
            Ok(SourceFile {
                content,
                path: path.clone(),
                rel_path: relative_path(&files_root, path)?,
            })
        })?;
        files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));

        debug!(
            "Loaded {} files for template '{}'",
            files.len(),
            template.name()
        );
        Ok(files)
    }

    /// Renders the manifest's default path expression into the default
    /// destination root for this run.
    pub fn template_path(&self, template: &Template) -> Result<String> {
        let rendered = self.renderer.render(
            "default.path",
            template.manifest.default_path_expression(),
            &template.context(),
        )?;
        Ok(rendered.trim().to_string())
    }

    /// Renders every file for writing below `destination_root`.
    ///
    /// Files render concurrently and the result keeps the order of `files`.
    /// The first failing file aborts the whole call.
    ///
    /// # Errors
    /// * `Error::RenderError` naming the file whose content or rename failed
    /// * `Error::PathEscapeError` if a rename leaves the destination root
    /// * `Error::DestinationConflict` if two files render to the same path
    pub fn render<P: AsRef<Path>>(
        &self,
        template: &Template,
        files: &[SourceFile],
        destination_root: P,
        cancel: &CancellationToken,
    ) -> Result<Vec<RenderedFile>> {
        let destination_root = destination_root.as_ref();
        let context = template.context();

        let rendered = run_all(files, cancel, |file| {
            let content = self.render_content(file, &context)?;
            let destination = self.destination(template, &context, file, destination_root)?;
            Ok(RenderedFile {
                content,
                destination,
            })
        })?;

        check_unique_destinations(files, &rendered)?;
        debug!(
            "Rendered {} files for template '{}'",
            rendered.len(),
            template.name()
        );

        Ok(rendered)
    }

    /// Computes where every file would be written, without rendering content.
    pub fn preview_paths<P: AsRef<Path>>(
        &self,
        template: &Template,
        files: &[SourceFile],
        destination_root: P,
    ) -> Result<Vec<PathBuf>> {
        let context = template.context();
        files
            .iter()
            .map(|file| self.destination(template, &context, file, destination_root.as_ref()))
            .collect()
    }

    fn render_content(&self, file: &SourceFile, context: &serde_json::Value) -> Result<Vec<u8>> {
        match std::str::from_utf8(&file.content) {
            Ok(text) => {
                let rendered = self.renderer.render(&file.rel_path, text, context)?;
                Ok(rendered.into_bytes())
            }
            Err(_) => {
                debug!("Copying non UTF-8 file verbatim: {}", file.rel_path);
                Ok(file.content.clone())
            }
        }
    }

    fn destination(
        &self,
        template: &Template,
        context: &serde_json::Value,
        file: &SourceFile,
        destination_root: &Path,
    ) -> Result<PathBuf> {
        let stripped = strip_template_suffix(&file.rel_path, &self.config.template_suffix);

        let relative = match template.manifest.rename_rule(&stripped) {
            Some(rule) => {
                debug!(
                    "Templating file {} with rename '{}'",
                    file.rel_path, rule.expression
                );

                let mut rename_context = context.clone();
                if let Some(fields) = rename_context.as_object_mut() {
                    fields.insert(
                        "OriginalFileName".to_string(),
                        file_name(&file.rel_path).into(),
                    );
                    fields.insert("OriginalFilePath".to_string(), stripped.clone().into());
                }

                let renamed = self
                    .renderer
                    .render(&file.rel_path, &rule.expression, &rename_context)?
                    .trim()
                    .to_string();
                if renamed.is_empty() {
                    return Err(Error::RenderError {
                        path: file.rel_path.clone(),
                        source: minijinja::Error::new(
                            minijinja::ErrorKind::InvalidOperation,
                            "rename rule produced an empty path",
                        ),
                    });
                }
                renamed
            }
            None => {
                debug!("Using raw file path {}", stripped);
                stripped
            }
        };

        resolve_destination(destination_root, &relative)
    }
}

fn relative_path(root: &Path, path: &Path) -> Result<String> {
    let invalid = |reason: &str| Error::LoadError {
        path: path.display().to_string(),
        source: io::Error::new(io::ErrorKind::InvalidData, reason.to_string()),
    };

    let relative = path
        .strip_prefix(root)
        .map_err(|_| invalid("outside of the files root"))?;
    let segments = relative
        .components()
        .map(|component| {
            component
                .as_os_str()
                .to_str()
                .ok_or_else(|| invalid("non UTF-8 path"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(segments.join("/"))
}

fn file_name(rel_path: &str) -> &str {
    rel_path.rsplit('/').next().unwrap_or(rel_path)
}

/// Removes the marker suffix from the file name of a relative path. A file
/// named exactly like the suffix keeps its name.
pub fn strip_template_suffix(rel_path: &str, suffix: &str) -> String {
    let name = file_name(rel_path);
    match name.strip_suffix(suffix) {
        Some(stripped) if !stripped.is_empty() && !suffix.is_empty() => {
            let dir = &rel_path[..rel_path.len() - name.len()];
            format!("{dir}{stripped}")
        }
        _ => rel_path.to_string(),
    }
}

/// Joins `relative` onto `root`, rejecting absolute paths and `..` segments
/// that climb above the root.
pub fn resolve_destination(root: &Path, relative: &str) -> Result<PathBuf> {
    let escape = || Error::PathEscapeError {
        path: relative.to_string(),
        root: root.display().to_string(),
    };

    let mut normalized = PathBuf::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(segment) => normalized.push(segment),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(escape());
                }
            }
            Component::RootDir | Component::Prefix(_) => return Err(escape()),
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(escape());
    }

    Ok(root.join(normalized))
}

fn check_unique_destinations(files: &[SourceFile], rendered: &[RenderedFile]) -> Result<()> {
    let mut seen: HashMap<&Path, &str> = HashMap::with_capacity(rendered.len());
    for (file, output) in files.iter().zip(rendered) {
        if let Some(first) = seen.insert(&output.destination, &file.rel_path) {
            return Err(Error::DestinationConflict {
                path: output.destination.display().to_string(),
                first: first.to_string(),
                second: file.rel_path.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_template_suffix() {
        assert_eq!(strip_template_suffix("main.go.tmpl", ".tmpl"), "main.go");
        assert_eq!(strip_template_suffix("cmd/app/main.go.tmpl", ".tmpl"), "cmd/app/main.go");
        assert_eq!(strip_template_suffix("README.md", ".tmpl"), "README.md");
        assert_eq!(strip_template_suffix("a.tmpl/file.txt", ".tmpl"), "a.tmpl/file.txt");
        assert_eq!(strip_template_suffix("dir/.tmpl", ".tmpl"), "dir/.tmpl");
    }

    #[test]
    fn test_resolve_destination() {
        let root = Path::new("out");
        assert_eq!(
            resolve_destination(root, "a/b.txt").unwrap(),
            PathBuf::from("out/a/b.txt")
        );
        assert_eq!(
            resolve_destination(root, "./a/../b.txt").unwrap(),
            PathBuf::from("out/b.txt")
        );
    }

    #[test]
    fn test_resolve_destination_rejects_escapes() {
        let root = Path::new("out");
        for relative in ["../b.txt", "a/../../b.txt", "/etc/passwd", ".", "a/.."] {
            assert!(
                matches!(
                    resolve_destination(root, relative),
                    Err(Error::PathEscapeError { .. })
                ),
                "{relative} should be rejected"
            );
        }
    }

    #[test]
    fn test_relative_path_is_slash_separated() {
        let root = Path::new("tpl").join("files");
        let path = root.join("src").join("lib.rs");
        assert_eq!(relative_path(&root, &path).unwrap(), "src/lib.rs");
    }

    #[test]
    fn test_duplicate_destinations_are_rejected() {
        let source = |rel: &str| SourceFile {
            content: Vec::new(),
            path: PathBuf::from(rel),
            rel_path: rel.to_string(),
        };
        let output = RenderedFile {
            content: Vec::new(),
            destination: PathBuf::from("out/a"),
        };

        let result = check_unique_destinations(
            &[source("a"), source("a.tmpl")],
            &[output.clone(), output],
        );
        match result {
            Err(Error::DestinationConflict { first, second, .. }) => {
                assert_eq!(first, "a");
                assert_eq!(second, "a.tmpl");
            }
            other => panic!("Expected DestinationConflict, got {other:?}"),
        }
    }
}
