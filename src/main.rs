//! scaffold's main application entry point and orchestration logic.
//! Resolves the registry, selects the template, and runs the
//! index, load, render and write stages in order.

use std::path::PathBuf;

use scaffold::{
    cancel::CancellationToken,
    cli::{get_args, Args},
    config::ScaffoldConfig,
    error::{default_error_handler, Error, Result},
    indexer::TemplateIndexer,
    loader::TemplateLoader,
    prompt::DialoguerPrompter,
    renderer::MiniJinjaRenderer,
    template::find_template,
    writer::FileWriter,
};

/// Main application entry point.
fn main() {
    let args = get_args();

    // Logger configuration
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Resolves the registry and indexes its templates
/// 2. Selects the template and applies input overrides
/// 3. Resolves the destination root
/// 4. Loads the template files and plans their destinations, stopping here on --dry-run
/// 5. Renders the files
/// 6. Writes the rendered files, asking before overwriting unless forced
fn run(args: Args) -> Result<()> {
    let config = match &args.registry {
        Some(registry) => ScaffoldConfig::new(registry),
        None => ScaffoldConfig::from_env()?,
    };
    let cancel = CancellationToken::new();
    let engine = MiniJinjaRenderer::new();

    let templates = TemplateIndexer::new(config.clone()).index(&cancel)?;

    if args.list {
        for template in &templates {
            println!("{}", template.name());
            for (name, spec) in &template.manifest.inputs {
                println!(
                    "    --input {}=<{:?}> {} (default: '{}')",
                    name, spec.kind, spec.description, spec.default
                );
            }
        }
        return Ok(());
    }

    let name = args.template.unwrap_or_default();
    let template = find_template(&templates, &name)?
        .clone()
        .with_inputs(args.inputs)?;
    for (key, value) in &template.inputs {
        log::info!("Using input {key}={value}");
    }

    let loader = TemplateLoader::new(&config, &engine);
    let destination_root = match args.path {
        Some(path) => path,
        None => PathBuf::from(loader.template_path(&template)?),
    };
    if destination_root.as_os_str().is_empty() {
        return Err(Error::ConfigError(
            "path cannot be an empty string, pass --path".to_string(),
        ));
    }

    log::info!("Loading template files for '{}'", template.name());
    let files = loader.load(&template, &cancel)?;
    log::info!("Loaded {} template files", files.len());

    let plan = loader.preview_paths(&template, &files, &destination_root)?;
    if args.dry_run {
        for destination in &plan {
            println!("{}", destination.display());
        }
        return Ok(());
    }
    for destination in &plan {
        log::debug!("Planned file: {}", destination.display());
    }

    let rendered = loader.render(&template, &files, &destination_root, &cancel)?;
    log::info!("Templated {} files", rendered.len());

    let mut writer = FileWriter::new().with_root(&destination_root);
    if !args.force {
        writer = writer.with_conflict_policy(DialoguerPrompter::new());
    }
    let summary = writer.write(&rendered, &cancel)?;

    println!(
        "Template generation completed in {}: {} written, {} skipped.",
        destination_root.display(),
        summary.written.len(),
        summary.skipped.len()
    );
    Ok(())
}
