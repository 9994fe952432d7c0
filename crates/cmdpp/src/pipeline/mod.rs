// crates/cmdpp/src/pipeline/mod.rs
use crate::config::ConfigError;
use crate::options::{Args, Options};
use crate::{try_mkdir, try_preprocess, try_read, try_write};
use cmdpp_macros::macro_api::{output_path, process_string};
use cmdpp_macros::{Context, DiagnosticSink, PreprocessError, Preprocessor, WriteSink};
use log::{debug, info};
use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[macro_use]
mod error_macros;

#[cfg(test)]
mod tests;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read file {path:?}: {source}")]
    ReadError { path: PathBuf, source: io::Error },

    #[error("Failed to write file {path:?}: {source}")]
    WriteError { path: PathBuf, source: io::Error },

    #[error("Failed to create directory {path:?}: {source}")]
    CreateDirError { path: PathBuf, source: io::Error },

    #[error("Input file not found: {path:?}")]
    InputNotFound { path: PathBuf },

    #[error("{path:?}: {source}")]
    PreprocessError {
        path: PathBuf,
        source: PreprocessError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to serialize tables: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn is_stdio_path(path: &Path) -> bool {
    path.to_str() == Some("-")
}

pub fn read_input(path: &Path) -> Result<String, CliError> {
    if is_stdio_path(path) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| CliError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(buffer)
    } else {
        try_read!(path)
    }
}

fn write_stdout(content: &str) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(content.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| CliError::WriteError {
            path: PathBuf::from("-"),
            source: e,
        })
}

pub fn resolve_input_paths(files: &[PathBuf]) -> Result<Vec<PathBuf>, CliError> {
    files
        .iter()
        .map(|path| {
            if is_stdio_path(path) || path.exists() {
                Ok(path.clone())
            } else {
                Err(CliError::InputNotFound { path: path.clone() })
            }
        })
        .collect()
}

/// Preprocesses one input with a fresh context and writes its output.
pub fn process_input(
    preprocessor: &Preprocessor,
    input: &Path,
    out_dir: Option<&Path>,
    diag: &mut dyn DiagnosticSink,
) -> Result<Context, CliError> {
    info!("processing {}", input.display());
    let content = read_input(input)?;
    let mut ctx = preprocessor.context();
    let output = try_preprocess!(
        input,
        process_string(&content, preprocessor, &mut ctx, diag)
    )?;

    match out_dir {
        Some(dir) if !is_stdio_path(input) => {
            let target = output_path(input, dir);
            debug!("writing {}", target.display());
            try_write!(&target, output)?;
        }
        _ => write_stdout(&output)?,
    }
    Ok(ctx)
}

pub fn run_with_options(options: &Options) -> Result<(), CliError> {
    let inputs = resolve_input_paths(&options.files)?;
    let preprocessor = Preprocessor::new(options.preprocessor_config());
    let mut diag = WriteSink(io::stderr());

    if let Some(dir) = &options.out_dir {
        try_mkdir!(dir)?;
    }

    let mut tables = BTreeMap::new();
    for input in &inputs {
        let ctx = process_input(&preprocessor, input, options.out_dir.as_deref(), &mut diag)?;
        tables.insert(input.display().to_string(), ctx);
    }

    if let Some(dump_path) = &options.dump_tables {
        let json = serde_json::to_string_pretty(&tables)?;
        try_write!(dump_path, json)?;
    }
    Ok(())
}

pub fn run(args: Args) -> Result<(), CliError> {
    let options = Options::from_args_and_config(args)?;
    run_with_options(&options)
}
