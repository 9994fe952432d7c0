// crates/cmdpp-macros/src/macro_api.rs

use crate::errors::PreprocessResult;
use crate::preprocessor::{Context, DiagnosticSink, Preprocessor, PreprocessorConfig};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub fn process_string(
    source: &str,
    preprocessor: &Preprocessor,
    ctx: &mut Context,
    diag: &mut dyn DiagnosticSink,
) -> PreprocessResult<String> {
    let mut out = Vec::new();
    preprocessor.process(ctx, source.as_bytes(), &mut out, diag)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Processes `source` with the default configuration, discarding diagnostics.
pub fn process_string_defaults(source: &str) -> PreprocessResult<String> {
    let preprocessor = Preprocessor::new(PreprocessorConfig::default());
    let mut ctx = preprocessor.context();
    process_string(source, &preprocessor, &mut ctx, &mut ())
}

/// Processes one file into `output_file` with a fresh context, which is returned.
pub fn process_file(
    input_file: &Path,
    output_file: &Path,
    preprocessor: &Preprocessor,
    diag: &mut dyn DiagnosticSink,
) -> PreprocessResult<Context> {
    let input = BufReader::new(fs::File::open(input_file)?);
    if let Some(parent) = output_file.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(fs::File::create(output_file)?);
    let mut ctx = preprocessor.context();
    preprocessor.process(&mut ctx, input, &mut out, diag)?;
    out.flush()?;
    Ok(ctx)
}

/// `<output_dir>/<input file name>.out`
pub fn output_path(input_file: &Path, output_dir: &Path) -> PathBuf {
    let mut out_name = match input_file.file_name() {
        Some(n) => n.to_os_string(),
        None => "output".into(),
    };
    out_name.push(".out");
    output_dir.join(out_name)
}

/// Processes each input independently; macros and rules do not carry over between files.
pub fn process_files(
    inputs: &[PathBuf],
    output_dir: &Path,
    preprocessor: &Preprocessor,
    diag: &mut dyn DiagnosticSink,
) -> PreprocessResult<()> {
    fs::create_dir_all(output_dir)?;
    for input_path in inputs {
        process_file(
            input_path,
            &output_path(input_path, output_dir),
            preprocessor,
            diag,
        )?;
    }
    Ok(())
}

pub fn process_files_from_config(
    inputs: &[PathBuf],
    output_dir: &Path,
    config: PreprocessorConfig,
) -> PreprocessResult<()> {
    let preprocessor = Preprocessor::new(config);
    process_files(inputs, output_dir, &preprocessor, &mut ())
}
