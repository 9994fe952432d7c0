// crates/cmdpp/src/options.rs

use crate::config::{ConfigError, FileConfig};
use clap::Parser;
use cmdpp_macros::{LogicalLiterals, PreprocessorConfig};
use std::path::{Path, PathBuf};

/// Returns the default path separator based on the platform
pub fn default_pathsep() -> String {
    if cfg!(windows) {
        ";".to_string()
    } else {
        ":".to_string()
    }
}

#[derive(Parser, Debug, Default)]
#[command(
    name = "cmdpp",
    about = "Line-oriented preprocessor with #define, #ifdef and #command/#translate rules"
)]
pub struct Args {
    /// Input files to process (use "-" for stdin)
    #[arg(
        required = true,
        help = "One or more input files to process. Use - for stdin"
    )]
    pub files: Vec<PathBuf>,

    /// Output directory for generated files
    #[arg(
        long = "out-dir",
        help = "Write <file>.out into this directory instead of stdout"
    )]
    pub out_dir: Option<PathBuf>,

    /// Colon-separated list of include paths
    #[arg(long, help = "Pathsep-separated list of include roots (default: .)")]
    pub include: Option<String>,

    /// Path separator for include paths
    #[arg(
        long = "pathsep",
        help = "Path separator character (; on Windows, : on Unix-like systems)"
    )]
    pub pathsep: Option<String>,

    /// Predefined object macros
    #[arg(
        short = 'D',
        long = "define",
        value_name = "NAME[=VALUE]",
        help = "Define an object macro before processing (repeatable)"
    )]
    pub define: Vec<String>,

    #[arg(long = "true-literal", help = "Text produced by <.name.> for a present capture")]
    pub true_literal: Option<String>,

    #[arg(long = "false-literal", help = "Text produced by <.name.> for a missing capture")]
    pub false_literal: Option<String>,

    #[arg(long = "max-rewrites", help = "Maximum splices per logical line")]
    pub max_rewrites: Option<usize>,

    #[arg(
        long = "dump-tables",
        value_name = "FILE",
        help = "Write the macro tables and rules of every input as JSON"
    )]
    pub dump_tables: Option<PathBuf>,

    /// Config file path
    #[arg(long, help = "Path to config file (default: cmdpp.toml if present)")]
    pub config: Option<PathBuf>,
}

/// Arguments merged with the config file, command line first.
#[derive(Debug, Clone)]
pub struct Options {
    pub files: Vec<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub include_paths: Vec<PathBuf>,
    pub defines: Vec<(String, String)>,
    pub logical: LogicalLiterals,
    pub max_rewrites: usize,
    pub dump_tables: Option<PathBuf>,
}

impl Options {
    pub fn from_args_and_config(args: Args) -> Result<Self, ConfigError> {
        let file_config = match args.config.as_ref() {
            Some(path) => FileConfig::from_file(path)?.ok_or_else(|| ConfigError::Io {
                path: path.clone(),
                source: std::io::ErrorKind::NotFound.into(),
            })?,
            None => FileConfig::from_nearest(Path::new("."))?,
        };
        Self::merge(args, file_config)
    }

    /// Command line args take precedence over config file
    pub fn merge(args: Args, file_config: FileConfig) -> Result<Self, ConfigError> {
        let defaults = PreprocessorConfig::default();

        let pathsep = args
            .pathsep
            .or(file_config.pathsep)
            .unwrap_or_else(default_pathsep);
        let include = args
            .include
            .or(file_config.include)
            .unwrap_or_else(|| ".".into());
        let include_paths = include
            .split(pathsep.as_str())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect();

        // Command-line defines come last so they override the file.
        let defines = file_config
            .define
            .unwrap_or_default()
            .iter()
            .chain(args.define.iter())
            .map(|d| parse_define(d))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            files: args.files,
            out_dir: args.out_dir.or(file_config.out_dir),
            include_paths,
            defines,
            logical: LogicalLiterals {
                truth: args
                    .true_literal
                    .or(file_config.true_literal)
                    .unwrap_or(defaults.logical.truth),
                falsehood: args
                    .false_literal
                    .or(file_config.false_literal)
                    .unwrap_or(defaults.logical.falsehood),
            },
            max_rewrites: args
                .max_rewrites
                .or(file_config.max_rewrites)
                .unwrap_or(defaults.max_rewrites),
            dump_tables: args.dump_tables.or(file_config.dump_tables),
        })
    }

    pub fn preprocessor_config(&self) -> PreprocessorConfig {
        PreprocessorConfig {
            include_paths: self.include_paths.clone(),
            defines: self.defines.clone(),
            logical: self.logical.clone(),
            max_rewrites: self.max_rewrites,
        }
    }
}

/// Splits `NAME=VALUE`; a bare `NAME` defines an empty value.
pub fn parse_define(define: &str) -> Result<(String, String), ConfigError> {
    let (name, value) = define.split_once('=').unwrap_or((define, ""));
    let name = name.trim();
    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    if !valid {
        return Err(ConfigError::InvalidDefine(define.to_string()));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
