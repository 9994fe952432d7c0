#[cfg(test)]
mod tests {
    use crate::config::{ConfigError, FileConfig};
    use crate::options::{parse_define, Args, Options};
    use crate::pipeline::{run_with_options, CliError};
    use cmdpp_macros::PreprocessError;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Create a new temporary directory for each test
    fn setup_test_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    fn write_test_file(temp_dir: &TempDir, name: &str, content: &str) -> io::Result<PathBuf> {
        let path = temp_dir.path().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    fn options(args: Args) -> Options {
        Options::merge(args, FileConfig::default()).unwrap()
    }

    #[test]
    fn test_writes_into_out_dir() -> Result<(), Box<dyn std::error::Error>> {
        let temp = setup_test_dir();
        let input = write_test_file(&temp, "main.prg", "#define WHO world\nhello WHO\n")?;

        let out_dir = temp.path().join("out");
        run_with_options(&options(Args {
            files: vec![input],
            out_dir: Some(out_dir.clone()),
            ..Default::default()
        }))?;

        assert_eq!(
            fs::read_to_string(out_dir.join("main.prg.out"))?,
            "hello world\n"
        );
        Ok(())
    }

    #[test]
    fn test_include_roots_from_options() -> Result<(), Box<dyn std::error::Error>> {
        let temp = setup_test_dir();
        fs::create_dir(temp.path().join("inc"))?;
        fs::write(temp.path().join("inc/defs.ch"), "#define N 3\n")?;
        let input = write_test_file(&temp, "main.prg", "#include \"defs.ch\"\nx := N\n")?;

        let out_dir = temp.path().join("out");
        run_with_options(&options(Args {
            files: vec![input],
            out_dir: Some(out_dir.clone()),
            include: Some(format!("missing:{}", temp.path().join("inc").display())),
            pathsep: Some(":".into()),
            ..Default::default()
        }))?;

        assert_eq!(fs::read_to_string(out_dir.join("main.prg.out"))?, "x := 3\n");
        Ok(())
    }

    #[test]
    fn test_dump_tables() -> Result<(), Box<dyn std::error::Error>> {
        let temp = setup_test_dir();
        let input = write_test_file(
            &temp,
            "rules.prg",
            "#define ADD(a, b) a + b\n#translate NOW => time()\n",
        )?;
        let dump = temp.path().join("dump/tables.json");

        run_with_options(&options(Args {
            files: vec![input.clone()],
            out_dir: Some(temp.path().join("out")),
            dump_tables: Some(dump.clone()),
            ..Default::default()
        }))?;

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&dump)?)?;
        let tables = &json[input.display().to_string()];
        assert_eq!(tables["macros"]["functions"]["ADD"]["arity"], 2);
        assert_eq!(tables["rules"]["inline"].as_array().map(Vec::len), Some(1));
        Ok(())
    }

    #[test]
    fn test_file_not_found() {
        let temp = setup_test_dir();
        let missing = temp.path().join("does-not-exist.prg");

        match run_with_options(&options(Args {
            files: vec![missing.clone()],
            ..Default::default()
        })) {
            Err(CliError::InputNotFound { path }) => assert_eq!(path, missing),
            other => panic!("Expected InputNotFound error, got: {:?}", other),
        }
    }

    #[test]
    fn test_preprocess_error_names_the_file() -> Result<(), Box<dyn std::error::Error>> {
        let temp = setup_test_dir();
        let input = write_test_file(&temp, "bad.prg", "ok\n#bogus\n")?;
        let out_dir = temp.path().join("out");

        match run_with_options(&options(Args {
            files: vec![input.clone()],
            out_dir: Some(out_dir.clone()),
            ..Default::default()
        })) {
            Err(CliError::PreprocessError {
                path,
                source: PreprocessError::Syntax { line, .. },
            }) => {
                assert_eq!(path, input);
                assert_eq!(line, 2);
            }
            other => panic!("Expected a syntax error, got: {:?}", other),
        }
        assert!(!out_dir.join("bad.prg.out").exists());
        Ok(())
    }

    #[test]
    fn test_command_line_overrides_config_file() {
        let file_config = FileConfig {
            include: Some("a;b".into()),
            pathsep: Some(";".into()),
            define: Some(vec!["MODE=slow".into(), "EXTRA".into()]),
            true_literal: Some("yes".into()),
            max_rewrites: Some(8),
            ..Default::default()
        };
        let args = Args {
            define: vec!["MODE=fast".into()],
            max_rewrites: Some(16),
            ..Default::default()
        };
        let options = Options::merge(args, file_config).unwrap();

        assert_eq!(
            options.include_paths,
            vec![PathBuf::from("a"), PathBuf::from("b")]
        );
        assert_eq!(
            options.defines,
            vec![
                ("MODE".to_string(), "slow".to_string()),
                ("EXTRA".to_string(), String::new()),
                ("MODE".to_string(), "fast".to_string()),
            ]
        );
        assert_eq!(options.logical.truth, "yes");
        assert_eq!(options.logical.falsehood, ".F.");
        assert_eq!(options.max_rewrites, 16);
        assert_eq!(options.preprocessor_config().max_rewrites, 16);
    }

    #[test]
    fn test_parse_define() {
        assert_eq!(
            parse_define("A=1").unwrap(),
            ("A".to_string(), "1".to_string())
        );
        assert_eq!(
            parse_define("EQ==").unwrap(),
            ("EQ".to_string(), "=".to_string())
        );
        assert_eq!(parse_define("_B").unwrap(), ("_B".to_string(), String::new()));
        assert!(matches!(
            parse_define("1X=2"),
            Err(ConfigError::InvalidDefine(_))
        ));
        assert!(matches!(parse_define("=2"), Err(ConfigError::InvalidDefine(_))));
    }

    #[test]
    fn test_config_file_sources_are_merged() -> Result<(), Box<dyn std::error::Error>> {
        let temp = setup_test_dir();
        write_test_file(
            &temp,
            "Cargo.toml",
            "[package]\nname = \"demo\"\n\n[package.metadata.cmdpp]\ninclude = \"from-cargo\"\nmax-rewrites = 5\n",
        )?;
        write_test_file(
            &temp,
            "cmdpp.toml",
            "include = \"from-cmdpp\"\ndefine = [\"X=1\"]\n",
        )?;

        let config = FileConfig::from_nearest(temp.path())?;
        assert_eq!(config.include.as_deref(), Some("from-cmdpp"));
        assert_eq!(config.max_rewrites, Some(5));
        assert_eq!(config.define, Some(vec!["X=1".to_string()]));
        Ok(())
    }

    #[test]
    fn test_missing_and_malformed_config_files() -> Result<(), Box<dyn std::error::Error>> {
        let temp = setup_test_dir();
        assert_eq!(FileConfig::from_file(&temp.path().join("none.toml"))?, None);
        assert_eq!(FileConfig::from_nearest(temp.path())?, FileConfig::default());

        let broken = write_test_file(&temp, "broken.toml", "include = [\n")?;
        assert!(matches!(
            FileConfig::from_file(&broken),
            Err(ConfigError::Toml { .. })
        ));
        Ok(())
    }
}
