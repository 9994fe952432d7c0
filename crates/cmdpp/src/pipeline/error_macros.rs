// src/pipeline/error_macros.rs

#[macro_export]
macro_rules! try_read {
    ($path:expr) => {
        std::fs::read_to_string($path).map_err(|e| CliError::ReadError {
            path: $path.to_path_buf(),
            source: e,
        })
    };
}

#[macro_export]
macro_rules! try_write {
    ($path:expr, $content:expr) => {{
        let path = $path;
        // Ensure the parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CliError::CreateDirError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(path, $content).map_err(|e| CliError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }};
}

#[macro_export]
macro_rules! try_mkdir {
    ($path:expr) => {
        std::fs::create_dir_all($path).map_err(|e| CliError::CreateDirError {
            path: $path.to_path_buf(),
            source: e,
        })
    };
}

#[macro_export]
macro_rules! try_preprocess {
    ($path:expr, $result:expr) => {
        $result.map_err(|e| CliError::PreprocessError {
            path: $path.to_path_buf(),
            source: e,
        })
    };
}
