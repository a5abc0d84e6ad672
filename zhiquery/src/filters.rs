//! Selection of dataset files inside the dataset directory.
//!
//! These are free functions over paths; they never open the files. With no
//! extension list and no ignore patterns every file is a dataset.
use glob::Pattern;
use std::path::Path;

fn extension_of(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Checks a dataset file name against the configured extensions; no list
/// accepts every extension, a list never accepts a file without one
pub fn has_valid_extension(path: &Path, extensions: &Option<Vec<String>>) -> bool {
    let Some(allowed) = extensions else {
        return true;
    };
    extension_of(path).is_some_and(|ext| allowed.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Checks if a file matches one of the ignore patterns, either by file name
/// or by its full path
pub fn should_ignore(path: &Path, ignore_patterns: &[String]) -> bool {
    let normalized_path = path.to_string_lossy().replace('\\', "/");
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    ignore_patterns.iter().any(|pattern| match Pattern::new(pattern) {
        Ok(p) => p.matches(&file_name) || p.matches(&normalized_path),
        Err(_) => false,
    })
}

/// Determines if a file should be read as a dataset
pub fn should_include_dataset(
    path: &Path,
    extensions: &Option<Vec<String>>,
    ignore_patterns: &[String],
) -> bool {
    has_valid_extension(path, extensions)
        && !should_ignore(path, ignore_patterns)
}
