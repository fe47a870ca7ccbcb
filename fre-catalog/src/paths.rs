//! Absolute, lexically normalised paths for catalog inputs and outputs.

use std::{
    io,
    path::{Component, Path, PathBuf},
};

/// Makes `path` absolute against the current directory and folds `.` and
/// `..` components without touching the filesystem.
///
/// `..` at the root stays at the root. Symlinks are not resolved.
pub(crate) fn resolve(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[cfg(unix)]
    #[rstest]
    #[case::plain("/archive/pp", "/archive/pp")]
    #[case::parent("/archive/extra/../pp", "/archive/pp")]
    #[case::current("/archive/./pp/.", "/archive/pp")]
    #[case::trailing_slash("/archive/pp/", "/archive/pp")]
    #[case::above_root("/../archive", "/archive")]
    fn folds_dot_components(#[case] raw: &str, #[case] expected: &str) {
        let resolved = resolve(Path::new(raw)).expect("absolute input resolves");
        assert_eq!(resolved, PathBuf::from(expected));
    }

    #[test]
    fn relative_input_is_anchored_at_current_dir() {
        let cwd = std::env::current_dir().expect("current dir");
        let resolved = resolve(Path::new("extra/../cat.csv")).expect("relative input resolves");
        assert!(resolved.is_absolute());
        assert!(!resolved.components().any(|part| part == Component::ParentDir));
        assert_eq!(resolved.file_name().and_then(|name| name.to_str()), Some("cat.csv"));
        assert_eq!(resolved.parent(), Some(resolve(&cwd).expect("cwd resolves").as_path()));
    }
}
