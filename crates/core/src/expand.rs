//! Path pattern expansion
//!
//! A pattern names project directories; a directory is a project when it
//! directly contains a `Gruntfile.js` (matched case-insensitively).

use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::types::{SubgruntError, SubgruntResult};

/// Build descriptor identifying a sub-project
pub const DESCRIPTOR_FILE: &str = "Gruntfile.js";

const GLOB_META: &[char] = &['*', '?', '[', ']', '{', '}'];

/// A concrete project directory resolved from a pattern
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchedProject {
    pub dir: PathBuf,
}

impl fmt::Display for MatchedProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir.display())
    }
}

/// Compiled form of `<pattern>/Gruntfile.js`
struct DescriptorGlob {
    /// Directory the walk starts from (the glob-free prefix of the pattern)
    root: PathBuf,
    matcher: GlobMatcher,
    /// Deepest level below `root` a match can live at, or `None` for `**` patterns
    max_depth: Option<usize>,
}

impl DescriptorGlob {
    fn compile(pattern: &str, base_dir: &Path) -> SubgruntResult<Self> {
        let full = format!("{}/{}", pattern.trim_end_matches('/'), DESCRIPTOR_FILE);
        let components: Vec<&str> = full.split('/').collect();

        // Everything before the first glob component except the descriptor itself
        let literal_len = components[..components.len() - 1]
            .iter()
            .take_while(|component| !component.contains(GLOB_META))
            .count();
        let (literal, rest) = components.split_at(literal_len);

        let literal_path = literal.join("/");
        let root = if full.starts_with('/') {
            PathBuf::from(if literal_path.is_empty() {
                "/"
            } else {
                literal_path.as_str()
            })
        } else {
            base_dir.join(literal_path)
        };

        let rest_glob = rest.join("/");
        let matcher = GlobBuilder::new(&rest_glob)
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .map_err(|e| invalid(pattern, e.to_string()))?
            .compile_matcher();

        let max_depth = if rest.iter().any(|component| component.contains("**")) {
            None
        } else {
            Some(rest.len())
        };

        Ok(Self {
            root,
            matcher,
            max_depth,
        })
    }
}

fn invalid(pattern: &str, reason: impl Into<String>) -> SubgruntError {
    SubgruntError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: reason.into(),
    }
}

/// Resolve `pattern` (relative to `base_dir` unless absolute) to the project directories it matches.
///
/// The result is sorted and free of duplicates. Matching nothing, or failing to
/// read the directory the walk starts from, is an [`SubgruntError::InvalidPattern`].
pub fn expand_pattern(pattern: &str, base_dir: &Path) -> SubgruntResult<Vec<MatchedProject>> {
    let glob = DescriptorGlob::compile(pattern, base_dir)?;
    debug!(
        pattern,
        root = %glob.root.display(),
        max_depth = ?glob.max_depth,
        "expanding pattern"
    );

    let mut projects = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back((glob.root.clone(), 0usize));

    while let Some((current_dir, depth)) = queue.pop_front() {
        let read_from = if current_dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            current_dir.as_path()
        };

        let entries = match std::fs::read_dir(read_from) {
            Ok(entries) => entries,
            Err(e) if depth == 0 => return Err(invalid(pattern, e.to_string())),
            Err(e) => {
                debug!(dir = %read_from.display(), error = %e, "skipping unreadable directory");
                continue;
            }
        };

        for entry in entries.flatten() {
            let path = current_dir.join(entry.file_name());
            let relative_path = path.strip_prefix(&glob.root).unwrap_or(&path);
            let Ok(file_type) = entry.file_type() else {
                continue;
            };

            // Symlinked directories are only followed when the walk is depth-bounded
            let is_dir = file_type.is_dir()
                || (file_type.is_symlink() && glob.max_depth.is_some() && path.is_dir());

            if is_dir {
                if glob.max_depth.map_or(true, |max| depth + 1 < max) {
                    queue.push_back((path, depth + 1));
                }
            } else if glob.matcher.is_match(relative_path) && path.is_file() {
                if let Some(dir) = path.parent() {
                    projects.push(MatchedProject {
                        dir: dir.to_path_buf(),
                    });
                }
            }
        }
    }

    if projects.is_empty() {
        return Err(invalid(pattern, "no matching Gruntfile found"));
    }

    projects.sort();
    projects.dedup();
    Ok(projects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn project(root: &Path, rel: &str, descriptor: &str) -> PathBuf {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(descriptor), "module.exports = function () {};\n").unwrap();
        dir
    }

    fn dirs(projects: &[MatchedProject]) -> Vec<PathBuf> {
        projects.iter().map(|p| p.dir.clone()).collect()
    }

    #[test]
    fn test_literal_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        let web = project(root, "apps/web", DESCRIPTOR_FILE);

        let projects = expand_pattern("apps/web", root).unwrap();

        assert_eq!(dirs(&projects), vec![web]);
    }

    #[test]
    fn test_wildcard_is_sorted_and_skips_non_projects() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        let b = project(root, "apps/b", DESCRIPTOR_FILE);
        let a = project(root, "apps/a", DESCRIPTOR_FILE);
        fs::create_dir_all(root.join("apps/empty")).unwrap();
        project(root, "apps/a/nested", DESCRIPTOR_FILE);

        let projects = expand_pattern("apps/*", root).unwrap();

        assert_eq!(dirs(&projects), vec![a, b]);
    }

    #[test]
    fn test_descriptor_match_is_case_insensitive() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        let lower = project(root, "libs/lower", "gruntfile.js");
        let upper = project(root, "libs/upper", "GRUNTFILE.JS");

        let projects = expand_pattern("libs/*", root).unwrap();

        assert_eq!(dirs(&projects), vec![lower, upper]);
    }

    #[test]
    fn test_double_star_reaches_nested_projects() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        let top = project(root, "packages/top", DESCRIPTOR_FILE);
        let deep = project(root, "packages/group/inner/deep", DESCRIPTOR_FILE);

        let projects = expand_pattern("packages/**", root).unwrap();

        assert_eq!(dirs(&projects), vec![deep, top]);
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        let web = project(root, "web", DESCRIPTOR_FILE);

        let projects = expand_pattern("web/", root).unwrap();

        assert_eq!(dirs(&projects), vec![web]);
    }

    #[test]
    fn test_absolute_pattern_ignores_base_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let web = project(temp_dir.path(), "web", DESCRIPTOR_FILE);
        let other = tempfile::tempdir().unwrap();

        let pattern = web.to_string_lossy().to_string();
        let projects = expand_pattern(&pattern, other.path()).unwrap();

        assert_eq!(dirs(&projects), vec![web]);
    }

    #[test]
    fn test_no_match_is_invalid() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join("apps/web")).unwrap();

        let err = expand_pattern("apps/*", temp_dir.path()).unwrap_err();

        assert!(matches!(err, SubgruntError::InvalidPattern { .. }));
        assert_eq!(
            err.to_string(),
            "The \"apps/*\" directory is not valid, or does not contain a Gruntfile."
        );
    }

    #[test]
    fn test_missing_root_is_invalid() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = expand_pattern("does/not/exist", temp_dir.path()).unwrap_err();
        assert!(matches!(err, SubgruntError::InvalidPattern { .. }));
    }

    #[test]
    fn test_bad_glob_is_invalid() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = expand_pattern("apps/[", temp_dir.path()).unwrap_err();
        assert!(matches!(err, SubgruntError::InvalidPattern { .. }));
    }
}
