//! Expanding command-line patterns into the documents to process.
//!
//! A pattern is an ordinary path whose final component may contain
//! wildcards, e.g. `site/*.htm`. The directory part is taken relative to the
//! base directory and is never itself a wildcard.

use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::GlobBuilder;
use globset::GlobMatcher;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::SxiError;
use crate::SxiResult;
use crate::resolver::normalize_path;

/// Documents selected by a set of patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
	/// Absolute, sorted, de-duplicated document paths.
	pub files: Vec<PathBuf>,
	/// Patterns that did not select any file.
	pub unmatched: Vec<String>,
}

/// How patterns are expanded.
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
	/// Also match file names in every subdirectory.
	pub recursive: bool,
	/// Gitignore-style patterns, relative to the base directory, for paths
	/// that are never selected.
	pub exclude_patterns: Vec<String>,
}

/// Expand `patterns` relative to `base` into the list of documents to
/// process.
pub fn collect_files(
	patterns: &[String],
	base: &Path,
	options: &SelectOptions,
) -> SxiResult<FileSelection> {
	let base = normalize_path(&std::path::absolute(base)?);
	let exclude = build_exclude_matcher(&base, &options.exclude_patterns)?;
	let mut selection = FileSelection::default();
	let mut seen = HashSet::new();

	for pattern in patterns {
		let (directory, matcher) = split_pattern(pattern, &base)?;
		let mut matched = Vec::new();
		let mut visited_dirs = HashSet::new();

		walk_dir(
			&directory,
			&matcher,
			options.recursive,
			&exclude,
			&mut matched,
			&mut visited_dirs,
		)?;

		tracing::debug!(pattern, count = matched.len(), "expanded pattern");
		if matched.is_empty() {
			selection.unmatched.push(pattern.clone());
		}

		for path in matched {
			if seen.insert(path.clone()) {
				selection.files.push(path);
			}
		}
	}

	selection.files.sort();
	Ok(selection)
}

/// Split a pattern into the absolute directory to search and a matcher for
/// file names.
fn split_pattern(pattern: &str, base: &Path) -> SxiResult<(PathBuf, GlobMatcher)> {
	let invalid = |reason: String| {
		SxiError::InvalidPattern {
			pattern: pattern.to_string(),
			reason,
		}
	};

	let path = Path::new(pattern);
	let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
		return Err(invalid("pattern must end with a file name".to_string()));
	};

	let directory = match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => base.join(parent),
		_ => base.to_path_buf(),
	};

	let matcher = GlobBuilder::new(name)
		.literal_separator(true)
		.build()
		.map_err(|e| invalid(e.to_string()))?
		.compile_matcher();

	Ok((normalize_path(&std::path::absolute(directory)?), matcher))
}

/// Build a `Gitignore` matcher from the configured exclude patterns.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> SxiResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			SxiError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| SxiError::ConfigParse(format!("failed to build exclude rules: {e}")))
}

fn is_excluded(exclude: &Gitignore, path: &Path, is_dir: bool) -> bool {
	// Paths outside the exclude root cannot be matched and would panic.
	path.starts_with(exclude.path())
		&& exclude
			.matched_path_or_any_parents(path, is_dir)
			.is_ignore()
}

fn walk_dir(
	dir: &Path,
	matcher: &GlobMatcher,
	recursive: bool,
	exclude: &Gitignore,
	files: &mut Vec<PathBuf>,
	visited_dirs: &mut HashSet<PathBuf>,
) -> SxiResult<()> {
	if !dir.is_dir() {
		return Ok(());
	}

	// Symlinked directories can loop back on themselves.
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if !visited_dirs.insert(canonical) {
		return Ok(());
	}

	let mut entries = std::fs::read_dir(dir)?
		.map(|entry| entry.map(|entry| entry.path()))
		.collect::<Result<Vec<_>, _>>()?;
	entries.sort();

	for path in entries {
		let is_dir = path.is_dir();

		if is_excluded(exclude, &path, is_dir) {
			continue;
		}

		if is_dir {
			if recursive {
				walk_dir(&path, matcher, recursive, exclude, files, visited_dirs)?;
			}
		} else if path
			.file_name()
			.is_some_and(|name| matcher.is_match(Path::new(name)))
		{
			files.push(path);
		}
	}

	Ok(())
}
