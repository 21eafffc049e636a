//! Locating the file an include tag refers to.
//!
//! A reference is either relative to the including document, or a web path
//! starting with `/` that is relative to the website root. The website root
//! is found in one of two ways:
//!
//! - **depth-directed**: the document declared its own web path with an
//!   `sxi-this` tag, so the root is a known number of directories above it.
//! - **trial ascent**: starting at the document's directory, each ancestor
//!   is tried in turn and the first one containing the referenced file wins.
//!   A same-named file higher up the tree can produce a false match, which
//!   is why declaring the root is preferred.
//!
//! Neither strategy ever climbs to the filesystem root itself: the highest
//! directory considered is the one directly below it.

use std::ffi::OsString;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::SxiError;
use crate::SxiResult;
use crate::tag::Tag;

/// Character that marks a web path as starting at the website root.
pub const ROOT_MARKER: char = '/';

/// Separators accepted inside references.
const REFERENCE_SEPARATORS: [char; 2] = ['/', '\\'];

/// How far the current document sits below the website root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RootDepth {
	/// No `sxi-this` tag has been seen yet.
	#[default]
	Unknown,
	/// The website root is this many directories above the document's own
	/// directory.
	Declared(usize),
}

/// The attributes of an include tag that name its target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeReference {
	/// A web path. Absolute when it starts with [`ROOT_MARKER`].
	pub src: Option<String>,
	/// A path relative to the including document.
	pub file: Option<String>,
}

impl IncludeReference {
	/// Read the reference from an include tag. Empty values count as absent.
	pub fn from_tag(tag: &Tag) -> Self {
		let non_empty = |key: &str| {
			tag.attribute(key)
				.filter(|value| !value.is_empty())
				.map(str::to_string)
		};

		Self {
			src: non_empty("src"),
			file: non_empty("file"),
		}
	}
}

/// A directory split into its filesystem root and named segments, which
/// can be walked upwards without ever removing the last named segment.
#[derive(Debug, Clone)]
struct Ancestry {
	root: PathBuf,
	segments: Vec<OsString>,
	floor: usize,
}

impl Ancestry {
	/// Start at the directory containing `document`.
	fn of_document(document: &Path) -> Self {
		let document = std::path::absolute(document)
			.map_or_else(|_| normalize_path(document), |absolute| normalize_path(&absolute));
		let directory = document.parent().unwrap_or(Path::new(""));
		let mut root = PathBuf::new();
		let mut segments = Vec::new();

		for component in directory.components() {
			match component {
				Component::Prefix(_) | Component::RootDir => root.push(component),
				Component::CurDir | Component::ParentDir => {}
				Component::Normal(segment) => segments.push(segment.to_os_string()),
			}
		}

		let floor = segments.len().min(1);
		Self {
			root,
			segments,
			floor,
		}
	}

	fn directory(&self) -> PathBuf {
		let mut directory = self.root.clone();
		directory.extend(&self.segments);
		directory
	}

	/// Move up one directory. Returns `false`, without moving, when the
	/// next step would reach the filesystem root.
	fn ascend(&mut self) -> bool {
		if self.segments.len() > self.floor {
			self.segments.pop();
			true
		} else {
			false
		}
	}
}

/// Resolve `reference` found in `document` to the absolute path of an
/// existing file.
pub fn resolve(
	reference: &IncludeReference,
	document: &Path,
	root_depth: RootDepth,
) -> SxiResult<PathBuf> {
	match (&reference.src, &reference.file) {
		(Some(src), _) if is_web_path(src) => resolve_web_path(src, document, root_depth),
		(_, Some(file)) => resolve_relative("file", file, document),
		(Some(src), None) => resolve_relative("src", src, document),
		(None, None) => {
			Err(SxiError::MissingIncludeAttribute {
				path: document.display().to_string(),
			})
		}
	}
}

/// Remove `.` segments and fold each `..` into the segment before it,
/// without touching the filesystem. A `..` directly below the root is
/// dropped; a leading `..` in a relative path is kept.
pub fn normalize_path(path: &Path) -> PathBuf {
	let mut normalized = PathBuf::new();

	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				if matches!(normalized.components().next_back(), Some(Component::Normal(_))) {
					normalized.pop();
				} else if !normalized.has_root() {
					normalized.push(component);
				}
			}
			Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
				normalized.push(component);
			}
		}
	}

	normalized
}

/// Whether `value` starts at the website root.
pub fn is_web_path(value: &str) -> bool {
	value.starts_with(REFERENCE_SEPARATORS)
}

/// Turn a `/`- or `\`-separated reference into a relative path.
fn reference_path(value: &str) -> PathBuf {
	value
		.split(REFERENCE_SEPARATORS)
		.filter(|segment| !segment.is_empty() && *segment != ".")
		.collect()
}

fn resolve_relative(attribute: &str, value: &str, document: &Path) -> SxiResult<PathBuf> {
	let candidate = Ancestry::of_document(document)
		.directory()
		.join(reference_path(value));
	tracing::debug!(candidate = %candidate.display(), "resolving relative reference");

	if candidate.is_file() {
		Ok(candidate)
	} else {
		Err(not_found(attribute, value, document))
	}
}

fn resolve_web_path(src: &str, document: &Path, root_depth: RootDepth) -> SxiResult<PathBuf> {
	let relative = reference_path(src);
	let mut ancestry = Ancestry::of_document(document);

	match root_depth {
		RootDepth::Declared(depth) => {
			for _ in 0..depth {
				if !ancestry.ascend() {
					break;
				}
			}

			let candidate = ancestry.directory().join(&relative);
			tracing::debug!(candidate = %candidate.display(), depth, "resolving web path from declared root");

			if candidate.is_file() {
				Ok(candidate)
			} else {
				Err(not_found("src", src, document))
			}
		}
		RootDepth::Unknown => {
			loop {
				let candidate = ancestry.directory().join(&relative);
				tracing::debug!(candidate = %candidate.display(), "trying web path candidate");

				if candidate.is_file() {
					return Ok(candidate);
				}

				if !ancestry.ascend() {
					return Err(not_found("src", src, document));
				}
			}
		}
	}
}

fn not_found(attribute: &str, value: &str, document: &Path) -> SxiError {
	SxiError::ReferenceNotFound {
		attribute: attribute.to_string(),
		value: value.to_string(),
		path: document.display().to_string(),
	}
}
