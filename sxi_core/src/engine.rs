use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use crate::SxiError;
use crate::SxiResult;
use crate::config::DEFAULT_MAX_INCLUDE_DEPTH;
use crate::config::SxiConfig;
use crate::resolver::IncludeReference;
use crate::resolver::ROOT_MARKER;
use crate::resolver::RootDepth;
use crate::resolver::normalize_path;
use crate::resolver::resolve;
use crate::scanner::TagScanner;
use crate::tag::END_INCLUDE_MARKER;
use crate::tag::LABEL_END_INCLUDE;
use crate::tag::LABEL_INCLUDE;
use crate::tag::LABEL_THIS;
use crate::tag::Tag;
use crate::text::read_text;

/// Options for expanding includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncludeOptions {
	/// How deeply includes may nest before processing is abandoned.
	pub max_include_depth: usize,
}

impl Default for IncludeOptions {
	fn default() -> Self {
		Self {
			max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
		}
	}
}

impl From<&SxiConfig> for IncludeOptions {
	fn from(config: &SxiConfig) -> Self {
		Self {
			max_include_depth: config.max_include_depth,
		}
	}
}

/// State for one scan of one document. Each included file gets its own
/// context when it is processed, so a root declared inside an included file
/// never leaks into the file that included it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionContext {
	/// The document being scanned.
	pub source_path: PathBuf,
	/// Where the website root sits relative to `source_path`.
	pub root_depth: RootDepth,
	/// How many includes deep this document is. Zero for the document being
	/// rewritten.
	pub nesting: usize,
}

impl InclusionContext {
	pub fn new(source_path: impl Into<PathBuf>, nesting: usize) -> Self {
		Self {
			source_path: source_path.into(),
			root_depth: RootDepth::Unknown,
			nesting,
		}
	}
}

/// Copy the document at `path` to `out`, replacing the body of every
/// include region with the freshly expanded content of the file it refers
/// to.
///
/// Returns `true` when at least one include was expanded.
pub fn process_document(
	path: &Path,
	out: &mut dyn Write,
	options: &IncludeOptions,
) -> SxiResult<bool> {
	process_nested(InclusionContext::new(path, 0), out, options)
}

fn process_nested(
	mut context: InclusionContext,
	out: &mut dyn Write,
	options: &IncludeOptions,
) -> SxiResult<bool> {
	if context.nesting > options.max_include_depth {
		return Err(SxiError::IncludeDepthExceeded {
			path: context.source_path.display().to_string(),
			limit: options.max_include_depth,
		});
	}

	tracing::debug!(path = %context.source_path.display(), nesting = context.nesting, "processing document");
	let content = read_text(&context.source_path)?;
	let mut scanner = TagScanner::new(content.chars());
	let mut expanded = false;

	while let Some(scanned) = scanner.next_tag(Some(&mut *out))? {
		let tag = scanned.tag;

		match tag.label.as_str() {
			LABEL_THIS => {
				context.root_depth = declared_root_depth(&tag, &context.source_path)?;
				tracing::debug!(root_depth = ?context.root_depth, "root declared");
			}
			LABEL_INCLUDE => {
				expand_include(&tag, &context, out, options)?;
				skip_replaced_region(&mut scanner, &context.source_path)?;
				expanded = true;
			}
			label => {
				tracing::debug!(label, "ignoring tag");
			}
		}
	}

	Ok(expanded)
}

/// Work out the root depth declared by an `sxi-this` tag in `document`.
///
/// The `src` value must start at the website root and, compared without
/// regard to case or separator style, must be the tail of the document's
/// own path. Each separator after the first is one directory below the
/// root.
pub fn declared_root_depth(tag: &Tag, document: &Path) -> SxiResult<RootDepth> {
	let malformed = |reason: &str| {
		SxiError::MalformedRootTag {
			path: document.display().to_string(),
			reason: reason.to_string(),
		}
	};

	let Some(src) = tag.attribute("src") else {
		return Err(malformed("expected `src` attribute"));
	};

	let src = normalize_for_comparison(src);
	let own_path = normalize_for_comparison(&normalize_path(document).display().to_string());

	if !src.starts_with(ROOT_MARKER) || !own_path.ends_with(&src) {
		return Err(malformed(
			"`src` attribute must begin with slash and match tail of physical file path",
		));
	}

	let separators = src.matches(ROOT_MARKER).count();
	Ok(RootDepth::Declared(separators - 1))
}

fn normalize_for_comparison(path: &str) -> String {
	path.to_lowercase().replace('\\', "/")
}

fn expand_include(
	tag: &Tag,
	context: &InclusionContext,
	out: &mut dyn Write,
	options: &IncludeOptions,
) -> SxiResult<()> {
	let reference = IncludeReference::from_tag(tag);
	let target = resolve(&reference, &context.source_path, context.root_depth)?;
	tracing::debug!(from = %context.source_path.display(), target = %target.display(), "expanding include");

	writeln!(out)?;
	process_nested(
		InclusionContext::new(target, context.nesting + 1),
		out,
		options,
	)?;
	out.write_all(END_INCLUDE_MARKER.as_bytes())?;

	Ok(())
}

/// Discard the original body of an include region that has just been
/// replaced, up to and including its matching `sxi-endinclude` tag.
fn skip_replaced_region<I>(scanner: &mut TagScanner<I>, document: &Path) -> SxiResult<()>
where
	I: Iterator<Item = char>,
{
	let mut depth = 1usize;

	while depth > 0 {
		let Some(scanned) = scanner.next_tag(None)? else {
			return Err(SxiError::UnterminatedInclude {
				path: document.display().to_string(),
			});
		};

		match scanned.tag.label.as_str() {
			LABEL_INCLUDE => depth += 1,
			LABEL_END_INCLUDE => depth -= 1,
			_ => {}
		}
	}

	Ok(())
}
