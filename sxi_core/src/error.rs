use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum SxiError {
	#[error(transparent)]
	#[diagnostic(code(sxi::io_error))]
	Io(#[from] std::io::Error),

	#[error("sxi-this: {reason} ({path})")]
	#[diagnostic(
		code(sxi::malformed_root_tag),
		help(
			"the `src` attribute must begin with `/` and match the tail of the file's own path, \
			 e.g. `<!--#sxi-this src=\"/index.htm\" -->`"
		)
	)]
	MalformedRootTag { path: String, reason: String },

	#[error("sxi-include: must specify either a `src` or a `file` attribute ({path})")]
	#[diagnostic(
		code(sxi::missing_include_attribute),
		help("use `<!--#sxi-include src=\"/web/path\" -->` or `<!--#sxi-include file=\"relative/path\" -->`")
	)]
	MissingIncludeAttribute { path: String },

	#[error("sxi-include: failed to find source. {attribute}=\"{value}\" ({path})")]
	#[diagnostic(code(sxi::reference_not_found))]
	ReferenceNotFound {
		attribute: String,
		value: String,
		path: String,
	},

	#[error("sxi-endinclude tag not found ({path})")]
	#[diagnostic(
		code(sxi::unterminated_include),
		help("close every include with `<!--#sxi-endinclude-->`")
	)]
	UnterminatedInclude { path: String },

	#[error("includes nested deeper than {limit} levels at `{path}`")]
	#[diagnostic(
		code(sxi::include_depth_exceeded),
		help("check for a file that includes itself, directly or through another file")
	)]
	IncludeDepthExceeded { path: String, limit: usize },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(sxi::config_parse),
		help("check that sxi.toml is valid TOML")
	)]
	ConfigParse(String),

	#[error("invalid file pattern `{pattern}`: {reason}")]
	#[diagnostic(code(sxi::invalid_pattern))]
	InvalidPattern { pattern: String, reason: String },

	#[error("`{path}` is not valid text in a supported encoding")]
	#[diagnostic(
		code(sxi::invalid_encoding),
		help("supported encodings: utf-8 (with or without bom), utf-16le and utf-16be with bom")
	)]
	InvalidEncoding { path: String },
}

pub type SxiResult<T> = Result<T, SxiError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
