use std::ffi::OsString;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::path::PathBuf;

use crate::SxiResult;
use crate::config::DEFAULT_SCRATCH_SUFFIX;
use crate::config::SxiConfig;
use crate::engine::IncludeOptions;
use crate::engine::process_document;

/// Options controlling how documents are rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
	/// Appended to a document's path to form its scratch file.
	pub scratch_suffix: String,
	pub include: IncludeOptions,
	/// Render in memory and leave every file on disk untouched.
	pub dry_run: bool,
}

impl Default for RewriteOptions {
	fn default() -> Self {
		Self {
			scratch_suffix: DEFAULT_SCRATCH_SUFFIX.to_string(),
			include: IncludeOptions::default(),
			dry_run: false,
		}
	}
}

impl RewriteOptions {
	pub fn from_config(config: &SxiConfig) -> Self {
		Self {
			scratch_suffix: config.scratch_suffix.clone(),
			include: IncludeOptions::from(config),
			dry_run: false,
		}
	}
}

/// What happened to a document that was processed without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
	/// Includes were expanded and the original file was replaced.
	Rewritten,
	/// No include tags were found; the file was left as it was.
	Unchanged,
	/// Dry run only: includes were expanded into `rendered`, nothing was
	/// written.
	Previewed { rendered: String },
}

/// The path of the scratch file used while rewriting `path`.
pub fn scratch_path(path: &Path, suffix: &str) -> PathBuf {
	let mut scratch: OsString = path.as_os_str().to_os_string();
	scratch.push(suffix);
	PathBuf::from(scratch)
}

/// A scratch file that is removed when dropped unless it has been moved
/// over its target.
struct ScratchFile {
	path: PathBuf,
	persisted: bool,
}

impl ScratchFile {
	fn new(path: PathBuf) -> Self {
		Self {
			path,
			persisted: false,
		}
	}

	/// Rename the scratch file over `target`.
	fn persist(mut self, target: &Path) -> SxiResult<()> {
		std::fs::rename(&self.path, target)?;
		self.persisted = true;
		Ok(())
	}
}

impl Drop for ScratchFile {
	fn drop(&mut self) {
		if self.persisted {
			return;
		}

		match std::fs::remove_file(&self.path) {
			Ok(()) => {}
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
			Err(e) => {
				tracing::warn!(path = %self.path.display(), error = %e, "failed to remove scratch file");
			}
		}
	}
}

/// Expand the includes of the document at `path` and write the result back
/// in place.
///
/// The expanded document is first written in full to a scratch file next to
/// the original. Only when that succeeds, and at least one include was
/// expanded, is the scratch file renamed over the original. On every other
/// path the scratch file is removed and the original is left untouched.
pub fn rewrite(path: &Path, options: &RewriteOptions) -> SxiResult<RewriteOutcome> {
	if options.dry_run {
		return preview(path, options);
	}

	let scratch = ScratchFile::new(scratch_path(path, &options.scratch_suffix));
	let mut writer = BufWriter::new(File::create(&scratch.path)?);
	let expanded = process_document(path, &mut writer, &options.include)?;
	let file = writer.into_inner().map_err(std::io::IntoInnerError::into_error)?;
	file.sync_all()?;
	drop(file);

	if !expanded {
		tracing::debug!(path = %path.display(), "no includes found");
		return Ok(RewriteOutcome::Unchanged);
	}

	scratch.persist(path)?;
	tracing::info!(path = %path.display(), "rewrote document");

	Ok(RewriteOutcome::Rewritten)
}

fn preview(path: &Path, options: &RewriteOptions) -> SxiResult<RewriteOutcome> {
	let mut buffer = Vec::new();
	let expanded = process_document(path, &mut buffer, &options.include)?;

	if !expanded {
		return Ok(RewriteOutcome::Unchanged);
	}

	// Everything written to the buffer came from decoded `char`s.
	let rendered = String::from_utf8_lossy(&buffer).into_owned();
	Ok(RewriteOutcome::Previewed { rendered })
}

/// The result of rewriting one document in a batch.
#[derive(Debug)]
pub struct DocumentReport {
	pub path: PathBuf,
	pub result: SxiResult<RewriteOutcome>,
}

/// Progress notifications emitted by [`rewrite_all`].
#[derive(Debug)]
pub enum BatchEvent<'a> {
	Started(&'a Path),
	Finished(&'a DocumentReport),
}

/// Results for every document in a batch, in the order processed.
#[derive(Debug, Default)]
pub struct BatchReport {
	pub documents: Vec<DocumentReport>,
}

impl BatchReport {
	/// Returns true if no document failed.
	pub fn is_ok(&self) -> bool {
		self.documents.iter().all(|report| report.result.is_ok())
	}

	pub fn failures(&self) -> impl Iterator<Item = &DocumentReport> {
		self.documents.iter().filter(|report| report.result.is_err())
	}

	fn count(&self, predicate: impl Fn(&RewriteOutcome) -> bool) -> usize {
		self.documents
			.iter()
			.filter(|report| report.result.as_ref().is_ok_and(&predicate))
			.count()
	}

	pub fn rewritten_count(&self) -> usize {
		self.count(|outcome| matches!(outcome, RewriteOutcome::Rewritten))
	}

	pub fn previewed_count(&self) -> usize {
		self.count(|outcome| matches!(outcome, RewriteOutcome::Previewed { .. }))
	}

	pub fn unchanged_count(&self) -> usize {
		self.count(|outcome| matches!(outcome, RewriteOutcome::Unchanged))
	}

	pub fn failed_count(&self) -> usize {
		self.failures().count()
	}
}

/// Rewrite each document in turn. A failing document is recorded in the
/// report and the batch carries on with the next one.
pub fn rewrite_all<P>(
	paths: &[P],
	options: &RewriteOptions,
	mut on_event: impl FnMut(BatchEvent<'_>),
) -> BatchReport
where
	P: AsRef<Path>,
{
	let mut report = BatchReport::default();

	for path in paths {
		let path = path.as_ref();
		on_event(BatchEvent::Started(path));

		let result = rewrite(path, options);
		if let Err(e) = &result {
			tracing::warn!(path = %path.display(), error = %e, "document skipped");
		}

		let document = DocumentReport {
			path: path.to_path_buf(),
			result,
		};
		on_event(BatchEvent::Finished(&document));
		report.documents.push(document);
	}

	report
}
