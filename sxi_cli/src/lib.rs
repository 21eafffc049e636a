use clap::Parser;

#[derive(Parser)]
#[command(
	name = "sxi",
	author,
	version,
	about = "Resolve server-side-include style tags into static html files.",
	long_about = "sxi performs html includes once, when the tool is run, instead of on every \
	              request. The content between an include tag and its endinclude tag is \
	              replaced by the included file, and the tags are kept so the next run refreshes \
	              it.\n\nTags live in html comments, so browsers ignore them, but anyone viewing \
	              the page source can read them. Keep secrets out of them.\n\nAn include \
	              starts with one of:\n  <!--#sxi-include src=\"/_includes/header.htm\" -->\n  \
	              <!--#sxi-include file=\"../_includes/header.htm\" -->\nand ends with:\n  \
	              <!--#sxi-endinclude-->\n\nIncluded files may contain includes of their own; \
	              inner tags are resolved after the outer ones.\n\nA `file` path is relative to \
	              the including file. A `src` web path that starts with `/` is relative to the \
	              website root, which sxi finds by walking up the directory tree until the path \
	              exists. To pin the root instead, declare where the current file sits on the \
	              website:\n  <!--#sxi-this src=\"/index.htm\" -->\nThis says the file is \
	              `index.htm` in the root of the website."
)]
#[allow(clippy::struct_excessive_bools)]
pub struct SxiCli {
	/// Html files to process. The file name may contain wildcards, e.g.
	/// `site/*.htm`.
	#[arg(required = true, value_name = "FILES")]
	pub patterns: Vec<String>,

	/// Also process matching files in subdirectories.
	#[arg(long, short = 's', default_value_t = false)]
	pub recursive: bool,

	/// Enable verbose output, including full error diagnostics.
	#[arg(long, short, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,

	/// Expand includes in memory and report which files would change,
	/// without writing anything.
	#[arg(long, default_value_t = false)]
	pub dry_run: bool,

	/// With `--dry-run`, show a diff of each change.
	#[arg(long, default_value_t = false, requires = "dry_run")]
	pub diff: bool,
}
