use std::path::Path;
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use clap::Parser;
use miette::GraphicalReportHandler;
use miette::GraphicalTheme;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use sxi_cli::SxiCli;
use sxi_core::BatchEvent;
use sxi_core::BatchReport;
use sxi_core::DocumentReport;
use sxi_core::RewriteOptions;
use sxi_core::RewriteOutcome;
use sxi_core::SxiConfig;
use sxi_core::SxiError;
use sxi_core::files::SelectOptions;
use sxi_core::files::collect_files;
use sxi_core::rewrite_all;
use sxi_core::text::read_text;
use tracing_subscriber::EnvFilter;

static USE_COLOR: AtomicBool = AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = SxiCli::parse();

	// Respect NO_COLOR, --no-color and terminals without color support.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stderr).is_some();
	USE_COLOR.store(use_color, Ordering::Relaxed);

	init_logging(args.verbose, use_color);

	match run(&args) {
		Ok(report) if report.is_ok() => {}
		Ok(_) => process::exit(1),
		Err(e) => {
			match e.downcast::<SxiError>() {
				Ok(sxi_err) => {
					let report: miette::Report = (*sxi_err).into();
					eprintln!("{report:?}");
				}
				Err(e) => {
					eprintln!("{} {e}", colored!("error:", red));
				}
			}
			process::exit(2);
		}
	}
}

/// Send library events to stderr. `SXI_LOG` takes precedence over the
/// verbosity flag.
fn init_logging(verbose: bool, use_color: bool) {
	let default_filter = if verbose { "sxi_core=debug" } else { "error" };
	let filter =
		EnvFilter::try_from_env("SXI_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.without_time()
		.init();
}

fn run(args: &SxiCli) -> Result<BatchReport, Box<dyn std::error::Error>> {
	let cwd = std::env::current_dir()?;
	let config = SxiConfig::load(&cwd)?.unwrap_or_default();

	let select = SelectOptions {
		recursive: args.recursive || config.recursive,
		exclude_patterns: config.exclude.patterns.clone(),
	};
	let selection = collect_files(&args.patterns, &cwd, &select)?;
	tracing::debug!(count = selection.files.len(), "selected documents");

	for pattern in &selection.unmatched {
		eprintln!(
			"{} no files match `{pattern}`",
			colored!("warning:", yellow)
		);
	}

	let options = RewriteOptions {
		dry_run: args.dry_run,
		..RewriteOptions::from_config(&config)
	};

	let report = rewrite_all(&selection.files, &options, |event| {
		match event {
			BatchEvent::Started(path) => {
				println!("Processing: {}", make_relative(path, &cwd));
			}
			BatchEvent::Finished(document) => print_document_result(args, document, &cwd),
		}
	});

	print_summary(&report, args.dry_run);
	Ok(report)
}

fn print_document_result(args: &SxiCli, document: &DocumentReport, cwd: &Path) {
	match &document.result {
		Ok(RewriteOutcome::Rewritten | RewriteOutcome::Unchanged) => {}
		Ok(RewriteOutcome::Previewed { rendered }) => {
			println!("  would update {}", make_relative(&document.path, cwd));

			if args.diff {
				match read_text(&document.path) {
					Ok(original) => print_diff(&original, rendered),
					Err(e) => eprintln!("{} {e}", colored!("error:", red)),
				}
			}
		}
		Err(e) if args.verbose => {
			let theme = if color_enabled() {
				GraphicalTheme::unicode()
			} else {
				GraphicalTheme::unicode_nocolor()
			};
			let mut rendered = String::new();
			if GraphicalReportHandler::new_themed(theme)
				.render_report(&mut rendered, e)
				.is_ok()
			{
				eprint!("{rendered}");
			} else {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		Err(e) => {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

fn print_summary(report: &BatchReport, dry_run: bool) {
	let failed = report.failed_count();
	let unchanged = report.unchanged_count();

	let summary = if dry_run {
		format!(
			"Dry run: would update {} file(s), {unchanged} without includes, {failed} failed.",
			report.previewed_count()
		)
	} else {
		format!(
			"Updated {} file(s), {unchanged} without includes, {failed} failed.",
			report.rewritten_count()
		)
	};

	if failed == 0 {
		println!("{summary}");
	} else {
		eprintln!("{}", colored!(summary, yellow));
	}
}

fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				print!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				print!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				print!("   {change}");
			}
		}
	}
}

/// Make a path relative to the working directory for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
