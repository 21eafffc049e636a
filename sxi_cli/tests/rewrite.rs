mod common;

use common::EXPANDED_HEADER;
use common::HEADER_INCLUDE;
use common::site;
use common::sxi_cmd;
use common::write;
use predicates::prelude::*;
use similar_asserts::assert_eq;
use sxi_core::AnyEmptyResult;

#[test]
fn rewrites_matching_files() -> AnyEmptyResult {
	let tmp = site()?;
	write(&tmp.path().join("index.htm"), HEADER_INCLUDE)?;
	write(&tmp.path().join("about.htm"), HEADER_INCLUDE)?;
	write(&tmp.path().join("plain.htm"), "<p>no includes</p>\n")?;

	sxi_cmd(tmp.path())
		.arg("*.htm")
		.assert()
		.success()
		.stdout(predicate::str::contains("Processing: about.htm"))
		.stdout(predicate::str::contains("Processing: index.htm"))
		.stdout(predicate::str::contains(
			"Updated 2 file(s), 1 without includes, 0 failed.",
		));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("index.htm"))?,
		EXPANDED_HEADER
	);
	assert_eq!(
		std::fs::read_to_string(tmp.path().join("about.htm"))?,
		EXPANDED_HEADER
	);
	assert_eq!(
		std::fs::read_to_string(tmp.path().join("plain.htm"))?,
		"<p>no includes</p>\n"
	);
	assert!(!tmp.path().join("index.htm.tmp").exists());

	Ok(())
}

#[test]
fn failing_document_does_not_stop_the_batch() -> AnyEmptyResult {
	let tmp = site()?;
	let broken = "<!--#sxi-include src=\"/_includes/header.htm\" -->\nno end\n";
	write(&tmp.path().join("a.htm"), HEADER_INCLUDE)?;
	write(&tmp.path().join("b.htm"), broken)?;
	write(&tmp.path().join("c.htm"), HEADER_INCLUDE)?;

	sxi_cmd(tmp.path())
		.arg("*.htm")
		.assert()
		.code(1)
		.stderr(predicate::str::contains("error: sxi-endinclude tag not found"))
		.stderr(predicate::str::contains(
			"Updated 2 file(s), 0 without includes, 1 failed.",
		));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("a.htm"))?,
		EXPANDED_HEADER
	);
	assert_eq!(std::fs::read_to_string(tmp.path().join("b.htm"))?, broken);
	assert_eq!(
		std::fs::read_to_string(tmp.path().join("c.htm"))?,
		EXPANDED_HEADER
	);
	assert!(!tmp.path().join("b.htm.tmp").exists());

	Ok(())
}

#[test]
fn verbose_failure_includes_help() -> AnyEmptyResult {
	let tmp = site()?;
	write(
		&tmp.path().join("b.htm"),
		"<!--#sxi-include src=\"/_includes/header.htm\" -->\n",
	)?;

	sxi_cmd(tmp.path())
		.arg("--verbose")
		.arg("b.htm")
		.assert()
		.code(1)
		.stderr(predicate::str::contains("close every include with"));

	Ok(())
}

#[test]
fn dry_run_does_not_write() -> AnyEmptyResult {
	let tmp = site()?;
	write(&tmp.path().join("index.htm"), HEADER_INCLUDE)?;

	sxi_cmd(tmp.path())
		.arg("--dry-run")
		.arg("--diff")
		.arg("index.htm")
		.assert()
		.success()
		.stdout(predicate::str::contains("would update index.htm"))
		.stdout(predicate::str::contains("-old header"))
		.stdout(predicate::str::contains("+<h1>Site</h1>"))
		.stdout(predicate::str::contains("Dry run: would update 1 file(s)"));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("index.htm"))?,
		HEADER_INCLUDE
	);

	Ok(())
}

#[test]
fn diff_requires_dry_run() -> AnyEmptyResult {
	let tmp = site()?;

	sxi_cmd(tmp.path())
		.arg("--diff")
		.arg("index.htm")
		.assert()
		.failure();

	Ok(())
}

#[test]
fn recursive_flag_descends_into_subdirectories() -> AnyEmptyResult {
	let tmp = site()?;
	write(&tmp.path().join("docs/guide/index.htm"), HEADER_INCLUDE)?;
	write(&tmp.path().join("sxi.toml"), "[exclude]\npatterns = [\"_includes/\"]\n")?;

	sxi_cmd(tmp.path())
		.arg("-s")
		.arg("*.htm")
		.assert()
		.success()
		.stdout(predicate::str::contains("Updated 1 file(s)"))
		.stdout(predicate::str::contains("_includes").not());

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("docs/guide/index.htm"))?,
		EXPANDED_HEADER
	);

	Ok(())
}

#[test]
fn recursion_can_be_enabled_in_config() -> AnyEmptyResult {
	let tmp = site()?;
	write(&tmp.path().join("docs/index.htm"), HEADER_INCLUDE)?;
	write(
		&tmp.path().join(".sxi.toml"),
		"recursive = true\n\n[exclude]\npatterns = [\"_includes/\"]\n",
	)?;

	sxi_cmd(tmp.path()).arg("*.htm").assert().success();

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("docs/index.htm"))?,
		EXPANDED_HEADER
	);

	Ok(())
}

#[test]
fn unmatched_pattern_is_a_warning() -> AnyEmptyResult {
	let tmp = site()?;

	sxi_cmd(tmp.path())
		.arg("*.html")
		.assert()
		.success()
		.stderr(predicate::str::contains("warning: no files match `*.html`"));

	Ok(())
}

#[test]
fn invalid_config_is_fatal() -> AnyEmptyResult {
	let tmp = site()?;
	write(&tmp.path().join("index.htm"), HEADER_INCLUDE)?;
	write(&tmp.path().join("sxi.toml"), "recursive = \"sometimes\"\n")?;

	sxi_cmd(tmp.path())
		.arg("index.htm")
		.assert()
		.code(2)
		.stderr(predicate::str::contains("failed to parse config file"));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("index.htm"))?,
		HEADER_INCLUDE
	);

	Ok(())
}

#[test]
fn requires_at_least_one_pattern() -> AnyEmptyResult {
	let tmp = site()?;

	sxi_cmd(tmp.path())
		.assert()
		.failure()
		.stderr(predicate::str::contains("Usage"));

	Ok(())
}

#[test]
fn help_describes_tag_syntax() -> AnyEmptyResult {
	let tmp = site()?;

	sxi_cmd(tmp.path())
		.arg("--help")
		.assert()
		.success()
		.stdout(predicate::str::contains("<!--#sxi-endinclude-->"))
		.stdout(predicate::str::contains("<!--#sxi-this src=\"/index.htm\" -->"));

	Ok(())
}

#[test]
fn parent_directory_pattern_honours_declared_root() -> AnyEmptyResult {
	let tmp = site()?;
	let pinned = "<!--#sxi-this src=\"/docs/index.htm\" -->\n<!--#sxi-include \
	              src=\"/_includes/header.htm\" --><!--#sxi-endinclude-->\n";
	write(&tmp.path().join("docs/index.htm"), pinned)?;
	write(&tmp.path().join("docs/drafts/notes.txt"), "")?;

	sxi_cmd(&tmp.path().join("docs/drafts"))
		.arg("../*.htm")
		.assert()
		.success()
		.stdout(predicate::str::contains("Updated 1 file(s), 0 without includes, 0 failed."));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("docs/index.htm"))?,
		"<!--#sxi-this src=\"/docs/index.htm\" -->\n<!--#sxi-include \
		 src=\"/_includes/header.htm\" -->\n<h1>Site</h1>\n<!--#sxi-endinclude-->\n"
	);

	Ok(())
}
