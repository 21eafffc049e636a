use std::path::Path;

use assert_cmd::Command;
use sxi_core::AnyEmptyResult;

pub const HEADER_INCLUDE: &str = "<html>\n<!--#sxi-include src=\"/_includes/header.htm\" \
                                  -->\nold header\n<!--#sxi-endinclude-->\n<p>body</p>\n</html>\n";

pub const EXPANDED_HEADER: &str = "<html>\n<!--#sxi-include src=\"/_includes/header.htm\" \
                                   -->\n<h1>Site</h1>\n<!--#sxi-endinclude-->\n<p>body</p>\n</html>\n";

/// An `sxi` command running inside `dir` with colors disabled.
pub fn sxi_cmd(dir: &Path) -> Command {
	#[allow(deprecated)]
	let mut cmd = Command::cargo_bin("sxi").unwrap_or_else(|e| panic!("sxi binary: {e}"));
	cmd.current_dir(dir).env("NO_COLOR", "1").env_remove("SXI_LOG");
	cmd
}

pub fn write(path: &Path, content: &str) -> AnyEmptyResult {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)?;
	Ok(())
}

/// A small site with a shared header under `_includes/`.
pub fn site() -> Result<tempfile::TempDir, sxi_core::AnyError> {
	let tmp = tempfile::tempdir()?;
	write(&tmp.path().join("_includes/header.htm"), "<h1>Site</h1>\n")?;
	Ok(tmp)
}
