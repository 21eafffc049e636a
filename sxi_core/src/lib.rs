//! `sxi_core` is the engine behind [sxi](https://docs.rs/sxi_cli), a tool
//! that resolves server-side-include style tags into static html files once,
//! at build time, so the web server has nothing left to include at request
//! time.
//!
//! ## Tags
//!
//! ```html
//! <!--#sxi-this src="/docs/index.htm" -->
//!
//! <!--#sxi-include src="/_includes/header.htm" -->
//! anything here is replaced on every run
//! <!--#sxi-endinclude-->
//!
//! <!--#sxi-include file="../_includes/footer.htm" -->
//! <!--#sxi-endinclude-->
//! ```
//!
//! The include tags stay in the document, so running sxi again refreshes the
//! included content in place. Included files may contain include tags of
//! their own; those are expanded when the included file is processed.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Document
//!   → Tag scanner (copies text through, stops at each `<!--#sxi-...-->`)
//!   → Tag parser (label + ordered attributes)
//!   → Engine (`this` sets the root depth, `include` is resolved and expanded)
//!   → Path resolver (relative file, or web path by declared depth / ascent)
//!   → Rewriter (scratch file, renamed over the original on success)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sxi_core::RewriteOptions;
//! use sxi_core::rewrite;
//! use std::path::Path;
//!
//! let outcome = rewrite(Path::new("/srv/site/index.htm"), &RewriteOptions::default())?;
//! println!("{outcome:?}");
//! # Ok::<(), sxi_core::SxiError>(())
//! ```

pub use config::*;
pub use engine::*;
pub use error::*;
pub use resolver::IncludeReference;
pub use resolver::RootDepth;
pub use rewriter::*;
pub use scanner::*;
pub use tag::*;

pub mod config;
mod engine;
#[allow(unused_assignments)]
mod error;
pub mod files;
pub mod resolver;
mod rewriter;
mod scanner;
mod tag;
pub mod text;
