use std::io::Write;

use crate::SxiResult;
use crate::tag::Tag;
use crate::tag::parse_tag;

// Together these spell the `<!--#sxi--->` delimiter pattern. The body of a
// tag sits between the two halves.
const PREFIX: [char; 9] = ['<', '!', '-', '-', '#', 's', 'x', 'i', '-'];
const CLOSING: [char; 3] = ['-', '-', '>'];

/// Where the matcher is within the delimiter pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchState {
	/// Nothing accumulated.
	NoMatch,
	/// Part of the prefix matched; the value is the next prefix index to test.
	Prefix(usize),
	/// The prefix matched and every character now belongs to the tag. The
	/// value counts how much of the closing `-->` has been seen in a row.
	Body(usize),
}

/// A tag found by [`TagScanner::next_tag`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedTag {
	pub tag: Tag,
	/// The exact text that was matched, from `<!--#sxi-` through `-->`.
	pub text: String,
}

/// Streaming matcher that finds `<!--#sxi-... -->` tags in a character
/// source.
///
/// The matcher is greedy and never backtracks: a mismatch part way through
/// the prefix drops what was accumulated without re-testing the current
/// character, so `<<!--#sxi-include ... -->` is not recognised. The same
/// applies to the closing delimiter, so a body ending in `--->` keeps the
/// tag open.
pub struct TagScanner<I> {
	source: I,
}

impl<I> TagScanner<I>
where
	I: Iterator<Item = char>,
{
	pub fn new(source: I) -> Self {
		Self { source }
	}

	/// Consume characters until the next complete tag and return it, or
	/// `None` once the source is exhausted.
	///
	/// Every consumed character, tag text included, is mirrored to `sink`
	/// when one is given. A tag left unfinished at the end of the source is
	/// dropped.
	pub fn next_tag(&mut self, mut sink: Option<&mut dyn Write>) -> SxiResult<Option<ScannedTag>> {
		let mut state = MatchState::NoMatch;
		let mut text = String::new();
		let mut buffer = [0u8; 4];

		for c in self.source.by_ref() {
			if let Some(sink) = sink.as_mut() {
				sink.write_all(c.encode_utf8(&mut buffer).as_bytes())?;
			}

			state = match state {
				MatchState::NoMatch if c == PREFIX[0] => {
					text.push(c);
					MatchState::Prefix(1)
				}
				MatchState::NoMatch => MatchState::NoMatch,
				MatchState::Prefix(index) if c == PREFIX[index] => {
					text.push(c);
					if index + 1 == PREFIX.len() {
						MatchState::Body(0)
					} else {
						MatchState::Prefix(index + 1)
					}
				}
				MatchState::Prefix(_) => {
					text.clear();
					MatchState::NoMatch
				}
				MatchState::Body(closing) => {
					text.push(c);
					if c != CLOSING[closing] {
						MatchState::Body(0)
					} else if closing + 1 == CLOSING.len() {
						let tag = parse_tag(&text);
						tracing::trace!(label = %tag.label, "matched tag");
						return Ok(Some(ScannedTag { tag, text }));
					} else {
						MatchState::Body(closing + 1)
					}
				}
			};
		}

		if state != MatchState::NoMatch {
			tracing::trace!(partial = %text, "source ended inside a tag");
		}

		Ok(None)
	}
}
