use derive_more::Deref;

/// Fixed text that opens every tag, up to and including the dash that
/// precedes the label.
pub const TAG_PREFIX: &str = "<!--#sxi-";

/// Fixed text that closes every tag.
pub const TAG_SUFFIX: &str = "-->";

/// Closing marker written after the freshly rendered content of an include.
pub const END_INCLUDE_MARKER: &str = "<!--#sxi-endinclude-->";

/// Label of the root declaration tag.
pub const LABEL_THIS: &str = "this";
/// Label of the tag opening an include region.
pub const LABEL_INCLUDE: &str = "include";
/// Label of the tag closing an include region.
pub const LABEL_END_INCLUDE: &str = "endinclude";

/// Ordered `key="value"` pairs read from a tag body.
///
/// Keys keep the case they were written with and the order they were first
/// seen in. A repeated key replaces the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
	/// Look up the value of `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0
			.iter()
			.find(|(k, _)| k == key)
			.map(|(_, value)| value.as_str())
	}

	fn insert(&mut self, key: String, value: String) {
		match self.0.iter_mut().find(|(k, _)| *k == key) {
			Some(entry) => entry.1 = value,
			None => self.0.push((key, value)),
		}
	}
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		let mut attributes = Self::default();
		for (key, value) in iter {
			attributes.insert(key.into(), value.into());
		}
		attributes
	}
}

/// A parsed `<!--#sxi-label key="value" -->` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
	/// The word directly after the prefix, e.g. `include`. Empty when the tag
	/// body starts with whitespace.
	pub label: String,
	pub attributes: Attributes,
}

impl Tag {
	pub fn attribute(&self, key: &str) -> Option<&str> {
		self.attributes.get(key)
	}

	pub fn is(&self, label: &str) -> bool {
		self.label == label
	}
}

/// Walks the characters of a tag body.
struct BodyCursor {
	chars: Vec<char>,
	index: usize,
}

impl BodyCursor {
	fn new(body: &str) -> Self {
		Self {
			chars: body.chars().collect(),
			index: 0,
		}
	}

	fn current(&self) -> Option<char> {
		self.chars.get(self.index).copied()
	}

	/// Advance while `predicate` holds and return what was passed over.
	fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
		let start = self.index;
		while self.current().is_some_and(&predicate) {
			self.index += 1;
		}
		self.chars[start..self.index].iter().collect()
	}

	/// Advance past everything up to `delimiter`, then past the delimiter
	/// itself when present.
	fn skip_past(&mut self, delimiter: char) {
		self.take_while(|c| c != delimiter);
		if self.current().is_some() {
			self.index += 1;
		}
	}
}

/// Parse the exact text of a matched tag into a [`Tag`].
///
/// No validation happens here beyond staying in bounds. A garbled body still
/// produces a tag, possibly with an empty label or odd attributes, and the
/// caller decides what is acceptable.
pub fn parse_tag(text: &str) -> Tag {
	let body = text.strip_prefix(TAG_PREFIX).unwrap_or(text);
	let body = body.strip_suffix(TAG_SUFFIX).unwrap_or(body);
	let mut cursor = BodyCursor::new(body);

	let label = cursor.take_while(|c| !c.is_whitespace());
	let mut attributes = Attributes::default();

	loop {
		cursor.take_while(char::is_whitespace);
		let key = cursor.take_while(|c| c != '=' && !c.is_whitespace());
		cursor.skip_past('=');
		cursor.skip_past('"');
		let value = cursor.take_while(|c| c != '"');
		cursor.skip_past('"');

		if key.is_empty() {
			break;
		}

		attributes.insert(key, value);
	}

	Tag { label, attributes }
}
