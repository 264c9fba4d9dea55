/*!
# Compressed Output: Protection Maps.

Content that must survive a minification pass untouched is swapped out for a
placeholder, and swapped back in once the dust has settled.

Placeholders take the form `OPEN + index + CLOSE`, where `OPEN` and `CLOSE`
are Unicode noncharacters (`U+FDD0`–`U+FDD3`), which never turn up in real
documents the way private-use icon-font glyphs do. The closing character
keeps any one key from being a prefix of another, so restoration never has
to worry about order.

Placeholders for whole elements are additionally wrapped in angle brackets,
so that the generic markup rules see them as the tags they stand in for.
*/

use crate::MinifyError;
use regex::{
	Captures,
	Regex,
};



/// # Document-Level Sentinels.
pub(crate) const OUTER: Sentinel = Sentinel {
	open: '\u{FDD0}',
	close: '\u{FDD1}',
};

/// # Span-Level Sentinels.
///
/// Style and script minification uses its own pair so nested maps can never
/// be confused with the document-level one.
pub(crate) const INNER: Sentinel = Sentinel {
	open: '\u{FDD2}',
	close: '\u{FDD3}',
};



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Sentinel Pair.
pub(crate) struct Sentinel {
	/// # Opening Character.
	pub(crate) open: char,

	/// # Closing Character.
	pub(crate) close: char,
}

impl Sentinel {
	#[must_use]
	/// # Contains Any Reserved Characters?
	///
	/// Returns `true` if the text contains the opening or closing character
	/// of _any_ sentinel pair, not just this one.
	pub(crate) fn is_reserved(src: &str) -> bool {
		src.contains([OUTER.open, OUTER.close, INNER.open, INNER.close])
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Span Kind.
///
/// This records which rule captured a given span. Only `Style` and `Script`
/// are ever rewritten; everything else is restored exactly as it was found.
pub(crate) enum SpanKind {
	/// # Template Directive (`@if(…)`).
	Directive,

	/// # Unescaped Output (`{!! … !!}`).
	RawOutput,

	/// # Escaped Interpolation (`{{ … }}`).
	Interpolation,

	/// # `<style>` Element.
	Style,

	/// # `<script>` Element.
	Script,

	/// # `<pre>` or `<textarea>` Element.
	Preformatted,

	/// # Conditional Comment (`<!--[if IE]>…<![endif]-->`).
	ConditionalComment,

	/// # String, Template, or Regular Expression Literal.
	Literal,

	/// # Descendant Selector (`.a .b`).
	Selector,

	/// # Chained Call Head (`$(…)`).
	ChainHead,
}

impl SpanKind {
	#[must_use]
	/// # Is Element?
	///
	/// Returns `true` for kinds that stand in for whole elements (or
	/// element-like comments).
	pub(crate) const fn is_element(self) -> bool {
		matches!(
			self,
			Self::Style | Self::Script | Self::Preformatted | Self::ConditionalComment
		)
	}
}



#[derive(Debug, Clone)]
/// # Protected Entry.
struct Entry {
	/// # Kind.
	kind: SpanKind,

	/// # Content.
	text: String,

	/// # Locked?
	///
	/// This is set for entries enclosed by a conditional comment, which must
	/// come back exactly as written.
	locked: bool,
}

#[derive(Debug, Clone)]
/// # Protection Map.
///
/// An ordered collection of protected spans. The position of each entry is
/// also its key, so keys are unique and strictly increasing for the life of
/// the map.
pub(crate) struct ProtectionMap {
	/// # Sentinels.
	sentinel: Sentinel,

	/// # Entries.
	entries: Vec<Entry>,
}

impl ProtectionMap {
	#[must_use]
	/// # New.
	pub(crate) const fn new(sentinel: Sentinel) -> Self {
		Self {
			sentinel,
			entries: Vec::new(),
		}
	}

	#[cfg(test)]
	#[must_use]
	/// # Length.
	pub(crate) fn len(&self) -> usize { self.entries.len() }

	/// # Protect.
	///
	/// Store the text and return the placeholder that stands in for it.
	pub(crate) fn protect(&mut self, kind: SpanKind, text: String) -> String {
		if kind == SpanKind::ConditionalComment { self.lock_within(&text); }

		let key = self.key(kind, self.entries.len());
		self.entries.push(Entry { kind, text, locked: false });
		key
	}

	#[must_use]
	/// # Protect All Matches.
	///
	/// Replace every (non-overlapping) match of the pattern with a fresh
	/// placeholder.
	pub(crate) fn protect_all(&mut self, src: &str, re: &Regex, kind: SpanKind)
	-> String {
		re.replace_all(src, |caps: &Captures<'_>| self.protect(kind, caps[0].to_owned()))
			.into_owned()
	}

	/// # Entries (Mutable).
	///
	/// Keys are fixed; only the content can change. Locked entries are
	/// skipped.
	pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item=(SpanKind, &mut String)> {
		self.entries.iter_mut()
			.filter(|e| ! e.locked)
			.map(|e| (e.kind, &mut e.text))
	}

	#[cfg(test)]
	/// # Entries.
	pub(crate) fn entries(&self) -> impl Iterator<Item=(SpanKind, &str)> {
		self.entries.iter().map(|e| (e.kind, e.text.as_str()))
	}

	/// # Restore.
	///
	/// Swap every placeholder in the source for its current content.
	///
	/// Content may itself contain placeholders (a stylesheet inside a
	/// conditional comment, for example); those are expanded too. Because
	/// an entry can only ever enclose keys that existed before it was
	/// created, the expansion always bottoms out.
	///
	/// ## Errors
	///
	/// An unknown, malformed, or out-of-order key is an error.
	pub(crate) fn restore(&self, src: &str) -> Result<String, MinifyError> {
		let mut out = String::with_capacity(src.len() + self.entries.iter().map(|e| e.text.len()).sum::<usize>());
		self.restore_into(src, self.entries.len(), &mut out)?;
		Ok(out)
	}

	/// # Restore (Recursive).
	///
	/// Only keys below `limit` are legal in `src`.
	fn restore_into(&self, mut src: &str, limit: usize, out: &mut String)
	-> Result<(), MinifyError> {
		while let Some(start) = src.find(self.sentinel.open) {
			let after = &src[start + self.sentinel.open.len_utf8()..];
			let end = after.find(self.sentinel.close).ok_or(MinifyError::Restore)?;
			let idx: usize = after[..end].parse().map_err(|_| MinifyError::Restore)?;
			if limit <= idx { return Err(MinifyError::Restore); }

			let mut before = &src[..start];
			let mut after = &after[end + self.sentinel.close.len_utf8()..];

			// Element keys take their brackets with them.
			let entry = &self.entries[idx];
			if entry.kind.is_element() {
				before = before.strip_suffix('<').ok_or(MinifyError::Restore)?;
				after = after.strip_prefix('>').ok_or(MinifyError::Restore)?;
			}

			out.push_str(before);
			self.restore_into(&entry.text, idx, out)?;
			src = after;
		}

		// A stray closer means something got mangled.
		if src.contains(self.sentinel.close) { return Err(MinifyError::Restore); }

		out.push_str(src);
		Ok(())
	}

	/// # Lock Enclosed Entries.
	///
	/// Mark every entry referenced by the text (and anything _they_
	/// reference) as locked.
	fn lock_within(&mut self, src: &str) {
		let mut rest = src;
		while let Some(start) = rest.find(self.sentinel.open) {
			rest = &rest[start + self.sentinel.open.len_utf8()..];
			let Some(end) = rest.find(self.sentinel.close) else { return; };
			if
				let Ok(idx) = rest[..end].parse::<usize>() &&
				let Some(entry) = self.entries.get_mut(idx) &&
				! entry.locked
			{
				entry.locked = true;
				let text = entry.text.clone();
				self.lock_within(&text);
			}
			rest = &rest[end + self.sentinel.close.len_utf8()..];
		}
	}

	/// # Key.
	fn key(&self, kind: SpanKind, idx: usize) -> String {
		if kind.is_element() {
			format!("<{}{idx}{}>", self.sentinel.open, self.sentinel.close)
		}
		else {
			format!("{}{idx}{}", self.sentinel.open, self.sentinel.close)
		}
	}
}
