/*!
# Compressed Output: Extraction.

Before anything gets minified, every span that must not be touched by the
generic rules is fenced off behind a placeholder. The rules run in a fixed
order, each against the output of the last.

Template syntax goes first. Directives inside a `<style>` or `<script>` are
thus already opaque by the time those elements are matched, and can't be
mistaken for CSS or JS (or trip up the tag matching).
*/

use crate::{
	MinifyError,
	protect::{
		OUTER,
		ProtectionMap,
		Sentinel,
		SpanKind,
	},
};
use regex::Regex;
use std::sync::LazyLock;



/// # Unescaped Output: `{!! … !!}`.
static RE_RAW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{!!.*?!!\}").unwrap());

/// # Escaped Interpolation: `{{ … }}` (and `{{-- … --}}`).
static RE_INTERPOLATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{\{.*?\}\}").unwrap());

/// # Style Elements.
static RE_STYLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").unwrap());

/// # Script Elements.
static RE_SCRIPT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").unwrap());

/// # Preformatted Elements.
static RE_PRE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<pre\b[^>]*>.*?</pre\s*>").unwrap());

/// # Textarea Elements.
static RE_TEXTAREA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<textarea\b[^>]*>.*?</textarea\s*>").unwrap());

/// # Conditional Comments.
///
/// This covers both the hidden (`<!--[if IE]>…<![endif]-->`) and revealed
/// (`<![if !IE]>`, `<![endif]>`) flavors.
static RE_CONDITIONAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(
	r"(?is)<!--\[if\b[^\]]*\]>.*?<!\[endif\]-->|<!\[(?:if\b[^\]]*|endif)\]>"
).unwrap());

/// # Block Directives.
///
/// These swallow everything up to their closing marker.
const BLOCK_DIRECTIVES: [(&str, &str); 2] = [
	("php", "@endphp"),
	("verbatim", "@endverbatim"),
];

/// # CSS At-Rules.
///
/// These look like directives but aren't.
const CSS_AT_RULES: [&str; 17] = [
	"charset",
	"container",
	"counter-style",
	"document",
	"font-face",
	"font-feature-values",
	"font-palette-values",
	"import",
	"keyframes",
	"layer",
	"media",
	"namespace",
	"page",
	"property",
	"scope",
	"starting-style",
	"supports",
];



/// # Extract Sensitive Spans.
///
/// Return a copy of the document with all sensitive spans replaced by
/// placeholders, along with the map needed to put them back.
///
/// ## Errors
///
/// If the document already contains any of the reserved placeholder
/// characters, uniqueness cannot be guaranteed and an error is returned.
pub(crate) fn extract(src: &str) -> Result<(String, ProtectionMap), MinifyError> {
	if Sentinel::is_reserved(src) { return Err(MinifyError::Sentinel); }

	let mut map = ProtectionMap::new(OUTER);
	let mut doc = directives(src, &mut map);
	for (re, kind) in [
		(&*RE_RAW, SpanKind::RawOutput),
		(&*RE_INTERPOLATION, SpanKind::Interpolation),
		(&*RE_STYLE, SpanKind::Style),
		(&*RE_SCRIPT, SpanKind::Script),
		(&*RE_PRE, SpanKind::Preformatted),
		(&*RE_TEXTAREA, SpanKind::Preformatted),
		(&*RE_CONDITIONAL, SpanKind::ConditionalComment),
	] {
		doc = map.protect_all(&doc, re, kind);
	}

	Ok((doc, map))
}

/// # Extract Directives.
///
/// A directive is an `@` followed by a name, and optionally a parenthesized
/// argument list. `@php` and `@verbatim` blocks are captured through to
/// their closing markers.
///
/// An `@` glued to the end of a word (e-mail addresses) is ignored, as are
/// escaped `@@` sequences and CSS at-rules.
fn directives(src: &str, map: &mut ProtectionMap) -> String {
	let bytes = src.as_bytes();
	let mut out = String::with_capacity(src.len());
	let mut last = 0;
	let mut pos = 0;

	while let Some(rel) = src[pos..].find('@') {
		let at = pos + rel;

		// Escaped.
		if bytes.get(at + 1) == Some(&b'@') {
			pos = at + 2;
			continue;
		}

		// Part of a word.
		if 0 < at && is_word(bytes[at - 1]) {
			pos = at + 1;
			continue;
		}

		// Not followed by a name.
		let name_end = at + 1 + bytes[at + 1..].iter()
			.take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-'))
			.count();
		if name_end == at + 1 || ! bytes[at + 1].is_ascii_alphabetic() {
			pos = at + 1;
			continue;
		}

		let name = &src[at + 1..name_end];
		if CSS_AT_RULES.iter().any(|r| name.eq_ignore_ascii_case(r)) {
			pos = name_end;
			continue;
		}

		let end = directive_end(src, name, name_end);
		out.push_str(&src[last..at]);
		out.push_str(&map.protect(SpanKind::Directive, src[at..end].to_owned()));
		last = end;
		pos = end;
	}

	out.push_str(&src[last..]);
	out
}

/// # Directive End.
///
/// Return the (exclusive) end of a directive whose name ends at `name_end`.
fn directive_end(src: &str, name: &str, name_end: usize) -> usize {
	let bytes = src.as_bytes();

	// Block directives, unless called inline like `@php($x = 1)`.
	if
		bytes.get(name_end) != Some(&b'(') &&
		let Some((_, close)) = BLOCK_DIRECTIVES.iter().find(|(n, _)| *n == name)
	{
		return src[name_end..].find(close)
			.map_or(name_end, |e| name_end + e + close.len());
	}

	// Arguments can be separated from the name by horizontal space.
	let open = name_end + bytes[name_end..].iter()
		.take_while(|b| matches!(b, b' ' | b'\t'))
		.count();
	if bytes.get(open) == Some(&b'(') && let Some(close) = balanced_end(bytes, open) {
		close + 1
	}
	else { name_end }
}

/// # Balanced Parenthesis.
///
/// Find the parenthesis closing the one at `open`, skipping over anything
/// quoted. Returns `None` if the group never closes.
fn balanced_end(bytes: &[u8], open: usize) -> Option<usize> {
	let mut depth = 0_usize;
	let mut quote: Option<u8> = None;
	let mut escaped = false;

	for (idx, &b) in bytes.iter().enumerate().skip(open) {
		if let Some(q) = quote {
			if escaped { escaped = false; }
			else if b == b'\\' { escaped = true; }
			else if b == q { quote = None; }
			continue;
		}

		match b {
			b'\'' | b'"' => { quote = Some(b); },
			b'(' => { depth += 1; },
			b')' => {
				depth -= 1;
				if depth == 0 { return Some(idx); }
			},
			_ => {},
		}
	}

	None
}

/// # Is Word Byte?
///
/// Non-ASCII bytes are assumed to belong to letters.
const fn is_word(b: u8) -> bool {
	b.is_ascii_alphanumeric() || b == b'_' || 0x80 <= b
}



#[cfg(test)]
mod tests {
	use super::*;

	/// # Captured Spans.
	fn captured(src: &str) -> Vec<(SpanKind, String)> {
		let (_, map) = extract(src).expect("Extraction failed.");
		map.entries().map(|(k, v)| (k, v.to_owned())).collect()
	}

	#[test]
	fn t_directives() {
		for (raw, expected) in [
			("@csrf", vec!["@csrf"]),
			("@if($a)<b>x</b>@endif", vec!["@if($a)", "@endif"]),
			("@if ($a == ')') x @else y @endif", vec!["@if ($a == ')')", "@else", "@endif"]),
			("@section('title', foo(1, 2)) hi", vec!["@section('title', foo(1, 2))"]),
			("@php $a = 1; @endphp <p>", vec!["@php $a = 1; @endphp"]),
			("@php($a = 1) <p>", vec!["@php($a = 1)"]),
			("@verbatim {{ raw }} @endverbatim", vec!["@verbatim {{ raw }} @endverbatim"]),
			// Runaway arguments only capture the name.
			("@if($a <p>", vec!["@if"]),
			// Not directives.
			("me@example.com", vec![]),
			("@@if", vec![]),
			("@ 1", vec![]),
			("@media (max-width: 10px)", vec![]),
			("@font-face{}", vec![]),
		] {
			let spans = captured(raw);
			let spans: Vec<&str> = spans.iter()
				.filter(|(k, _)| *k == SpanKind::Directive)
				.map(|(_, v)| v.as_str())
				.collect();
			assert_eq!(spans, expected, "{raw}");
		}
	}

	#[test]
	fn t_kinds() {
		let spans = captured(concat!(
			"{!! $html !!}{{ $text }}{{-- note --}}",
			"<STYLE media=\"print\">a{}</style >",
			"<script>var a = '{{ $b }}';</script>",
			"<pre>  a  </pre><textarea>\n</textarea>",
			"<!--[if lt IE 9]><p>Old!</p><![endif]--><!-- plain -->",
		));

		let kinds: Vec<SpanKind> = spans.iter().map(|(k, _)| *k).collect();
		assert_eq!(kinds, vec![
			SpanKind::RawOutput,
			SpanKind::Interpolation,
			SpanKind::Interpolation,
			SpanKind::Interpolation,
			SpanKind::Style,
			SpanKind::Script,
			SpanKind::Preformatted,
			SpanKind::Preformatted,
			SpanKind::ConditionalComment,
		]);

		// The script should hold a placeholder for the interpolation rather
		// than the interpolation itself.
		assert!(! spans[5].1.contains("{{"));
		assert!(spans[5].1.starts_with("<script>var a = '"));
	}

	#[test]
	fn t_reserved() {
		assert!(matches!(extract("<p>\u{FDD0}</p>"), Err(MinifyError::Sentinel)));
		assert!(matches!(extract("<p>\u{FDD3}</p>"), Err(MinifyError::Sentinel)));

		// Private-use glyphs (icon fonts) are fine.
		let raw = "<i class=\"icon\">\u{E000}</i>";
		let (doc, map) = extract(raw).expect("Extraction failed.");
		assert_eq!(map.restore(&doc).as_deref(), Ok(raw));
	}

	#[test]
	fn t_round_trip() {
		let raw = "<div>@if($a) {{ $a }} @endif<style>a { }</style><!--[if IE]><br><![endif]--></div>";
		let (doc, map) = extract(raw).expect("Extraction failed.");
		assert_eq!(doc.matches(OUTER.open).count(), 5);
		assert_eq!(map.restore(&doc).as_deref(), Ok(raw));
	}
}
