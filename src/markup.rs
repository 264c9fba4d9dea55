/*!
# Compressed Output: Generic Markup.

By the time this runs, everything sensitive has been swapped out for a
placeholder, so these rules only ever see plain markup.

Only ASCII whitespace is touched. The no-break space (`\xA0`) renders
differently than the rest, so it is left alone.

Attribute values made up entirely of `[A-Za-z0-9_-]` lose their quotes,
e.g. `class="nav"` becomes `class=nav`. Anything fancier stays quoted.
*/

use regex::{
	Captures,
	Regex,
};
use std::sync::LazyLock;



/// # Comments.
static RE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

/// # Whitespace After a Tag.
static RE_AFTER_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">[\t\n\x0C\r ]+").unwrap());

/// # Whitespace Before a Tag.
static RE_BEFORE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\t\n\x0C\r ]+<").unwrap());

/// # Whitespace Runs.
static RE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\t\n\x0C\r ]{2,}").unwrap());

/// # Stray Line Breaks and Tabs.
static RE_STRAY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\t\n\x0C\r]").unwrap());

/// # Opening Tags.
static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[A-Za-z][^<>]*>").unwrap());



#[must_use]
/// # Minify Markup.
///
/// Strip comments (the conditional ones are already protected), drop
/// whitespace touching a tag boundary, collapse the rest, and unquote the
/// simple attribute values.
pub(crate) fn minify(src: &str) -> String {
	let out = RE_COMMENT.replace_all(src, "");
	let out = RE_AFTER_TAG.replace_all(&out, ">");
	let out = RE_BEFORE_TAG.replace_all(&out, "<");
	let out = RE_RUNS.replace_all(&out, " ");
	let out = RE_STRAY.replace_all(&out, " ");
	let out = RE_TAG.replace_all(&out, |caps: &Captures| unquote_values(&caps[0]));
	out.trim_matches(|c: char| c.is_ascii_whitespace()).to_owned()
}

/// # Unquote Attribute Values.
///
/// Quoted values are walked as whole units so a quote character inside some
/// other value is never mistaken for a boundary. A value is only unquoted if
/// it directly follows an `=`, is non-empty, is entirely `[A-Za-z0-9_-]`, and
/// is followed by whitespace or the closing `>`. (A trailing `/` would
/// otherwise be read as part of the value.)
///
/// If the quotes don't balance, the tag is returned as-was.
fn unquote_values(tag: &str) -> String {
	let bytes = tag.as_bytes();
	let mut out = String::with_capacity(tag.len());
	let mut last = 0;
	let mut idx = 0;

	while idx < bytes.len() {
		let quote = bytes[idx];
		if quote != b'"' && quote != b'\'' {
			idx += 1;
			continue;
		}

		let Some(len) = bytes[idx + 1..].iter().position(|&b| b == quote) else {
			return tag.to_owned();
		};
		let end = idx + 1 + len;
		let value = &bytes[idx + 1..end];

		if
			0 < idx && bytes[idx - 1] == b'=' &&
			! value.is_empty() &&
			value.iter().all(|&b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-')) &&
			bytes.get(end + 1).is_some_and(|&b| b == b'>' || b.is_ascii_whitespace())
		{
			out.push_str(&tag[last..idx]);
			out.push_str(&tag[idx + 1..end]);
			last = end + 1;
		}

		idx = end + 1;
	}

	out.push_str(&tag[last..]);
	out
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn t_minify() {
		for (raw, expected) in [
			("<div>  \n  hello  </div>", "<div>hello</div>"),
			("<p>Hello\nworld,\t\thow  are you?</p>", "<p>Hello world, how are you?</p>"),
			("<ul>\n\t<li>One</li>\n\t<li>Two</li>\n</ul>\n", "<ul><li>One</li><li>Two</li></ul>"),
			("<p>a <!-- note --> b</p>", "<p>a b</p>"),
			("<p>\n<!--\nmulti\nline\n-->\n</p>", "<p></p>"),
			("<div\n   class=\"a\"\n   id=\"b\">x</div>", "<div class=a id=b>x</div>"),
			("<p>a\u{a0}\u{a0}b</p>", "<p>a\u{a0}\u{a0}b</p>"),
			("  plain text  ", "plain text"),
			("", ""),
		] {
			let out = minify(raw);
			assert_eq!(out, expected, "{raw:?}");
			assert_eq!(minify(&out), out);
		}
	}

	#[test]
	fn t_unquote_values() {
		for (raw, expected) in [
			// Unquoted.
			("<a class=\"nav\">", "<a class=nav>"),
			("<a class='nav-item_2'>", "<a class=nav-item_2>"),
			("<input type=\"checkbox\" name=\"ok\" checked>", "<input type=checkbox name=ok checked>"),
			("<div data-id=\"42\" class=\"a b\">", "<div data-id=42 class=\"a b\">"),

			// Left alone.
			("<a class=\"a b\">", "<a class=\"a b\">"),
			("<a href=\"/about\">", "<a href=\"/about\">"),
			("<a href=\"about.html\">", "<a href=\"about.html\">"),
			("<option value=\"\">", "<option value=\"\">"),
			("<a title='say x=\"y\" ok'>", "<a title='say x=\"y\" ok'>"),
			("<input value=\"a\"/>", "<input value=\"a\"/>"),
			("<p title=\"caf\u{e9}\">", "<p title=\"caf\u{e9}\">"),
			("<p title=\"\u{FDD2}0\u{FDD3}\">", "<p title=\"\u{FDD2}0\u{FDD3}\">"),
			("<p \"odd\">", "<p \"odd\">"),
			("<p title=\"oops>", "<p title=\"oops>"),
		] {
			assert_eq!(unquote_values(raw), expected, "{raw:?}");
		}

		// Only tags are touched, not text.
		assert_eq!(
			minify("<p>Say class=\"nav\" </p>"),
			"<p>Say class=\"nav\"</p>",
		);
	}
}
