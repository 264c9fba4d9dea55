/*!
# Compressed Output: Inline CSS.

This is _not_ a CSS parser. It is a handful of conservative, named rewrite
rules, applied to the body of a single `<style>` element. Anything that must
survive verbatim (strings, descendant selectors) is masked behind a
span-local placeholder first.
*/

use crate::{
	MinifyError,
	protect::{
		INNER,
		ProtectionMap,
		SpanKind,
	},
};
use regex::{
	Captures,
	Regex,
};
use std::sync::LazyLock;



/// # Element Parts.
static RE_PARTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)^<style\b([^>]*)>(.*?)</style[\t\n\x0C\r ]*>$").unwrap());

/// # Default Type Attribute.
static RE_DEFAULT_TYPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(
	r#"(?i)(?:^|[\t\n\x0C\r ])type[\t\n\x0C\r ]*=[\t\n\x0C\r ]*(?:"text/css"|'text/css'|text/css\b)"#
).unwrap());

/// # Comments and Strings.
static RE_TOKENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(
	r#"(?s)/\*.*?\*/|"(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'"#
).unwrap());

/// # Unit Followed By Keyword.
static RE_UNIT_KEYWORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(
	r"(?i)([\t\n\x0C\r :(,]-?(?:\d*\.)?\d+(?:px|r?em|%|vh|vw|vmin|vmax|pt|pc|cm|mm|in|ex|ch))(auto|center|left|right|top|bottom|middle|inherit)\b"
).unwrap());

/// # Descendant Selector.
static RE_SELECTOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(
	r"[.#][A-Za-z_-][\w-]*(?:[\t\n\x0C\r ]+[.#]?[A-Za-z_-][\w-]*)+"
).unwrap());

/// # Whitespace.
static RE_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\t\n\x0C\r ]+").unwrap());

/// # Whitespace Around Symbols.
static RE_SYMBOL_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" ?([{};,]) ?").unwrap());

/// # Property Name.
static RE_PROPERTY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([{;])(-{0,2}[A-Za-z][\w-]*) ?: ?").unwrap());

/// # Redundant Semicolons.
static RE_TRAILING_SEMI: LazyLock<Regex> = LazyLock::new(|| Regex::new(r";+\}").unwrap());



/// # Minify `<style>` Element.
///
/// This minifies the body of a complete `<style>…</style>` element, and
/// drops its `type` attribute if it merely restates the default.
///
/// ## Errors
///
/// Unterminated strings or comments are treated as fatal.
pub(crate) fn minify_style(src: &str) -> Result<String, MinifyError> {
	let Some(caps) = RE_PARTS.captures(src) else { return Ok(src.to_owned()); };

	let attrs = RE_DEFAULT_TYPE.replace_all(&caps[1], "");
	let attrs = attrs.trim();
	let body = minify_css(&caps[2])?;

	if attrs.is_empty() { Ok(format!("<style>{body}</style>")) }
	else { Ok(format!("<style {attrs}>{body}</style>")) }
}

/// # Minify CSS.
///
/// ## Errors
///
/// Unterminated strings or comments are treated as fatal.
fn minify_css(src: &str) -> Result<String, MinifyError> {
	let mut local = ProtectionMap::new(INNER);

	let css = mask_tokens(src, &mut local)?;
	let css = space_units(&css);
	let css = protect_selectors(&css, &mut local);
	let css = collapse(&css);
	let css = declaration_colons(&css);
	let css = RE_TRAILING_SEMI.replace_all(&css, "}");

	local.restore(css.trim())
}

/// # Mask Strings, Strip Comments.
///
/// Strings are swapped for placeholders and comments are dropped, in a
/// single pass so that neither can be confused for the other.
///
/// ## Errors
///
/// If a quote or comment opener survives, something was left unterminated.
fn mask_tokens(src: &str, local: &mut ProtectionMap) -> Result<String, MinifyError> {
	let out = RE_TOKENS.replace_all(src, |caps: &Captures<'_>| {
		if caps[0].starts_with("/*") { String::new() }
		else { local.protect(SpanKind::Literal, caps[0].to_owned()) }
	});

	if out.contains(['"', '\'']) || out.contains("/*") { Err(MinifyError::MalformedStyle) }
	else { Ok(out.into_owned()) }
}

/// # Space Units.
///
/// A length glued to a keyword (`10pxauto`) gets a space between the two so
/// later passes can't make matters worse.
fn space_units(src: &str) -> String {
	RE_UNIT_KEYWORD.replace_all(src, "$1 $2").into_owned()
}

/// # Protect Descendant Selectors.
///
/// The whitespace in `.a .b` is significant. The selector is stored with its
/// whitespace collapsed to a single space.
fn protect_selectors(src: &str, local: &mut ProtectionMap) -> String {
	RE_SELECTOR.replace_all(src, |caps: &Captures<'_>| {
		let sel = RE_WS.replace_all(&caps[0], " ").into_owned();
		local.protect(SpanKind::Selector, sel)
	}).into_owned()
}

/// # Collapse Whitespace.
///
/// Runs become a single space, and spaces around braces, semicolons, and
/// commas are dropped entirely.
fn collapse(src: &str) -> String {
	let out = RE_WS.replace_all(src, " ");
	RE_SYMBOL_WS.replace_all(&out, "$1").into_owned()
}

/// # Declaration Colons.
///
/// The colon separating a property from its value is normalized to `: `.
/// Colons in selectors or at-rule preludes (`a:hover{`) are left alone; a
/// colon belongs to a declaration only if a `;` or `}` comes before the next
/// `{`.
fn declaration_colons(src: &str) -> String {
	RE_PROPERTY.replace_all(src, |caps: &Captures<'_>| {
		let end = caps.get(0).map_or(src.len(), |m| m.end());
		let declaration = src[end..].find(['{', '}', ';'])
			.is_none_or(|idx| src.as_bytes()[end + idx] != b'{');

		if declaration { format!("{}{}: ", &caps[1], &caps[2]) }
		else { caps[0].to_owned() }
	}).into_owned()
}
