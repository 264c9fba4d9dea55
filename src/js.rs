/*!
# Compressed Output: Inline JS.

Like its CSS sibling, this is a set of conservative rewrite rules rather than
a parser. Literals (strings, templates, regular expressions) and the heads
of chained `$(…)` calls are masked behind span-local placeholders before any
whitespace is touched, and comments are dropped in that same pass.

Scripts whose `type` is not JavaScript (JSON, templates, etc.) are never
touched.
*/

use crate::{
	MinifyError,
	protect::{
		INNER,
		OUTER,
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
static RE_PARTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)^<script\b([^>]*)>(.*?)</script[\t\n\x0C\r ]*>$").unwrap());

/// # Type Attribute.
static RE_TYPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(
	r#"(?i)(?:^|[\t\n\x0C\r ])type[\t\n\x0C\r ]*=[\t\n\x0C\r ]*(?:"([^"]*)"|'([^']*)'|([^\t\n\x0C\r "'>]+))"#
).unwrap());

/// # Chained Call Head.
static RE_CHAIN_HEAD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"((?:\$|\bjQuery)\s*\([^()]*\))\s*\.").unwrap());

/// # Whitespace Before a Chained Call.
static RE_CHAIN_GAP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([)\x{FDD3}])\s+\.").unwrap());

/// # JavaScript Media Types.
const JS_TYPES: [&str; 8] = [
	"application/ecmascript",
	"application/javascript",
	"application/x-javascript",
	"module",
	"text/ecmascript",
	"text/javascript",
	"text/jscript",
	"text/x-javascript",
];

/// # Keywords Followed By an Operand.
///
/// A `/` after one of these starts a regular expression rather than a
/// division.
const OPERAND_KEYWORDS: [&str; 14] = [
	"await",
	"case",
	"delete",
	"do",
	"else",
	"in",
	"instanceof",
	"new",
	"of",
	"return",
	"throw",
	"typeof",
	"void",
	"yield",
];



/// # Minify `<script>` Element.
///
/// Returns `None` if the element should be left as-is, either because it
/// is empty or because its contents are not JavaScript.
///
/// ## Errors
///
/// Unterminated literals or comments are treated as fatal.
pub(crate) fn minify_script(src: &str) -> Result<Option<String>, MinifyError> {
	let Some(caps) = RE_PARTS.captures(src) else { return Ok(None); };

	let attrs = &caps[1];
	let body = &caps[2];
	if body.trim().is_empty() || ! is_javascript(attrs) { return Ok(None); }

	let body = minify_js(body)?;
	Ok(Some(format!("<script{attrs}>{body}</script>")))
}

/// # Is JavaScript?
///
/// Scripts without a `type` are JavaScript; otherwise the type has to be
/// one of the known JavaScript media types.
fn is_javascript(attrs: &str) -> bool {
	let Some(caps) = RE_TYPE.captures(attrs) else { return true; };
	let kind = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))
		.map_or("", |m| m.as_str());

	// Ignore parameters like "; charset=utf-8".
	let kind = kind.split(';').next().unwrap_or_default().trim();
	kind.is_empty() || JS_TYPES.iter().any(|t| kind.eq_ignore_ascii_case(t))
}

/// # Minify JS.
///
/// ## Errors
///
/// Unterminated literals or comments are treated as fatal.
fn minify_js(src: &str) -> Result<String, MinifyError> {
	let mut local = ProtectionMap::new(INNER);

	let code = mask_tokens(src, &mut local)?;
	let code = protect_chain_heads(&code, &mut local);
	let code = collapse(&code);
	let code = normalize_chains(&code);

	local.restore(code.trim())
}

/// # Mask Literals, Strip Comments.
///
/// Everything is scanned in a single left-to-right pass so a `//` inside a
/// string is never mistaken for a comment, a quote inside a comment is never
/// mistaken for a string, etc. Template literals are matched through any
/// `${…}` substitutions, nested templates included.
///
/// A `/` is only read as the start of a regular expression where an operand
/// is expected (see `regex_allowed`); elsewhere it is division.
///
/// ## Errors
///
/// Unterminated strings, templates, comments, and regular expressions are
/// all fatal.
fn mask_tokens(src: &str, local: &mut ProtectionMap) -> Result<String, MinifyError> {
	let bytes = src.as_bytes();
	let mut out = String::with_capacity(src.len());
	let mut last = 0;
	let mut idx = 0;

	while idx < bytes.len() {
		match bytes[idx] {
			// Strings and templates.
			b'"' | b'\'' | b'`' => {
				let end =
					if bytes[idx] == b'`' { template_end(bytes, idx) }
					else { string_end(bytes, idx) };
				let end = end.ok_or(MinifyError::MalformedScript)?;

				out.push_str(&src[last..idx]);
				out.push_str(&local.protect(SpanKind::Literal, src[idx..end].to_owned()));
				idx = end;
				last = end;
			},
			// Outside a literal, nothing escapes a slash. This must be a
			// regular expression in a spot we didn't expect one.
			b'/' if 0 < idx && bytes[idx - 1] == b'\\' => {
				return Err(MinifyError::MalformedScript);
			},
			// Line comments just go away; the newline stays put.
			b'/' if bytes.get(idx + 1) == Some(&b'/') => {
				out.push_str(&src[last..idx]);
				idx += bytes[idx..].iter()
					.position(|&b| b == b'\n')
					.unwrap_or(bytes.len() - idx);
				last = idx;
			},
			// Block comments still separate tokens.
			b'/' if bytes.get(idx + 1) == Some(&b'*') => {
				let len = src[idx + 2..].find("*/").ok_or(MinifyError::MalformedScript)?;
				let end = idx + len + 4;

				out.push_str(&src[last..idx]);
				out.push(if src[idx..end].contains('\n') { '\n' } else { ' ' });
				idx = end;
				last = end;
			},
			// Regular expressions or division.
			b'/' => {
				out.push_str(&src[last..idx]);
				last = idx;

				if regex_allowed(&out) {
					let end = regex_end(bytes, idx).ok_or(MinifyError::MalformedScript)?;
					out.push_str(&local.protect(SpanKind::Literal, src[idx..end].to_owned()));
					idx = end;
					last = end;
				}
				else { idx += 1; }
			},
			_ => { idx += 1; },
		}
	}

	out.push_str(&src[last..]);
	Ok(out)
}

/// # Regular Expression Allowed?
///
/// Returns `true` if the code so far leaves off where an operand is
/// expected: the very start, after most punctuation and operators
/// (including the `>` of `=>`), or after keywords like `return` or `case`.
/// Postfix `++`/`--`, closing parentheses, identifiers, and masked literals
/// are operands themselves, so a `/` following them is division.
fn regex_allowed(code: &str) -> bool {
	let code = code.trim_end();
	let Some(prev) = code.chars().next_back() else { return true; };

	if is_ident(prev) {
		let rest = code.trim_end_matches(is_ident);
		let word = &code[rest.len()..];
		return
			! rest.ends_with('.') &&
			OPERAND_KEYWORDS.contains(&word);
	}

	if code.ends_with("++") || code.ends_with("--") { return false; }

	matches!(
		prev,
		'(' | ',' | '=' | ':' | '[' | '!' | '&' | '|' | '?' | '{' | '}' | ';' |
		'+' | '-' | '*' | '%' | '<' | '>' | '~' | '^'
	)
}

/// # Is Identifier Character?
fn is_ident(c: char) -> bool {
	c.is_alphanumeric() || matches!(c, '_' | '$')
}

/// # String End.
///
/// Return the index just past the quote closing the string opened at
/// `start`, or `None` if it runs into an (unescaped) line break first.
fn string_end(bytes: &[u8], start: usize) -> Option<usize> {
	let quote = bytes[start];
	let mut idx = start + 1;
	while idx < bytes.len() {
		match bytes[idx] {
			// Line continuations are allowed.
			b'\\' =>
				if bytes.get(idx + 1) == Some(&b'\r') && bytes.get(idx + 2) == Some(&b'\n') {
					idx += 3;
				}
				else { idx += 2; },
			b'\n' | b'\r' => return None,
			b if b == quote => return Some(idx + 1),
			_ => { idx += 1; },
		}
	}

	None
}

/// # Template End.
///
/// Return the index just past the backtick closing the template opened at
/// `start`. Substitutions are skipped over whole.
fn template_end(bytes: &[u8], start: usize) -> Option<usize> {
	let mut idx = start + 1;
	while idx < bytes.len() {
		match bytes[idx] {
			b'\\' => { idx += 2; },
			b'`' => return Some(idx + 1),
			b'$' if bytes.get(idx + 1) == Some(&b'{') => {
				idx = substitution_end(bytes, idx + 2)?;
			},
			_ => { idx += 1; },
		}
	}

	None
}

/// # Substitution End.
///
/// Return the index just past the `}` closing a `${…}` substitution whose
/// body begins at `start`. Braces are counted, and strings and templates
/// inside the body are skipped over whole.
fn substitution_end(bytes: &[u8], start: usize) -> Option<usize> {
	let mut depth = 0_usize;
	let mut idx = start;
	while idx < bytes.len() {
		match bytes[idx] {
			b'"' | b'\'' => { idx = string_end(bytes, idx)?; },
			b'`' => { idx = template_end(bytes, idx)?; },
			b'{' => {
				depth += 1;
				idx += 1;
			},
			b'}' => {
				if depth == 0 { return Some(idx + 1); }
				depth -= 1;
				idx += 1;
			},
			_ => { idx += 1; },
		}
	}

	None
}

/// # Regular Expression End.
///
/// Return the index just past the flags of the regular expression opened at
/// `start`. A `/` inside a character class does not close it, and neither
/// does an escaped one. A line break means it wasn't a regular expression
/// after all.
fn regex_end(bytes: &[u8], start: usize) -> Option<usize> {
	let mut class = false;
	let mut idx = start + 1;
	while idx < bytes.len() {
		match bytes[idx] {
			b'\\' => {
				if matches!(bytes.get(idx + 1), Some(b'\n' | b'\r')) { return None; }
				idx += 2;
			},
			b'\n' | b'\r' => return None,
			b'[' => {
				class = true;
				idx += 1;
			},
			b']' => {
				class = false;
				idx += 1;
			},
			b'/' if ! class => {
				idx += 1;
				while bytes.get(idx).is_some_and(u8::is_ascii_alphabetic) { idx += 1; }
				return Some(idx);
			},
			_ => { idx += 1; },
		}
	}

	None
}

/// # Protect Chained Call Heads.
///
/// The selector call at the start of a chain like `$('.a')\n\t.show()` is
/// stored verbatim, and glued directly to the chain.
fn protect_chain_heads(src: &str, local: &mut ProtectionMap) -> String {
	RE_CHAIN_HEAD.replace_all(src, |caps: &Captures<'_>| {
		let key = local.protect(SpanKind::ChainHead, caps[1].to_owned());
		format!("{key}.")
	}).into_owned()
}

/// # Collapse Whitespace.
///
/// Whitespace next to an operator or punctuation mark is removed; any other
/// run becomes a single space.
///
/// A few pairs keep their space regardless (see `needs_space`). Runs
/// spanning a line break are kept as a line break when the code on either
/// side could end and begin a statement, respectively, as automatic
/// semicolon insertion might be relying on it.
fn collapse(src: &str) -> String {
	let mut out = String::with_capacity(src.len());
	let mut pending: Option<bool> = None;

	for c in src.chars() {
		if c.is_whitespace() {
			let newline = matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}');
			pending = Some(pending.unwrap_or(false) || newline);
			continue;
		}

		if
			let Some(newline) = pending.take() &&
			let Some(prev) = out.chars().next_back() &&
			let Some(sep) = separator(prev, c, newline)
		{
			out.push(sep);
		}

		out.push(c);
	}

	out
}

/// # Separator.
///
/// Return what, if anything, should stand in for the whitespace between
/// `prev` and `next`.
fn separator(prev: char, next: char, newline: bool) -> Option<char> {
	if newline && ends_statement(prev) && begins_statement(next) { Some('\n') }
	else if is_punct(prev) || is_punct(next) {
		if needs_space(prev, next) { Some(' ') }
		else { None }
	}
	else { Some(' ') }
}

/// # Is Operator or Punctuation?
const fn is_punct(c: char) -> bool {
	matches!(
		c,
		'=' | '+' | '-' | '*' | '/' | '%' | '!' | '&' | '|' | '^' |
		'(' | ')' | '{' | '}' | '[' | ']' | ':' | ';' | ',' | '.' |
		'<' | '>' | '?' | '~'
	)
}

/// # Needs Space?
///
/// These pairs would change meaning if glued together: `a + +b`, `a - -b`,
/// `a-- > b` (`-->` opens an HTML comment), `a < !b` (`<!` too), and
/// `1 .toString()`.
const fn needs_space(prev: char, next: char) -> bool {
	matches!(
		(prev, next),
		('+', '+') | ('-', '-') | ('-', '>') | ('<', '!')
	) ||
	(prev.is_ascii_digit() && next == '.')
}

/// # Could End a Statement?
fn ends_statement(c: char) -> bool {
	c.is_alphanumeric() ||
	matches!(c, '_' | '$' | ')' | ']' | '}' | '+' | '-') ||
	c == INNER.close ||
	c == OUTER.close
}

/// # Could Begin a Statement?
fn begins_statement(c: char) -> bool {
	c.is_alphanumeric() ||
	matches!(c, '_' | '$' | '(' | '[' | '{' | '+' | '-' | '!' | '~') ||
	c == INNER.open ||
	c == OUTER.open
}

/// # Normalize Chains.
///
/// Drop any whitespace between a closing parenthesis (or masked chain head)
/// and a following `.`. This is a no-op on its own output.
fn normalize_chains(src: &str) -> String {
	RE_CHAIN_GAP.replace_all(src, "$1.").into_owned()
}
