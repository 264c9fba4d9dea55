/*!
# Compressed Output

Compressed Output is a conservative minifier for server-rendered HTML
responses, including the still-unrendered template markup some frameworks
like to ship around. It is regex-driven rather than parser-driven, so it
will happily chew through fragments, half-baked templates, and other things
a DOM would choke on.

The work happens in three passes:
1. Anything whitespace-sensitive or not-actually-HTML (template directives, interpolations, `<style>`, `<script>`, `<pre>`, `<textarea>`, conditional comments) is swapped out for a placeholder;
2. The inline stylesheets and scripts are minified in isolation, with their own string literals and comments protected the same way;
3. Generic whitespace and comment rules are applied to what's left, then everything is swapped back in.

Minification is all or nothing. If anything goes wrong, be it an unterminated
string, a placeholder that can't be resolved, or even a panic, the original
document is returned as-was.



## Use

Most callers will want [`minify`], which takes the body, its declared
`Content-Type`, and an on/off switch:

```
use compressed_output::minify;

let out = minify("<div>  \n  hello  </div>", "text/html; charset=utf-8", true);
assert_eq!(out, "<div>hello</div>");

// Not HTML, not touched.
let out = minify("{ \"a\": 1 }", "application/json", true);
assert_eq!(out, "{ \"a\": 1 }");
```

If you need to know _what_ happened, use [`process`] instead, which returns
an [`Outcome`]. For `http` responses, [`compress_response`] takes care of
the headers too.



## Caution

* Only ASCII whitespace is collapsed; the no-break space is left alone.
* Whitespace between tags is removed outright. Documents relying on the incidental space between inline elements (e.g. `<b>a</b> <i>b</i>`) will render slightly differently.
* Inline CSS and Javascript are minified with simple token rules, not full parsers. Unusual syntax could conceivably trip them up, though any unterminated string or comment aborts the whole run.
* Scripts with non-Javascript `type`s (JSON, templates, etc.) are left exactly as they are.
* Attribute values consisting only of letters, digits, `_`, and `-` lose their quotes. Browsers don't care, but string-matching post-processors might.
*/

#![warn(clippy::filetype_is_file)]
#![warn(clippy::integer_division)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(clippy::needless_borrow)]
#![warn(clippy::nursery)]
#![warn(clippy::pedantic)]
#![warn(clippy::perf)]
#![warn(clippy::suboptimal_flops)]
#![warn(clippy::unneeded_field_pattern)]
#![warn(macro_use_extern_crate)]
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(non_ascii_idents)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused_extern_crates)]
#![warn(unused_import_braces)]

#![warn(unused_crate_dependencies)]

#![allow(clippy::module_name_repetitions)]



mod config;
mod css;
mod error;
mod extract;
mod gate;
mod js;
mod markup;
mod protect;
mod response;

// Binary-only dependencies.
use argyle as _;
use dactyl as _;
use dowser as _;
use fyi_msg as _;
use rayon as _;
use write_atomic as _;
#[cfg(test)] use criterion as _;

pub use config::{
	ENV_ENABLE,
	Settings,
};
pub use error::MinifyError;
pub use gate::{
	is_markup,
	MARKUP_MEDIA_TYPE,
};
pub use response::{
	compress_response,
	MARKER_HEADER,
};

use protect::{
	Sentinel,
	SpanKind,
};
use std::{
	borrow::Cow,
	panic,
};



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Outcome.
///
/// This is the result of a [`process`] call. Every variant can produce a
/// servable body; only `Minified` owns a new one.
pub enum Outcome<'a> {
	/// # Skipped.
	///
	/// The feature was disabled or the content type was not HTML.
	Skipped(&'a str),

	/// # Minified.
	Minified(String),

	/// # Failed.
	///
	/// Minification was attempted but aborted. The original should be used
	/// instead.
	Failed {
		/// # Original Body.
		original: &'a str,

		/// # Reason.
		error: MinifyError,
	},
}

impl<'a> Outcome<'a> {
	#[must_use]
	/// # Body.
	///
	/// Return the body that should be served.
	pub fn body(&self) -> &str {
		match self {
			Self::Skipped(s) | Self::Failed { original: s, .. } => s,
			Self::Minified(s) => s.as_str(),
		}
	}

	#[must_use]
	/// # Into Body.
	pub fn into_body(self) -> Cow<'a, str> {
		match self {
			Self::Skipped(s) | Self::Failed { original: s, .. } => Cow::Borrowed(s),
			Self::Minified(s) => Cow::Owned(s),
		}
	}

	#[must_use]
	/// # Error.
	pub const fn error(&self) -> Option<MinifyError> {
		if let Self::Failed { error, .. } = self { Some(*error) }
		else { None }
	}

	#[must_use]
	/// # Minified?
	pub const fn is_minified(&self) -> bool { matches!(self, Self::Minified(_)) }
}



#[must_use]
/// # Minify.
///
/// Minify the body if the feature is enabled and the content type is
/// `text/html`; otherwise return it unchanged.
///
/// Failures are logged (as warnings) and the original body is returned in
/// their place.
pub fn minify<'a>(body: &'a str, content_type: &str, enabled: bool) -> Cow<'a, str> {
	let out = process(body, content_type, enabled);
	if let Some(error) = out.error() {
		log::warn!("Unable to minify document: {error}");
	}
	out.into_body()
}

#[must_use]
/// # Process.
///
/// This is the same as [`minify`], but returns an [`Outcome`] describing
/// what happened instead of logging anything.
///
/// The pipeline runs inside [`std::panic::catch_unwind`], so even a bug
/// will surface as a [`MinifyError::Panic`] failure rather than taking the
/// caller down with it.
///
/// ## Examples
///
/// ```
/// use compressed_output::{MinifyError, Outcome, process};
///
/// let out = process("<p>\n  Hi  </p>", "text/html", true);
/// assert_eq!(out, Outcome::Minified("<p>Hi</p>".to_owned()));
///
/// let out = process("<p>Hi</p>", "text/html", false);
/// assert_eq!(out, Outcome::Skipped("<p>Hi</p>"));
///
/// let raw = "<script>var a = 'oops;</script>";
/// let out = process(raw, "text/html", true);
/// assert_eq!(out.error(), Some(MinifyError::MalformedScript));
/// assert_eq!(out.body(), raw);
/// ```
pub fn process<'a>(body: &'a str, content_type: &str, enabled: bool) -> Outcome<'a> {
	if ! enabled || ! is_markup(content_type) {
		log::debug!("Skipping document (enabled: {enabled}, type: {content_type:?}).");
		return Outcome::Skipped(body);
	}

	match panic::catch_unwind(|| minify_markup(body)) {
		Ok(Ok(out)) => Outcome::Minified(out),
		Ok(Err(error)) => Outcome::Failed { original: body, error },
		Err(_) => Outcome::Failed { original: body, error: MinifyError::Panic },
	}
}

/// # Minify Markup.
///
/// Run the full pipeline with no gating and no fallback.
///
/// ## Errors
///
/// An error is returned if the document contains reserved placeholder
/// characters, an inline stylesheet or script has an unterminated string or
/// comment, or the protected content can't be put back together.
pub fn minify_markup(src: &str) -> Result<String, MinifyError> {
	let (doc, mut map) = extract::extract(src)?;

	// Styles and scripts get minified on their own.
	for (kind, text) in map.entries_mut() {
		match kind {
			SpanKind::Style => { *text = css::minify_style(text)?; },
			SpanKind::Script => if let Some(new) = js::minify_script(text)? {
				*text = new;
			},
			_ => {},
		}
	}

	// The rest gets the generic treatment.
	let doc = markup::minify(&doc);
	let out = map.restore(&doc)?;

	if Sentinel::is_reserved(&out) { Err(MinifyError::Restore) }
	else { Ok(out) }
}



#[cfg(test)]
mod tests {
	use super::*;
	use regex::Regex;

	/// # Template Fixture.
	const TEMPLATE: &str = include_str!("../skel/test-assets/template.html");

	/// # Strip All Whitespace.
	fn squash(src: &str) -> String {
		src.chars().filter(|c| ! c.is_ascii_whitespace()).collect()
	}

	#[test]
	fn t_scenarios() {
		for (raw, expected) in [
			("<div>  \n  hello  </div>", "<div>hello</div>"),
			("<style> .a   .b { color : red ; } </style>", "<style>.a .b{color: red}</style>"),
			("<script>var x = 1;   var y = 2;</script>", "<script>var x=1;var y=2;</script>"),
			("<i class=\"mi\">\u{E000}</i>\n<b> x </b>", "<i class=mi>\u{E000}</i><b>x</b>"),
			(
				"<script type=\"application/json\">{\"a\": 1}</script>",
				"<script type=\"application/json\">{\"a\": 1}</script>",
			),
			("", ""),
		] {
			assert_eq!(minify(raw, "text/html", true), expected, "{raw:?}");
		}

		// Not HTML.
		let raw = "<div>  \n  hello  </div>";
		assert_eq!(minify(raw, "application/json", true), raw);
		assert!(matches!(minify(raw, "application/json", true), Cow::Borrowed(_)));

		// Not enabled.
		assert_eq!(minify(raw, "text/html", false), raw);
	}

	#[test]
	fn t_document() {
		let raw = r#"<!DOCTYPE html>
<html>
<head>
  <!--[if lt IE 9]><script src="html5shiv.js"></script><![endif]-->
  <style>
    .a   .b { color : {{ $color }} ; }
  </style>
</head>
<body>
  @if($user)
    <p>  Hello,   {{ $user->name }}!  </p>
  @endif
  <!-- remove me -->
  <script>
    var x = {!! json_encode($x) !!};
  </script>
</body>
</html>
"#;

		assert_eq!(
			minify_markup(raw).as_deref(),
			Ok(concat!(
				"<!DOCTYPE html><html><head>",
				"<!--[if lt IE 9]><script src=\"html5shiv.js\"></script><![endif]-->",
				"<style>.a .b{color: {{ $color }}}</style>",
				"</head><body>",
				"@if($user)<p>Hello, {{ $user->name }}!</p>@endif",
				"<script>var x={!! json_encode($x) !!};</script>",
				"</body></html>",
			)),
		);
	}

	#[test]
	fn t_whitespace_only() {
		// Without comments, styles, scripts, or directives, only whitespace
		// should change.
		for raw in [
			"<div>  \n  hello  </div>",
			"<ul>\n\t<li>One</li>\n\t<li>Two  Three</li>\n</ul>",
			"<p class=\"a  b\">Some\ttext\r\nhere.</p>\n\n<p>More.</p>",
			"<table>\n<tr>\n<td> 1 </td>\n<td> 2 </td>\n</tr>\n</table>",
			"plain text, no tags",
		] {
			let out = minify_markup(raw).expect("Minification failed.");
			assert_eq!(squash(&out), squash(raw), "{raw:?}");
			assert!(out.len() <= raw.len());
		}
	}

	#[test]
	fn t_template() {
		let out = minify_markup(TEMPLATE).expect("Minification failed.");
		assert!(out.len() < TEMPLATE.len());
		assert!(! Sentinel::is_reserved(&out));

		// It should be stable.
		assert_eq!(minify_markup(&out).as_deref(), Ok(out.as_str()));

		// Directives and interpolations must come through exactly as written.
		let re = Regex::new(r"\{!!.*?!!\}|\{\{.*?\}\}|@(?:if|elseif|foreach|endforeach|endif|csrf|include)\b(?:\([^)]*\))?")
			.unwrap();
		for m in re.find_iter(TEMPLATE) {
			assert!(out.contains(m.as_str()), "Missing {:?}", m.as_str());
		}

		// As should the preformatted bits and conditional comments, in order.
		let re = Regex::new(r"(?s)<pre>.*?</pre>|<textarea[^>]*>.*?</textarea>|<!--\[if.*?<!\[endif\]-->")
			.unwrap();
		let mut last = 0;
		for m in re.find_iter(TEMPLATE) {
			let pos = out[last..].find(m.as_str()).expect("Missing verbatim block.");
			last += pos + m.len();
		}

		// But plain comments should be gone.
		assert!(! out.contains("<!-- Navigation -->"));
	}

	#[test]
	fn t_conditional_verbatim() {
		let cond = "<!--[if IE]>\n<style>\n  .a { color : red ; }\n</style>\n<![endif]-->";
		let raw = format!("<head>\n  {cond}\n  <style>\n  .a {{ color : red ; }}\n</style>\n</head>");
		let out = minify_markup(&raw).expect("Minification failed.");
		assert_eq!(out, format!("<head>{cond}<style>.a{{color: red}}</style></head>"));
	}

	#[test]
	fn t_fail_open() {
		for (raw, error) in [
			("<p> a </p><script>var s = 'oops;</script>", MinifyError::MalformedScript),
			("<p> a </p><style>a { content: \"oops; }</style>", MinifyError::MalformedStyle),
			("<p> a \u{FDD0}0\u{FDD1} </p>", MinifyError::Sentinel),
			("<p> \u{FDD3} </p>", MinifyError::Sentinel),
		] {
			let out = process(raw, "text/html", true);
			assert_eq!(out.error(), Some(error), "{raw:?}");
			assert_eq!(out.body(), raw);
			assert!(! out.is_minified());

			let out = minify(raw, "text/html", true);
			assert!(matches!(out, Cow::Borrowed(_)));
			assert_eq!(out, raw);
		}
	}

	#[test]
	fn t_outcome() {
		let out = process("<b> x </b>", "Text/HTML; charset=utf-8", true);
		assert!(out.is_minified());
		assert_eq!(out.body(), "<b>x</b>");
		assert_eq!(out.error(), None);
		assert_eq!(out.into_body(), "<b>x</b>");

		let out = process("<b> x </b>", "text/plain", true);
		assert_eq!(out, Outcome::Skipped("<b> x </b>"));
		assert_eq!(out.error(), None);
	}
}
