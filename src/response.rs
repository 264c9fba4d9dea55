/*!
# Compressed Output: HTTP Responses.
*/

use crate::{
	Outcome,
	Settings,
	process,
};
use http::{
	header::{
		CONTENT_ENCODING,
		CONTENT_LENGTH,
		CONTENT_TYPE,
	},
	HeaderName,
	HeaderValue,
	Response,
};



/// # Marker Header.
///
/// This is added to responses that were actually minified.
pub const MARKER_HEADER: HeaderName = HeaderName::from_static("x-compressed-output");



#[must_use]
/// # Compress Response.
///
/// Minify the body of an HTML response, provided the feature is enabled.
/// When that works out, `Content-Length` is updated to match and the
/// [`MARKER_HEADER`] is set.
///
/// Responses that are disabled, not HTML, already content-encoded, or
/// that fail to minify are returned exactly as they came in. Failures are
/// logged as warnings.
///
/// ## Examples
///
/// ```
/// use compressed_output::{compress_response, Settings, MARKER_HEADER};
/// use http::{header::CONTENT_TYPE, Response};
///
/// let res = Response::builder()
///     .header(CONTENT_TYPE, "text/html; charset=utf-8")
///     .body("<p>\n  Hello  </p>".to_owned())
///     .unwrap();
///
/// let res = compress_response(res, Settings::new(true));
/// assert_eq!(res.body(), "<p>Hello</p>");
/// assert!(res.headers().contains_key(MARKER_HEADER));
/// ```
pub fn compress_response(response: Response<String>, settings: Settings)
-> Response<String> {
	if ! settings.enable() || response.headers().contains_key(CONTENT_ENCODING) {
		return response;
	}

	let content_type = response.headers()
		.get(CONTENT_TYPE)
		.and_then(|v| v.to_str().ok())
		.unwrap_or_default();

	let body = match process(response.body(), content_type, true) {
		Outcome::Minified(body) => Some(body),
		Outcome::Skipped(_) => None,
		Outcome::Failed { error, .. } => {
			log::warn!("Unable to minify response: {error}");
			None
		},
	};
	let Some(body) = body else { return response; };

	let (mut parts, _) = response.into_parts();
	parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
	parts.headers.insert(MARKER_HEADER, HeaderValue::from_static("1"));
	Response::from_parts(parts, body)
}
