/*!
# Compressed Output: Content-Type Gate.
*/

/// # Markup Media Type.
pub const MARKUP_MEDIA_TYPE: &str = "text/html";



#[must_use]
/// # Is Markup?
///
/// Returns `true` if the primary token of a `Content-Type` value (the bit
/// before any `;` parameters) is `text/html`, case-insensitively.
///
/// ## Examples
///
/// ```
/// use compressed_output::is_markup;
///
/// assert!(is_markup("text/html"));
/// assert!(is_markup("Text/HTML; charset=UTF-8"));
/// assert!(! is_markup("application/json"));
/// ```
pub fn is_markup(content_type: &str) -> bool {
	content_type.split(';')
		.next()
		.is_some_and(|t| t.trim().eq_ignore_ascii_case(MARKUP_MEDIA_TYPE))
}
