/*!
# Compressed Output: Errors
*/

use std::{
	error::Error,
	fmt,
};



#[expect(clippy::missing_docs_in_private_items, reason = "Self-explanatory.")]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
/// # Minification Error.
///
/// Any of these aborts the whole attempt; callers are expected to serve the
/// original, untouched document instead.
pub enum MinifyError {
	MalformedScript,
	MalformedStyle,
	Panic,
	Restore,
	Sentinel,
}

impl AsRef<str> for MinifyError {
	#[inline]
	fn as_ref(&self) -> &str { self.as_str() }
}

impl fmt::Display for MinifyError {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Error for MinifyError {}

impl MinifyError {
	#[must_use]
	/// # As Str.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::MalformedScript => "Unterminated literal or comment in an inline script.",
			Self::MalformedStyle => "Unterminated string or comment in an inline stylesheet.",
			Self::Panic => "Minification failed unexpectedly.",
			Self::Restore => "Unable to restore the protected content.",
			Self::Sentinel => "The document contains reserved placeholder characters.",
		}
	}
}
