/*!
# Compressed Output: Settings.
*/

/// # Environment Variable.
///
/// This toggles the feature when settings are loaded via
/// [`Settings::from_env`].
pub const ENV_ENABLE: &str = "COMPRESSED_OUTPUT_ENABLE";



#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
/// # Settings.
///
/// There is only the one: whether or not responses should be minified at
/// all. It is off by default.
pub struct Settings {
	/// # Enabled?
	enable: bool,
}

impl From<bool> for Settings {
	#[inline]
	fn from(enable: bool) -> Self { Self { enable } }
}

impl Settings {
	#[must_use]
	/// # New.
	pub const fn new(enable: bool) -> Self { Self { enable } }

	#[must_use]
	/// # From Environment.
	///
	/// Read the setting from the `COMPRESSED_OUTPUT_ENABLE` environment
	/// variable. Values like `1`, `true`, `yes`, and `on` enable the feature;
	/// anything else, including absence, leaves it disabled.
	pub fn from_env() -> Self {
		Self::from_env_value(std::env::var(ENV_ENABLE).ok().as_deref())
	}

	#[must_use]
	/// # Enabled?
	pub const fn enable(self) -> bool { self.enable }

	/// # From (Raw) Environment Value.
	fn from_env_value(raw: Option<&str>) -> Self {
		let enable = raw.is_some_and(|v| {
			let v = v.trim();
			["1", "true", "yes", "on"].iter().any(|t| v.eq_ignore_ascii_case(t))
		});

		Self { enable }
	}
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn t_from_env_value() {
		assert!(! Settings::default().enable());

		for (raw, expected) in [
			(None, false),
			(Some(""), false),
			(Some("0"), false),
			(Some("false"), false),
			(Some("nope"), false),
			(Some("1"), true),
			(Some(" TRUE "), true),
			(Some("Yes"), true),
			(Some("on"), true),
		] {
			assert_eq!(Settings::from_env_value(raw).enable(), expected, "{raw:?}");
		}
	}
}
