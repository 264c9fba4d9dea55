/*!
# Compressed Output: CLI Errors.
*/

use compressed_output::MinifyError;
use fyi_msg::ProglessError;
use std::{
	error::Error,
	fmt,
};



/// # Help Text.
const HELP: &str = concat!(r"
     __,---.__
  ,-'         `-.__
&/           `._\ _\
/               ''._    ", "\x1b[38;5;199mCompressed Output\x1b[0;38;5;69m v", env!("CARGO_PKG_VERSION"), "\x1b[0m", r#"
|   ,             (∞)   Template-safe, in-place
|__,'`-..--|__|--''     HTML minification.

USAGE:
    compressed-output [FLAGS] [OPTIONS] <PATH(S)>...

FLAGS:
    -h, --help        Print help information and exit.
    -p, --progress    Show progress bar while minifying.
    -V, --version     Print program version and exit.

OPTIONS:
    -l, --list <FILE> Read (absolute) file and/or directory paths from this
                      text file — or STDIN if "-" — one entry per line, instead
                      of or in addition to the trailing <PATH(S)>.

ARGS:
    <PATH(S)>...      One or more files or directories to compress.

Only files ending in .htm or .html are processed. Documents that cannot be
minified safely are left exactly as they were.
"#);



#[expect(clippy::missing_docs_in_private_items, reason = "Self-explanatory.")]
#[derive(Debug, Copy, Clone)]
/// # CLI Error.
pub(super) enum CliError {
	EmptyFile,
	ListFile,
	Minify(MinifyError),
	NoDocuments,
	Progress(ProglessError),
	Read,
	Write,
	PrintHelp,    // Not an error.
	PrintVersion, // Not an error.
}

impl AsRef<str> for CliError {
	#[inline]
	fn as_ref(&self) -> &str { self.as_str() }
}

impl fmt::Display for CliError {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Error for CliError {}

impl From<MinifyError> for CliError {
	#[inline]
	fn from(src: MinifyError) -> Self { Self::Minify(src) }
}

impl From<ProglessError> for CliError {
	#[inline]
	fn from(src: ProglessError) -> Self { Self::Progress(src) }
}

impl CliError {
	/// # As Str.
	pub(super) const fn as_str(self) -> &'static str {
		match self {
			Self::EmptyFile => "The file is empty.",
			Self::ListFile => "Unable to read the path list.",
			Self::Minify(e) => e.as_str(),
			Self::NoDocuments => "No documents were found.",
			Self::Progress(e) => e.as_str(),
			Self::Read => "Unable to read the file.",
			Self::Write => "Unable to save the file.",
			Self::PrintHelp => HELP,
			Self::PrintVersion => concat!("Compressed Output v", env!("CARGO_PKG_VERSION")),
		}
	}
}
