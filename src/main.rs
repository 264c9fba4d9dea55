/*!
# Compressed Output: CLI

This binary runs the same pipeline as the library against `.htm`/`.html`
files on disk, in place. It is mostly useful for cleaning up pre-rendered
(or cached) template output, but works fine on static sites too.

Templates are safe to feed it: directives (`@if(…)`, `@foreach(…)`, etc.),
interpolations (`{{ … }}`, `{!! … !!}`), preformatted elements, and
conditional comments all pass through untouched.

Files are only re-saved if the minified version is actually smaller. If a
document cannot be minified safely, it is left as-was.



## Use

```bash
# Crunch one file.
compressed-output /path/to/one.html

# Recursively crunch every .htm(l) file in a directory.
compressed-output /path/to

# Do the same thing but with a progress bar.
compressed-output -p /path/to

# For a full list of options, run help:
compressed-output -h
```
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



mod cli;

// Library-only dependencies.
use http as _;
use log as _;
use regex as _;
#[cfg(test)] use criterion as _;

use argyle::{
	Argue,
	Argument,
};
use cli::CliError;
use dactyl::NiceU64;
use dowser::Dowser;
use fyi_msg::{
	Msg,
	MsgKind,
	Progless,
};
use rayon::iter::{
	IntoParallelRefIterator,
	ParallelIterator,
};
use std::{
	ffi::OsString,
	io,
	path::{
		Path,
		PathBuf,
	},
};



/// # Main.
fn main() {
	match main__() {
		Ok(()) => {},
		Err(e @ (CliError::PrintHelp | CliError::PrintVersion)) => {
			println!("{e}");
		},
		Err(e) => {
			Msg::error(e.as_str()).eprint();
			std::process::exit(1);
		},
	}
}

#[inline]
/// # Actual Main.
fn main__() -> Result<(), CliError> {
	let (progress, paths) = parse_args(argyle::args())?;

	// Sexy run-through.
	if progress {
		// Boot up a progress bar.
		let progress = Progless::try_from(paths.len())?
			.with_title(Some(Msg::new(("Compressed Output", 199), "Reticulating &splines;")));

		// Process!
		let (before, after) = paths.par_iter()
			.map(|x| {
				let tmp = x.to_string_lossy();
				let _task = progress.task(&*tmp);
				crunch(x).unwrap_or_default()
			})
			.reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

		// Finish up.
		progress.finish();
		progress.summary(MsgKind::Crunched, "document", "documents").print();
		if after < before {
			Msg::new(("Saved", 199), format!(
				"{} bytes ({} → {}).",
				NiceU64::from(before - after).as_str(),
				NiceU64::from(before).as_str(),
				NiceU64::from(after).as_str(),
			)).print();
		}
	}
	else {
		paths.par_iter().for_each(|x| { let _res = crunch(x); });
	}

	Ok(())
}

/// # Parse Arguments.
///
/// Work through the CLI arguments, returning whether or not to show
/// progress, along with all of the `.htm`/`.html` files found in (or under)
/// the given paths.
///
/// ## Errors
///
/// Help and version requests short-circuit with the corresponding
/// non-error; otherwise an unreadable path list or the absence of any
/// documents is an error.
fn parse_args<I>(args: Argue<I>) -> Result<(bool, Vec<PathBuf>), CliError>
where I: Iterator<Item=OsString> {
	let args = args.with_keywords(include!(concat!(env!("OUT_DIR"), "/argyle.rs")));

	let mut progress = false;
	let mut paths = Dowser::default();
	for arg in args {
		match arg {
			Argument::Key("-h" | "--help") => return Err(CliError::PrintHelp),
			Argument::Key("-p" | "--progress") => { progress = true; },
			Argument::Key("-V" | "--version") => return Err(CliError::PrintVersion),

			Argument::KeyWithValue("-l" | "--list", s) => {
				paths = paths.with_paths(read_list(&s)?);
			},

			// Assume these are paths.
			Argument::Path(s) => { paths = paths.with_paths([s]); },
			Argument::Other(s) => { paths = paths.with_paths([s]); },
			Argument::InvalidUtf8(s) => { paths = paths.with_paths([s]); },

			// Nothing else is relevant.
			_ => {},
		}
	}

	// Find the documents.
	let paths: Vec<PathBuf> = paths.filter(|p| is_html(p)).collect();
	if paths.is_empty() { Err(CliError::NoDocuments) }
	else { Ok((progress, paths)) }
}

/// # Crunch One File.
///
/// Minify the document and save it back to the same path, but only if the
/// result is smaller. The before and after sizes are returned.
///
/// ## Errors
///
/// This will return an error if the file is unreadable, empty, or can't be
/// safely minified, or if the result can't be saved.
fn crunch(path: &Path) -> Result<(u64, u64), CliError> {
	let raw = std::fs::read_to_string(path).map_err(|_| CliError::Read)?;
	let before = u64::try_from(raw.len()).map_err(|_| CliError::Read)?;
	if before == 0 { return Err(CliError::EmptyFile); }

	let out = compressed_output::minify_markup(&raw)?;
	let after = u64::try_from(out.len()).map_err(|_| CliError::Write)?;

	// Only save if we actually saved something.
	if 0 < after && after < before {
		write_atomic::write_file(path, out.as_bytes()).map_err(|_| CliError::Write)?;
		Ok((before, after))
	}
	else { Ok((before, before)) }
}

/// # Is HTML?
///
/// Check for an `.htm` or `.html` extension, case-insensitively.
fn is_html(path: &Path) -> bool {
	path.extension()
		.and_then(|e| e.to_str())
		.is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
}

/// # Read Path List.
///
/// Read one path per line from the file, or STDIN if the "file" is `-`.
/// Blank lines are ignored.
fn read_list(src: &str) -> Result<Vec<PathBuf>, CliError> {
	let raw =
		if src == "-" { io::read_to_string(io::stdin()) }
		else { std::fs::read_to_string(src) };
	let raw = raw.map_err(|_| CliError::ListFile)?;

	Ok(
		raw.lines()
			.map(str::trim)
			.filter(|l| ! l.is_empty())
			.map(PathBuf::from)
			.collect()
	)
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn t_is_html() {
		for (raw, expected) in [
			("/foo/index.html", true),
			("/foo/index.HTM", true),
			("/foo/index.Html", true),
			("index.htm", true),
			("/foo/index.html.gz", false),
			("/foo/index.txt", false),
			("/foo/html", false),
			("/foo/.html", false),
		] {
			assert_eq!(is_html(Path::new(raw)), expected, "{raw}");
		}
	}

	#[test]
	fn t_parse_args() {
		let dir = std::env::temp_dir().join(format!("compressed-output-args-{}", std::process::id()));
		std::fs::create_dir_all(&dir).expect("Unable to create temporary directory.");

		let html = dir.join("page.html");
		let text = dir.join("notes.txt");
		std::fs::write(&html, "<p>Hi</p>").expect("Unable to write file.");
		std::fs::write(&text, "Hi").expect("Unable to write file.");
		let html = std::fs::canonicalize(&html).expect("Missing file.");

		// Files that exist on disk.
		let (progress, paths) = parse_args(Argue::from(vec![
			OsString::from(&html),
			OsString::from(&text),
		])).expect("No documents.");
		assert!(! progress);
		assert_eq!(paths, vec![html.clone()]);

		// A whole directory, with progress.
		let (progress, paths) = parse_args(Argue::from(vec![
			OsString::from("-p"),
			dir.clone().into_os_string(),
		])).expect("No documents.");
		assert!(progress);
		assert_eq!(paths, vec![html]);

		// Nothing relevant.
		assert!(matches!(
			parse_args(Argue::from(vec![OsString::from(&text)])),
			Err(CliError::NoDocuments),
		));

		// Help.
		assert!(matches!(
			parse_args(Argue::from(vec![OsString::from("--help")])),
			Err(CliError::PrintHelp),
		));

		let _res = std::fs::remove_dir_all(&dir);
	}

	#[test]
	fn t_crunch() {
		let dir = std::env::temp_dir().join(format!("compressed-output-{}", std::process::id()));
		std::fs::create_dir_all(&dir).expect("Unable to create temporary directory.");

		// This one should shrink.
		let path = dir.join("one.html");
		let raw = "<div>\n  @if($a)\n    {{ $a }}\n  @endif\n</div>\n";
		std::fs::write(&path, raw).expect("Unable to write file.");
		let (before, after) = crunch(&path).expect("Crunch failed.");
		assert_eq!(before, raw.len() as u64);
		assert!(after < before);
		assert_eq!(
			std::fs::read_to_string(&path).expect("Unable to read file."),
			"<div>@if($a) {{ $a }} @endif</div>",
		);

		// This one is already as small as it gets.
		let path = dir.join("two.html");
		std::fs::write(&path, "<p>Hi</p>").expect("Unable to write file.");
		assert_eq!(crunch(&path).ok(), Some((9, 9)));

		// This one is broken and should be left alone.
		let path = dir.join("three.html");
		let raw = "<p> Hi </p><script>var a = 'oops;</script>";
		std::fs::write(&path, raw).expect("Unable to write file.");
		assert!(matches!(crunch(&path), Err(CliError::Minify(_))));
		assert_eq!(std::fs::read_to_string(&path).expect("Unable to read file."), raw);

		// Empty.
		let path = dir.join("four.html");
		std::fs::write(&path, "").expect("Unable to write file.");
		assert!(matches!(crunch(&path), Err(CliError::EmptyFile)));

		let _res = std::fs::remove_dir_all(&dir);
	}
}
