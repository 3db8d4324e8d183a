use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Reads a whole corpus file as text.
///
/// - Reads the entire file into memory
/// - Line breaks are kept, they are symbols like any other character
pub fn read_corpus<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents)
}

/// Splits a text into whitespace-separated words.
pub fn words(text: &str) -> Vec<String> {
	text.split_whitespace().map(str::to_owned).collect()
}
