use std::io::{self, BufRead, Write};

pub const BANNER: &str = "Stanford Encyclopedia of Philosophy Content Extractor";
pub const PROMPT: &str = "Enter keywords (separated by commas): ";

pub fn print_banner<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{BANNER}")?;
    writeln!(out, "{}", "-".repeat(BANNER.len()))
}

/// Ask for a keyword line and return it without the line terminator.
/// End of input yields an empty line.
pub fn read_keyword_line<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<String> {
    write!(out, "{PROMPT}")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
