//! Interactive prompts for values not given on the command line.

use std::io::{self, BufRead, Write};

/// Print `question` and read one trimmed line of input.
pub fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> io::Result<String> {
    write!(output, "{question}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Parse a year such as `2023`.
pub fn parse_year(input: &str) -> Result<i32, String> {
    input
        .trim()
        .parse::<i32>()
        .map_err(|_| format!("'{input}' is not a valid year"))
}

/// Parse an optional month. Blank input means no month filter.
pub fn parse_month(input: &str) -> Result<Option<u32>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    match input.parse::<u32>() {
        Ok(month) if (1..=12).contains(&month) => Ok(Some(month)),
        _ => Err(format!("'{input}' is not a month between 1 and 12")),
    }
}
