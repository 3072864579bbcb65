//! Plain text coordinate listings, one `x  y` pair per line, as used by most airfoil tools.

use crate::airfoil::CoordinateLoop;
use crate::errors::{AeroError, Result};
use crate::serialize::AeroPoint;
use std::io::Write;

/// A parsed coordinate listing
#[derive(Clone, Debug, PartialEq)]
pub struct DatFile {
    /// Name and comment lines found before the first coordinate, as written
    pub headers: Vec<String>,
    pub points: Vec<AeroPoint>,
}

impl DatFile {
    pub fn to_loop(&self) -> Result<CoordinateLoop> {
        CoordinateLoop::try_from(self.points.clone())
    }
}

/// Formats the loop with six decimals per coordinate. When headers are given they come first,
/// followed by a blank line.
pub fn format_dat(shape: &CoordinateLoop, headers: &[&str]) -> String {
    let mut text = String::new();
    for h in headers.iter() {
        text.push_str(h);
        text.push('\n');
    }
    if !headers.is_empty() {
        text.push('\n');
    }

    for p in shape.points().iter() {
        text.push_str(&format!("{:.6}  {:.6}\n", p.x, p.y));
    }
    text
}

pub fn write_dat<W: Write>(writer: &mut W, shape: &CoordinateLoop, headers: &[&str]) -> Result<()> {
    writer.write_all(format_dat(shape, headers).as_bytes())?;
    Ok(())
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with('!')
}

fn parse_value(text: &str, line: usize) -> Result<f64> {
    text.parse::<f64>().map_err(|e| AeroError::Parse {
        line,
        message: format!("invalid number '{}': {}", text, e),
    })
}

/// Reads a listing of two or three whitespace separated columns. Blank lines and lines starting
/// with `#` or `!` are skipped anywhere, and lines starting with a letter are accepted as headers
/// until the first coordinate is read.
pub fn parse_dat(text: &str) -> Result<DatFile> {
    let mut headers = Vec::new();
    let mut points = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line_number = i + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let starts_alpha = line.chars().next().map_or(false, |c| c.is_alphabetic());
        if is_comment(line) || (starts_alpha && points.is_empty()) {
            if points.is_empty() {
                headers.push(line.to_string());
            }
            continue;
        }

        let fields: Vec<&str> = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|f| !f.is_empty())
            .collect();

        let point = match fields.as_slice() {
            [x, y] => AeroPoint::new(parse_value(x, line_number)?, parse_value(y, line_number)?),
            [x, y, z] => AeroPoint::with_z(
                parse_value(x, line_number)?,
                parse_value(y, line_number)?,
                parse_value(z, line_number)?,
            ),
            _ => {
                return Err(AeroError::Parse {
                    line: line_number,
                    message: format!("expected 2 or 3 columns, found {}", fields.len()),
                })
            }
        };
        points.push(point);
    }

    if points.is_empty() {
        return Err(AeroError::EmptyInput);
    }

    Ok(DatFile { headers, points })
}
