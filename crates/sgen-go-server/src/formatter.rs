use sgen_core::Formatter;
use sgen_core::error::FormatError;

/// Whitespace normalization for rendered Go sources.
///
/// Strips trailing whitespace, collapses runs of blank lines, drops blank
/// lines directly inside braces and parentheses, and ends the file with
/// exactly one newline. Alignment is left to `gofmt`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoFormatter;

impl Formatter for GoFormatter {
    fn format_content(&self, file_name: &str, content: &str) -> Result<String, FormatError> {
        if content.contains('\0') {
            return Err(FormatError {
                file: file_name.to_string(),
                message: "rendered output contains a NUL byte".to_string(),
            });
        }

        let mut lines: Vec<&str> = Vec::new();
        for line in content.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                match lines.last() {
                    None => continue,
                    Some(prev) if prev.is_empty() || opens_block(prev) => continue,
                    _ => {}
                }
            } else if closes_block(line) && lines.last().is_some_and(|prev| prev.is_empty()) {
                lines.pop();
            }
            lines.push(line);
        }
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        let mut out = lines.join("\n");
        out.push('\n');
        Ok(out)
    }
}

fn opens_block(line: &str) -> bool {
    line.ends_with('{') || line.ends_with('(')
}

fn closes_block(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with('}') || line.starts_with(')')
}
