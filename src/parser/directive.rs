use regex::{Captures, Regex};
use std::fmt;

// Directive grammar; `[ \t]*` is the "blank" production, a trailing `\r` is
// treated as part of the line ending.
const DIRECTIVE_BODY: &str = r"[ \t]*//[ \t]*@(?:(?P<kind>ifdef|ifndef)[ \t]*(?P<name>[A-Za-z0-9_-]+)|(?P<endif>endif))[ \t]*\r?";

/// A recognised control line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    /// `//@ifdef NAME`: include the block when `NAME` is truthy
    Ifdef(&'a str),
    /// `//@ifndef NAME`: include the block when `NAME` is falsy
    Ifndef(&'a str),
    /// `//@endif`: close the innermost block
    Endif,
}

impl fmt::Display for Directive<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Ifdef(name) => write!(f, "@ifdef {}", name),
            Directive::Ifndef(name) => write!(f, "@ifndef {}", name),
            Directive::Endif => write!(f, "@endif"),
        }
    }
}

/// A directive together with where it sits in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located<'a> {
    pub directive: Directive<'a>,
    /// 1-based line number
    pub line: usize,
    /// Byte offset of the start of the directive line
    pub start: usize,
    /// Byte offset just past the directive line, including its line ending
    pub end: usize,
}

/// Recognises directive lines in source text
#[derive(Debug, Clone)]
pub struct DirectiveParser {
    line_regex: Regex,
    scan_regex: Regex,
}

impl DirectiveParser {
    /// Create a new directive parser
    pub fn new() -> Self {
        let line_regex = Regex::new(&format!(r"\A{}\z", DIRECTIVE_BODY))
            .expect("Invalid directive regex");
        let scan_regex = Regex::new(&format!(r"(?m)^{}$", DIRECTIVE_BODY))
            .expect("Invalid directive regex");

        Self { line_regex, scan_regex }
    }

    /// Classify a single line, without its `\n` terminator
    pub fn parse_line<'a>(&self, line: &'a str) -> Option<Directive<'a>> {
        self.line_regex.captures(line).map(|caps| directive_from(&caps))
    }

    /// Iterate over every directive line in `input`, in order
    pub fn scan<'p, 'a>(&'p self, input: &'a str) -> Scan<'p, 'a> {
        Scan {
            captures: self.scan_regex.captures_iter(input),
            input,
            line: 1,
            counted_to: 0,
        }
    }
}

impl Default for DirectiveParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`DirectiveParser::scan`]
pub struct Scan<'p, 'a> {
    captures: regex::CaptureMatches<'p, 'a>,
    input: &'a str,
    line: usize,
    counted_to: usize,
}

impl<'a> Iterator for Scan<'_, 'a> {
    type Item = Located<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let caps = self.captures.next()?;
        let whole = caps.get(0)?;
        let start = whole.start();

        self.line += count_newlines(&self.input[self.counted_to..start]);
        self.counted_to = start;

        // Swallow the line terminator so the directive leaves no trace
        let mut end = whole.end();
        if self.input[end..].starts_with('\n') {
            end += 1;
        }

        Some(Located {
            directive: directive_from(&caps),
            line: self.line,
            start,
            end,
        })
    }
}

fn directive_from<'a>(caps: &Captures<'a>) -> Directive<'a> {
    if caps.name("endif").is_some() {
        return Directive::Endif;
    }

    let name = caps.name("name").map(|m| m.as_str()).unwrap_or_default();
    match caps.name("kind").map(|m| m.as_str()) {
        Some("ifndef") => Directive::Ifndef(name),
        _ => Directive::Ifdef(name),
    }
}

fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count()
}
