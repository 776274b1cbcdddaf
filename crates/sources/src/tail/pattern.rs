//! File name patterns (`*.log`, `app-?.txt`)

use regex::Regex;

use super::TailError;

/// Compiled set of glob-like file name patterns
///
/// `*` matches any run of characters and `?` a single character; everything
/// else is literal. Patterns apply to the file name, not the full path.
#[derive(Debug, Clone)]
pub struct FilePatterns {
    regex: Regex,
}

impl FilePatterns {
    /// Compile patterns into a single matcher
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, TailError> {
        let alternatives: Vec<String> = patterns
            .iter()
            .map(|p| glob_to_regex(p.as_ref()))
            .collect();
        let source = format!("^(?:{})$", alternatives.join("|"));

        let regex = Regex::new(&source).map_err(|e| TailError::InvalidPattern {
            pattern: patterns
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<_>>()
                .join(","),
            reason: e.to_string(),
        })?;
        Ok(Self { regex })
    }

    /// Whether `file_name` matches any pattern
    pub fn matches(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }
}

fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut literal = [0u8; 4];
    for c in pattern.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            _ => out.push_str(&regex::escape(c.encode_utf8(&mut literal))),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pattern() {
        let patterns = FilePatterns::new(&["*.log"]).unwrap();
        assert!(patterns.matches("file.log"));
        assert!(patterns.matches(".log"));
        assert!(!patterns.matches("file.log.1"));
        assert!(!patterns.matches("file.txt"));
        assert!(!patterns.matches("filelog"));
    }

    #[test]
    fn test_multiple_patterns_and_wildcards() {
        let patterns = FilePatterns::new(&["*.log", "app-?.txt"]).unwrap();
        assert!(patterns.matches("app-1.txt"));
        assert!(!patterns.matches("app-10.txt"));
        assert!(patterns.matches("x.log"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let patterns = FilePatterns::new(&["(a+).log"]).unwrap();
        assert!(patterns.matches("(a+).log"));
        assert!(!patterns.matches("aa.log"));
    }
}
