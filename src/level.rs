// Log levels resolved from single-character codes

use serde::{Deserialize, Serialize};

/// Level tag rendered into every entry line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    /// Error conditions (`e`)
    Error,
    /// Unrecoverable conditions (`f`)
    Fatal,
    /// Informational (`i`)
    Info,
    /// Warning conditions (`w`)
    Warn,
    /// Any code that is not one of the above
    Unknown,
}

impl Level {
    /// Resolve a level code string. Only a single recognised character maps
    /// to a named level; empty or multi-character codes are `Unknown`.
    pub fn from_code(code: &str) -> Self {
        let mut chars = code.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => Level::Unknown,
        }
    }

    /// Resolve a single-character level code
    pub const fn from_char(code: char) -> Self {
        match code {
            'e' => Level::Error,
            'f' => Level::Fatal,
            'i' => Level::Info,
            'w' => Level::Warn,
            _ => Level::Unknown,
        }
    }

    /// Code accepted by [`Level::from_char`], `'?'` for `Unknown`
    pub const fn code(self) -> char {
        match self {
            Level::Error => 'e',
            Level::Fatal => 'f',
            Level::Info => 'i',
            Level::Warn => 'w',
            Level::Unknown => '?',
        }
    }

    /// Get level name as static string
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_char() {
        assert_eq!(Level::from_char('e'), Level::Error);
        assert_eq!(Level::from_char('f'), Level::Fatal);
        assert_eq!(Level::from_char('i'), Level::Info);
        assert_eq!(Level::from_char('w'), Level::Warn);
        assert_eq!(Level::from_char('x'), Level::Unknown);
        assert_eq!(Level::from_char('I'), Level::Unknown);
    }

    #[test]
    fn test_level_from_code() {
        assert_eq!(Level::from_code("i"), Level::Info);
        assert_eq!(Level::from_code(""), Level::Unknown);
        assert_eq!(Level::from_code("ii"), Level::Unknown);
        assert_eq!(Level::from_code("info"), Level::Unknown);
    }

    #[test]
    fn test_level_code_roundtrip() {
        for level in [Level::Error, Level::Fatal, Level::Info, Level::Warn] {
            assert_eq!(Level::from_char(level.code()), level);
        }
        assert_eq!(Level::from_char(Level::Unknown.code()), Level::Unknown);
    }

    #[test]
    fn test_level_display() {
        assert_eq!(format!("{}", Level::Error), "ERROR");
        assert_eq!(format!("{}", Level::Unknown), "UNKNOWN");
    }
}
