use std::fmt::Formatter;
use std::result;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Error {
    /// Index out of bounds: (index, length).
    Index(usize, usize),
    /// Fixed-size element of unexpected size: (expected, actual).
    Stride(usize, usize),
    /// Broken tree invariant: (depth, message).
    Tree(usize, String),
    Other(String),
}

pub type Result<T> = result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Index(idx, len) => write!(f, "Index error: '{} out of {}'.", idx, len),
            Error::Stride(exp, got) => {
                write!(f, "Stride error: expected {} bytes, got {}.", exp, got)
            }
            Error::Tree(depth, msg) => write!(f, "Tree error (depth: {}): '{}'.", depth, msg),
            Error::Other(msg) => write!(f, "Other error: '{}'.", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error {
    fn from(str: String) -> Self {
        Error::Other(str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Error::Index(7, 3).to_string(), "Index error: '7 out of 3'.");
        assert_eq!(
            Error::Stride(4, 8).to_string(),
            "Stride error: expected 4 bytes, got 8."
        );
        assert_eq!(
            Error::Tree(2, "keys out of order".to_string()).to_string(),
            "Tree error (depth: 2): 'keys out of order'."
        );
        assert_eq!(
            Error::from("boom".to_string()),
            Error::Other("boom".to_string())
        );
    }
}
