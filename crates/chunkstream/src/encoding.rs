//! Text encodings understood by the cursor and the writer.

use std::fmt;
use std::str::FromStr;

use crate::StreamError;

/// A text encoding, parsed case-insensitively from its name.
///
/// # Example
///
/// ```
/// use chunkstream::Encoding;
///
/// assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
/// assert_eq!("utf16-le".parse::<Encoding>().unwrap(), Encoding::Utf16Le);
/// assert!("ebcdic".parse::<Encoding>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Ascii,
    Latin1,
    Utf8,
    Utf16Be,
    Utf16Le,
    /// UTF-16 preceded by a byte-order mark.
    Utf16Bom,
}

impl Encoding {
    /// Width in bytes of one code unit.
    pub fn unit_size(self) -> usize {
        match self {
            Encoding::Ascii | Encoding::Latin1 | Encoding::Utf8 => 1,
            Encoding::Utf16Be | Encoding::Utf16Le | Encoding::Utf16Bom => 2,
        }
    }

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Ascii => "ascii",
            Encoding::Latin1 => "latin1",
            Encoding::Utf8 => "utf8",
            Encoding::Utf16Be => "utf16be",
            Encoding::Utf16Le => "utf16le",
            Encoding::Utf16Bom => "utf16bom",
        }
    }
}

impl FromStr for Encoding {
    type Err = StreamError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "ascii" => Ok(Encoding::Ascii),
            "latin1" => Ok(Encoding::Latin1),
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "utf16be" | "utf16-be" => Ok(Encoding::Utf16Be),
            "utf16le" | "utf16-le" => Ok(Encoding::Utf16Le),
            "utf16bom" | "utf16-bom" => Ok(Encoding::Utf16Bom),
            _ => Err(StreamError::UnknownEncoding(name.to_string())),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        let cases = [
            ("ascii", Encoding::Ascii),
            ("LATIN1", Encoding::Latin1),
            ("utf8", Encoding::Utf8),
            ("Utf-8", Encoding::Utf8),
            ("utf16be", Encoding::Utf16Be),
            ("UTF16-BE", Encoding::Utf16Be),
            ("utf16le", Encoding::Utf16Le),
            ("utf16-le", Encoding::Utf16Le),
            ("utf16bom", Encoding::Utf16Bom),
            ("utf16-BOM", Encoding::Utf16Bom),
        ];
        for (name, expected) in cases {
            assert_eq!(name.parse::<Encoding>().unwrap(), expected, "{name}");
        }
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            "utf32".parse::<Encoding>(),
            Err(StreamError::UnknownEncoding("utf32".to_string()))
        );
    }

    #[test]
    fn test_unit_size() {
        assert_eq!(Encoding::Latin1.unit_size(), 1);
        assert_eq!(Encoding::Utf16Bom.unit_size(), 2);
    }
}
