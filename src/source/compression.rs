//! Compression schemes understood by the line source

use crate::TickIngestError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Declared compression of an input file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
    Zlib,
    /// First entry of a zip archive, stored or deflated
    Zip,
    /// Pick the scheme from the file extension at open time
    #[default]
    Infer,
}

impl Compression {
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Zlib => "zlib",
            Self::Zip => "zip",
            Self::Infer => "infer",
        }
    }

    /// Scheme implied by the file suffix; unknown suffixes mean plain text
    pub fn from_extension(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("gz" | "gzip") => Self::Gzip,
            Some("bz2" | "bzip2") => Self::Bzip2,
            Some("zz" | "zlib") => Self::Zlib,
            Some("zip") => Self::Zip,
            _ => Self::None,
        }
    }

    /// Resolve `Infer` against a concrete path
    pub fn resolve(self, path: &Path) -> Self {
        match self {
            Self::Infer => Self::from_extension(path),
            other => other,
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Compression {
    type Err = TickIngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "plain" => Ok(Self::None),
            "gzip" | "gz" => Ok(Self::Gzip),
            "bzip2" | "bz2" => Ok(Self::Bzip2),
            "zlib" => Ok(Self::Zlib),
            "zip" => Ok(Self::Zip),
            "infer" | "auto" => Ok(Self::Infer),
            _ => Err(TickIngestError::Config(format!(
                "unsupported compression scheme: {s:?}"
            ))),
        }
    }
}

impl TryFrom<String> for Compression {
    type Error = TickIngestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Compression> for String {
    fn from(compression: Compression) -> Self {
        compression.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("".parse::<Compression>().unwrap(), Compression::None);
        assert_eq!("GZIP".parse::<Compression>().unwrap(), Compression::Gzip);
        assert_eq!("bz2".parse::<Compression>().unwrap(), Compression::Bzip2);
        assert_eq!("zip".parse::<Compression>().unwrap(), Compression::Zip);
        assert_eq!("auto".parse::<Compression>().unwrap(), Compression::Infer);
    }

    #[test]
    fn test_unsupported_is_config_error() {
        let err = "lz4".parse::<Compression>().unwrap_err();
        assert!(matches!(err, TickIngestError::Config(ref msg) if msg.contains("lz4")));
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(Compression::from_extension(Path::new("q.csv.gz")), Compression::Gzip);
        assert_eq!(Compression::from_extension(Path::new("q.BZ2")), Compression::Bzip2);
        assert_eq!(Compression::from_extension(Path::new("q.zip")), Compression::Zip);
        assert_eq!(Compression::from_extension(Path::new("q.csv")), Compression::None);
        assert_eq!(Compression::from_extension(Path::new("noext")), Compression::None);
    }

    #[test]
    fn test_resolve_only_touches_infer() {
        let path = Path::new("x.gz");
        assert_eq!(Compression::Infer.resolve(path), Compression::Gzip);
        assert_eq!(Compression::Bzip2.resolve(path), Compression::Bzip2);
    }
}
