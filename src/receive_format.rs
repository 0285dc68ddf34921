use std::{fmt::Display, str::FromStr};

/// How a response body is decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReceiveFormat {
    #[default]
    Json,
    Text,
    FormData,
    Blob,
    ArrayBuffer,
}

impl ReceiveFormat {
    /// Resolves a configured format name. Names that are not recognized decode as JSON.
    pub fn resolve(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiveFormat::Json => "JSON",
            ReceiveFormat::Text => "TEXT",
            ReceiveFormat::FormData => "FORMDATA",
            ReceiveFormat::Blob => "BLOB",
            ReceiveFormat::ArrayBuffer => "ARRAYBUFFER",
        }
    }
}

impl Display for ReceiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReceiveFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "JSON" => Ok(ReceiveFormat::Json),
            "TEXT" => Ok(ReceiveFormat::Text),
            "FORMDATA" => Ok(ReceiveFormat::FormData),
            "BLOB" => Ok(ReceiveFormat::Blob),
            "ARRAYBUFFER" => Ok(ReceiveFormat::ArrayBuffer),
            other => Err(format!("unknown receive format `{other}`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(ReceiveFormat::Text, "text".parse().unwrap());
        assert_eq!(ReceiveFormat::ArrayBuffer, "ArrayBuffer".parse().unwrap());
        assert_eq!(ReceiveFormat::FormData, "FORMDATA".parse().unwrap());
    }

    #[test]
    fn unknown_names_resolve_to_json() {
        assert!("XML".parse::<ReceiveFormat>().is_err());
        assert_eq!(ReceiveFormat::Json, ReceiveFormat::resolve("XML"));
        assert_eq!(ReceiveFormat::Json, ReceiveFormat::resolve(""));
        assert_eq!(ReceiveFormat::Blob, ReceiveFormat::resolve("blob"));
    }

    #[test]
    fn displays_upper_case_name() {
        assert_eq!("ARRAYBUFFER", ReceiveFormat::ArrayBuffer.to_string());
    }
}
