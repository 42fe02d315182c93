//! Codec configuration.

use serde::{Deserialize, Serialize};

/// How enum fields are written. Reading accepts both forms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumEncoding {
    /// The variant's symbolic name, e.g. `"Green"`.
    #[default]
    Name,
    /// The variant's declaration index, e.g. `1`.
    Ordinal,
}

/// How map fields are written. Reading accepts both forms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapEncoding {
    /// An array of `[key, value]` arrays.
    #[default]
    Pairs,
    /// A nested record keyed by the key's text.
    Record,
}

/// Configuration for a [`RecordCodec`](crate::RecordCodec).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub enum_encoding: EnumEncoding,
    pub map_encoding: MapEncoding,
    /// Skip fields whose record value does not fit instead of failing.
    pub lenient: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            enum_encoding: EnumEncoding::Name,
            map_encoding: MapEncoding::Pairs,
            lenient: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_strict_names_and_pairs() {
        let config = CodecConfig::default();
        assert_eq!(config.enum_encoding, EnumEncoding::Name);
        assert_eq!(config.map_encoding, MapEncoding::Pairs);
        assert!(!config.lenient);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: CodecConfig =
            serde_json::from_value(serde_json::json!({ "enum_encoding": "ordinal" })).unwrap();
        assert_eq!(config.enum_encoding, EnumEncoding::Ordinal);
        assert_eq!(config.map_encoding, MapEncoding::Pairs);
        assert!(!config.lenient);
    }
}
