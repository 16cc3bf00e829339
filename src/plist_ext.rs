use crate::error::Result;
use std::io::Cursor;

/// A parsed property list whose root is a dictionary.
#[derive(Debug, Clone, Default)]
pub struct PlistDocument {
    pub data: plist::Dictionary,
}

impl PlistDocument {
    /// Parses XML or binary plist bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let data = plist::from_reader::<_, plist::Dictionary>(Cursor::new(bytes))?;
        Ok(Self { data })
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_string())
    }

    /// A string value that is not empty after trimming.
    pub fn non_blank_string(&self, key: &str) -> Option<&str> {
        self.get_string(key).filter(|s| !s.trim().is_empty())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Nested dictionary stored under `key`.
    pub fn dictionary(&self, key: &str) -> Option<PlistDocument> {
        self.data
            .get(key)
            .and_then(|v| v.as_dictionary())
            .map(|d| PlistDocument { data: d.clone() })
    }

    pub fn into_keys(self) -> Vec<String> {
        self.data.into_iter().map(|(k, _)| k).collect()
    }
}
