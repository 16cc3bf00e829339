use crate::error::{ConvertError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// An app record as found in the legacy flat dialect (or already converted).
///
/// Only the identity fields are typed. Everything else is carried as raw
/// JSON so an oddly typed value never costs the whole record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceApp {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bundle_identifier: Option<String>,
    #[serde(default)]
    pub developer_name: Option<Value>,
    #[serde(default)]
    pub localized_description: Option<Value>,
    #[serde(default, rename = "iconURL")]
    pub icon_url: Option<Value>,
    #[serde(default)]
    pub tint_color: Option<Value>,
    #[serde(default)]
    pub subtitle: Option<Value>,
    #[serde(default, rename = "screenshotURLs")]
    pub screenshot_urls: Option<Value>,
    #[serde(default)]
    pub screenshots: Option<Value>,

    // Flat version fields
    #[serde(default)]
    pub version: Option<Value>,
    #[serde(default)]
    pub version_date: Option<Value>,
    #[serde(default, rename = "downloadURL")]
    pub download_url: Option<Value>,
    #[serde(default)]
    pub size: Option<Value>,
    #[serde(default, rename = "minOSVersion")]
    pub min_os_version: Option<Value>,

    #[serde(default)]
    pub versions: Option<Value>,
}

impl SourceApp {
    pub fn icon_url_str(&self) -> &str {
        self.icon_url
            .as_ref()
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

/// An app record in AltStore source form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertedApp {
    pub name: String,
    pub bundle_identifier: String,
    pub developer_name: Value,
    pub localized_description: Value,
    #[serde(rename = "iconURL")]
    pub icon_url: Value,
    pub tint_color: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshots: Option<Value>,
    /// Copied verbatim when the source had them, otherwise one synthesized entry.
    pub versions: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_permissions: Option<AppPermissions>,
}

impl ConvertedApp {
    /// `downloadURL` of the first version entry, if it is a non-empty string.
    pub fn first_download_url(&self) -> Option<&str> {
        self.versions
            .get(0)
            .and_then(|v| v.get("downloadURL"))
            .and_then(Value::as_str)
            .filter(|u| !u.is_empty())
    }
}

/// What an archive declares it needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionResult {
    pub entitlements: BTreeSet<String>,
    pub privacy: BTreeMap<String, String>,
}

impl PermissionResult {
    pub fn is_empty(&self) -> bool {
        self.entitlements.is_empty() && self.privacy.is_empty()
    }

    pub fn total(&self) -> usize {
        self.entitlements.len() + self.privacy.len()
    }
}

/// The `appPermissions` object; empty halves are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppPermissions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entitlements: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub privacy: BTreeMap<String, String>,
}

impl AppPermissions {
    /// `None` when there is nothing worth attaching.
    pub fn from_result(result: PermissionResult) -> Option<Self> {
        if result.is_empty() {
            return None;
        }
        Some(Self {
            entitlements: result.entitlements.into_iter().collect(),
            privacy: result.privacy,
        })
    }
}

/// A whole source document, keys in their original order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog(pub Map<String, Value>);

impl Catalog {
    /// Moves the app records out, leaving `apps` in place as an empty array.
    /// A missing or null `apps` reads as no records.
    pub fn take_apps(&mut self) -> Result<Vec<Value>> {
        match self.0.get_mut("apps") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(apps)) => Ok(std::mem::take(apps)),
            Some(other) => Err(ConvertError::InvalidInput(format!(
                "'apps' must be an array, found {}",
                json_kind(other)
            ))),
        }
    }

    /// Replaces `apps` without moving it; appended when the key was absent.
    pub fn set_apps(&mut self, apps: Vec<Value>) {
        self.0.insert("apps".to_string(), Value::Array(apps));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert_str(&mut self, key: &str, value: String) {
        self.0.insert(key.to_string(), Value::String(value));
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// JSON truthiness: null, false, zero, empty strings, empty arrays and empty
/// objects are false.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
    }
}
