use crate::config::{DEFAULT_MIN_OS_VERSION, DEFAULT_TINT_COLOR, DEFAULT_VERSION};
use crate::model::{is_present, AppPermissions, ConvertedApp, PermissionResult, SourceApp};
use crate::report::Reporter;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde_json::{Map, Value};

/// Source of permission data for a download URL.
pub trait PermissionAnalyzer {
    fn analyze(&self, download_url: &str) -> PermissionResult;
}

/// Source dates carry no zone; the catalogs this reads are published in US Pacific.
const CATALOG_UTC_OFFSET_SECS: i32 = -8 * 3600;

pub struct SchemaConverter<'a> {
    analyzer: Option<&'a dyn PermissionAnalyzer>,
    reporter: &'a dyn Reporter,
}

impl<'a> SchemaConverter<'a> {
    pub fn new(reporter: &'a dyn Reporter) -> Self {
        Self {
            analyzer: None,
            reporter,
        }
    }

    /// Enables permission enrichment through `analyzer`.
    pub fn with_analyzer(mut self, analyzer: &'a dyn PermissionAnalyzer) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Returns `None` for records lacking a name or bundle identifier.
    /// Every other field is copied through whatever its JSON type.
    pub fn convert_app(&self, app: &SourceApp) -> Option<ConvertedApp> {
        let name = app.name.as_deref().filter(|s| !s.is_empty())?;
        let bundle_identifier = app.bundle_identifier.as_deref().filter(|s| !s.is_empty())?;

        let versions = match &app.versions {
            Some(versions) if is_present(versions) => versions.clone(),
            _ => Value::Array(vec![synthesize_version(app, name)]),
        };

        let mut converted = ConvertedApp {
            name: name.to_string(),
            bundle_identifier: bundle_identifier.to_string(),
            developer_name: or_empty(&app.developer_name),
            localized_description: or_empty(&app.localized_description),
            icon_url: or_empty(&app.icon_url),
            tint_color: app
                .tint_color
                .clone()
                .unwrap_or_else(|| Value::from(DEFAULT_TINT_COLOR)),
            subtitle: app.subtitle.clone().filter(is_present),
            screenshots: resolve_screenshots(app, name),
            versions,
            app_permissions: None,
        };

        if let Some(analyzer) = self.analyzer {
            match converted.first_download_url().map(str::to_string) {
                Some(url) => {
                    converted.app_permissions = AppPermissions::from_result(analyzer.analyze(&url))
                }
                None => self
                    .reporter
                    .notice(&format!("{} has no download URL, skipping IPA analysis", name)),
            }
        }

        Some(converted)
    }
}

fn or_empty(value: &Option<Value>) -> Value {
    value.clone().unwrap_or_else(|| Value::from(""))
}

fn resolve_screenshots(app: &SourceApp, name: &str) -> Option<Value> {
    if let Some(urls) = app.screenshot_urls.as_ref().filter(|v| is_present(v)) {
        return Some(urls.clone());
    }
    if let Some(shots) = app.screenshots.as_ref().filter(|v| is_present(v)) {
        return Some(shots.clone());
    }

    let icon_url = app.icon_url_str();
    if !icon_url.contains("serve/icons") {
        return None;
    }
    let base = icon_url.split("/serve/icons/").next().unwrap_or_default();
    if base.is_empty() {
        return None;
    }
    Some(Value::Array(vec![Value::String(fallback_screenshot_url(
        base, name,
    ))]))
}

/// Best guess at a screenshot location for hosts that serve assets under
/// `/serve/icons/` and `/serve/screenshots/`.
pub fn fallback_screenshot_url(base_url: &str, app_name: &str) -> String {
    format!(
        "{}/serve/screenshots/{}/{}-0.png",
        base_url,
        app_name,
        sanitize_name(app_name)
    )
}

/// Replaces everything except letters, digits, `-`, `_` and `.` with `_`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn synthesize_version(app: &SourceApp, name: &str) -> Value {
    let mut entry = Map::new();
    entry.insert(
        "version".into(),
        app.version.clone().unwrap_or_else(|| Value::from(DEFAULT_VERSION)),
    );
    entry.insert("date".into(), version_date(app.version_date.as_ref()));
    entry.insert("size".into(), app.size.clone().unwrap_or_else(|| Value::from(0)));
    entry.insert("downloadURL".into(), or_empty(&app.download_url));
    entry.insert(
        "localizedDescription".into(),
        or_empty(&app.localized_description),
    );
    entry.insert(
        "minOSVersion".into(),
        infer_min_os_version(name, app.min_os_version.as_ref()),
    );
    Value::Object(entry)
}

/// Strings are normalized, other truthy values are kept as given, and
/// anything falsy becomes "now".
fn version_date(raw: Option<&Value>) -> Value {
    match raw {
        Some(Value::String(date)) => Value::String(format_date(date)),
        Some(other) if is_present(other) => other.clone(),
        _ => Value::String(format_date("")),
    }
}

/// Name hints win over an explicit field; the explicit field (kept as given)
/// wins over the default.
pub fn infer_min_os_version(name: &str, explicit: Option<&Value>) -> Value {
    let lower = name.to_lowercase();
    if lower.contains("ios15") || lower.contains("w15") {
        return Value::from("15.0");
    }
    if lower.contains("ios16") {
        return Value::from("16.0");
    }
    if lower.contains("ios14") {
        return Value::from("14.0");
    }
    match explicit {
        Some(value) if !value.is_null() => value.clone(),
        _ => Value::from(DEFAULT_MIN_OS_VERSION),
    }
}

pub fn catalog_offset() -> FixedOffset {
    FixedOffset::east_opt(CATALOG_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

pub fn now_in_catalog_zone() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&catalog_offset())
}

/// Empty -> now; full timestamps are kept; bare dates get midnight.
pub fn format_date(date: &str) -> String {
    if date.is_empty() {
        return now_in_catalog_zone()
            .format("%Y-%m-%dT%H:%M:%S%:z")
            .to_string();
    }
    if date.contains('T') {
        return date.to_string();
    }
    format!("{}T00:00:00-08:00", date)
}
