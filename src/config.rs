use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;

/// Sent with every archive download; some hosts refuse non-device clients.
pub const MOBILE_USER_AGENT: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X) AppleWebKit/605.1.15";

pub const DEFAULT_TINT_COLOR: &str = "FFC300";
pub const DEFAULT_SOURCE_IDENTIFIER: &str = "com.converted.source";
pub const DEFAULT_SOURCE_URL_BASE: &str = "https://example.com";
pub const DEFAULT_VERSION: &str = "1.0";
pub const DEFAULT_MIN_OS_VERSION: &str = "13.0";

pub const BATCH_OUTPUT_PREFIX: &str = "converted_";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            user_agent: MOBILE_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolSettings {
    pub codesign: PathBuf,
    pub security: PathBuf,
    pub timeout: Duration,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            codesign: PathBuf::from("codesign"),
            security: PathBuf::from("security"),
            timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
        }
    }
}

/// Everything a conversion run needs beyond its input and output paths.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub analyze_ipas: bool,
    pub fetch: FetchSettings,
    pub tools: ToolSettings,
}
