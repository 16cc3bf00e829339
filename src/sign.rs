use crate::config::ToolSettings;
use crate::error::{ConvertError, Result};
use crate::plist_ext::PlistDocument;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::NamedTempFile;
use wait_timeout::ChildExt;

/// Reads entitlement keys from signing metadata.
///
/// Implementations return every key they find; filtering against the known
/// entitlement table happens in the caller.
pub trait SigningInspector {
    /// Entitlements embedded in the code signature of an extracted bundle.
    fn inspect_signing(&self, bundle_path: &Path) -> Result<Vec<String>>;

    /// Entitlements granted by a provisioning profile file.
    fn decode_provisioning(&self, profile_path: &Path) -> Result<Vec<String>>;
}

/// Shells out to `codesign` and `security` (macOS).
#[derive(Debug, Clone, Default)]
pub struct SystemSigningTools {
    settings: ToolSettings,
}

impl SystemSigningTools {
    pub fn new(settings: ToolSettings) -> Self {
        Self { settings }
    }
}

impl SigningInspector for SystemSigningTools {
    fn inspect_signing(&self, bundle_path: &Path) -> Result<Vec<String>> {
        let stdout = run_tool(
            &self.settings.codesign,
            &[
                OsStr::new("-d"),
                OsStr::new("--entitlements"),
                OsStr::new(":-"),
                bundle_path.as_os_str(),
            ],
            self.settings.timeout,
        )?;
        let doc = PlistDocument::from_bytes(&stdout)
            .map_err(|e| ConvertError::ToolOutput(format!("codesign: {}", e)))?;
        Ok(doc.into_keys())
    }

    fn decode_provisioning(&self, profile_path: &Path) -> Result<Vec<String>> {
        let stdout = run_tool(
            &self.settings.security,
            &[
                OsStr::new("cms"),
                OsStr::new("-D"),
                OsStr::new("-i"),
                profile_path.as_os_str(),
            ],
            self.settings.timeout,
        )?;
        let doc = PlistDocument::from_bytes(&stdout)
            .map_err(|e| ConvertError::ToolOutput(format!("security: {}", e)))?;
        let entitlements = doc.dictionary("Entitlements").ok_or_else(|| {
            ConvertError::ToolOutput("no 'Entitlements' key in decoded profile".to_string())
        })?;
        Ok(entitlements.into_keys())
    }
}

/// Runs `program` with a wall-clock limit and returns its stdout.
///
/// Output goes to temp files rather than pipes so a chatty tool can't block
/// on a full pipe while we wait on it.
pub fn run_tool(program: &Path, args: &[&OsStr], timeout: Duration) -> Result<Vec<u8>> {
    let tool = program
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| program.display().to_string());

    let stdout_file = NamedTempFile::new()?;
    let stderr_file = NamedTempFile::new()?;

    tracing::debug!(tool = %tool, ?args, "running external tool");

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout_file.reopen()?))
        .stderr(Stdio::from(stderr_file.reopen()?))
        .spawn()
        .map_err(|e| ConvertError::ToolFailed(format!("failed to run {}: {}", tool, e)))?;

    let status = match child.wait_timeout(timeout)? {
        Some(status) => status,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ConvertError::ToolTimeout {
                tool,
                secs: timeout.as_secs(),
            });
        }
    };

    let stdout = fs::read(stdout_file.path())?;
    if !status.success() {
        let stderr = fs::read(stderr_file.path())?;
        return Err(ConvertError::ToolFailed(format!(
            "{} exited with {}: {}",
            tool,
            status,
            String::from_utf8_lossy(&stderr).trim()
        )));
    }
    if stdout.is_empty() {
        return Err(ConvertError::ToolOutput(format!("{} produced no output", tool)));
    }

    Ok(stdout)
}
