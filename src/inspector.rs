//! Permission extraction from a local IPA.
//!
//! Each stage (manifest, code signature, provisioning profile) contributes
//! independently; a failing stage contributes nothing and the others still run.

use crate::error::{ConvertError, Result};
use crate::ipa;
use crate::model::PermissionResult;
use crate::permissions::{entitlement_label, privacy_fallback};
use crate::plist_ext::PlistDocument;
use crate::report::Reporter;
use crate::sign::SigningInspector;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::ZipArchive;

/// Reads the permissions a local archive declares.
pub trait PackageInspector {
    fn inspect_package(&self, ipa_path: &Path) -> PermissionResult;
}

pub struct ArchiveInspector<'a> {
    signing: &'a dyn SigningInspector,
    reporter: &'a dyn Reporter,
    scratch_root: Option<PathBuf>,
}

impl<'a> ArchiveInspector<'a> {
    pub fn new(signing: &'a dyn SigningInspector, reporter: &'a dyn Reporter) -> Self {
        Self {
            signing,
            reporter,
            scratch_root: None,
        }
    }

    /// Extracts bundles below `root` instead of the system temp directory.
    pub fn with_scratch_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// Never fails: anything that goes wrong leaves the affected half empty.
    pub fn inspect<P: AsRef<Path>>(&self, ipa_path: P) -> PermissionResult {
        match self.try_inspect(ipa_path.as_ref()) {
            Ok(result) => result,
            Err(e) => {
                self.reporter.warn(&format!("error analyzing IPA file: {}", e));
                PermissionResult::default()
            }
        }
    }

    fn try_inspect(&self, ipa_path: &Path) -> Result<PermissionResult> {
        let mut archive = ipa::open_archive(ipa_path)?;

        let Some(app_folder) = ipa::find_app_folder(&archive) else {
            self.reporter.warn("no app bundle found in IPA");
            return Ok(PermissionResult::default());
        };
        self.reporter.info(&format!("found app bundle: {}", app_folder));

        let privacy = self.privacy_permissions(&mut archive, &app_folder);
        let entitlements = self.entitlements(&mut archive, &app_folder);

        Ok(PermissionResult { entitlements, privacy })
    }

    fn privacy_permissions(
        &self,
        archive: &mut ZipArchive<File>,
        app_folder: &str,
    ) -> BTreeMap<String, String> {
        let mut privacy = BTreeMap::new();
        let manifest_path = format!("{}Info.plist", app_folder);

        let manifest = match ipa::read_entry(archive, &manifest_path) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                self.reporter.warn("Info.plist not found in expected location");
                return privacy;
            }
            Err(e) => {
                self.reporter.warn(&format!("error reading Info.plist: {}", e));
                return privacy;
            }
        };

        let doc = match PlistDocument::from_bytes(&manifest) {
            Ok(doc) => doc,
            Err(e) => {
                self.reporter.warn(&format!("error reading Info.plist: {}", e));
                return privacy;
            }
        };

        collect_privacy(&doc, &mut privacy, self.reporter);
        self.reporter
            .info(&format!("total privacy permissions found: {}", privacy.len()));
        privacy
    }

    /// Extracts the bundle to a scoped directory, then asks the signing tools.
    /// The directory is removed when this returns.
    fn entitlements(&self, archive: &mut ZipArchive<File>, app_folder: &str) -> BTreeSet<String> {
        let mut found = BTreeSet::new();

        let tmpdir = match self.scratch_dir() {
            Ok(dir) => dir,
            Err(e) => {
                self.reporter
                    .warn(&format!("could not create extraction directory: {}", e));
                return found;
            }
        };
        let app_path = match ipa::extract_bundle(archive, app_folder, tmpdir.path()) {
            Ok(path) => path,
            Err(e) => {
                self.reporter
                    .warn(&format!("could not extract app bundle: {}", e));
                return found;
            }
        };

        self.reporter.info(&format!(
            "using codesign on extracted app bundle: {}",
            app_path.display()
        ));
        match self.signing.inspect_signing(&app_path) {
            Ok(keys) => {
                let count = self.merge_known(&mut found, keys, "codesign");
                self.reporter
                    .info(&format!("total entitlements found with codesign: {}", count));
            }
            Err(e) => self.reporter.warn(&describe_tool_error("codesign", &e)),
        }

        if let Some(profile) = ipa::find_provisioning_profile(archive, app_folder) {
            let profile_path = tmpdir.path().join(&profile);
            if profile_path.is_file() {
                self.reporter.info(&format!(
                    "using security tool on provisioning profile: {}",
                    profile
                ));
                match self.signing.decode_provisioning(&profile_path) {
                    Ok(keys) => {
                        let count =
                            self.merge_known(&mut found, keys, "provisioning profile");
                        self.reporter.info(&format!(
                            "total entitlements found with security tool: {}",
                            count
                        ));
                    }
                    Err(e) => self.reporter.warn(&describe_tool_error("security tool", &e)),
                }
            }
        }

        found
    }

    fn scratch_dir(&self) -> std::io::Result<TempDir> {
        match &self.scratch_root {
            Some(root) => TempDir::new_in(root),
            None => TempDir::new(),
        }
    }

    /// Adds recognized keys to `found` and returns how many were recognized.
    fn merge_known(&self, found: &mut BTreeSet<String>, keys: Vec<String>, source: &str) -> usize {
        let mut recognized = 0;
        for key in keys {
            let Some(label) = entitlement_label(&key) else {
                continue;
            };
            recognized += 1;
            self.reporter.info(&format!(
                "found entitlement ({}): {} ({})",
                source, key, label
            ));
            found.insert(key);
        }
        recognized
    }
}

impl PackageInspector for ArchiveInspector<'_> {
    fn inspect_package(&self, ipa_path: &Path) -> PermissionResult {
        self.inspect(ipa_path)
    }
}

fn collect_privacy(
    doc: &PlistDocument,
    privacy: &mut BTreeMap<String, String>,
    reporter: &dyn Reporter,
) {
    for key in doc.keys() {
        let Some(fallback) = privacy_fallback(key) else {
            continue;
        };
        match doc.non_blank_string(key) {
            Some(description) => {
                reporter.info(&format!("found privacy permission: {} (app description)", key));
                privacy.insert(key.to_string(), description.to_string());
            }
            None => {
                reporter.info(&format!(
                    "found privacy permission: {} (default description)",
                    key
                ));
                privacy.insert(key.to_string(), fallback.to_string());
            }
        }
    }
}

fn describe_tool_error(tool: &str, e: &ConvertError) -> String {
    match e {
        ConvertError::ToolTimeout { .. } => format!("{} timed out", tool),
        ConvertError::ToolOutput(msg) => format!("could not parse {} output: {}", tool, msg),
        other => format!("{} failed: {}", tool, other),
    }
}
