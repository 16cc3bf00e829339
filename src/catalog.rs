//! Whole-file and whole-directory conversion.

use crate::config::{BATCH_OUTPUT_PREFIX, DEFAULT_SOURCE_IDENTIFIER, DEFAULT_SOURCE_URL_BASE};
use crate::converter::SchemaConverter;
use crate::error::{ConvertError, Result};
use crate::model::{Catalog, SourceApp};
use crate::report::Reporter;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

const RULE: &str = "============================================================";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub converted: usize,
    pub skipped: usize,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub files_converted: Vec<ConversionSummary>,
    pub files_failed: Vec<PathBuf>,
}

pub struct CatalogConverter<'a> {
    converter: SchemaConverter<'a>,
    reporter: &'a dyn Reporter,
}

impl<'a> CatalogConverter<'a> {
    pub fn new(converter: SchemaConverter<'a>, reporter: &'a dyn Reporter) -> Self {
        Self {
            converter,
            reporter,
        }
    }

    /// Converts every app record of `catalog` in place and returns
    /// `(converted, skipped)`. A record that fails to parse or lacks identity
    /// fields is counted as skipped.
    pub fn convert_catalog(&self, catalog: &mut Catalog) -> Result<(usize, usize)> {
        let records = catalog.take_apps()?;
        let total = records.len();
        let mut apps = Vec::with_capacity(total);
        let mut skipped = 0;

        for (i, raw) in records.into_iter().enumerate() {
            let app_name = raw
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("Unknown")
                .to_string();
            self.reporter.info(RULE);
            self.reporter
                .info(&format!("processing app {}/{}: {}", i + 1, total, app_name));

            let converted = serde_json::from_value::<SourceApp>(raw)
                .map(|source| self.converter.convert_app(&source))
                .and_then(|app| app.map(serde_json::to_value).transpose());
            match converted {
                Ok(Some(app)) => {
                    apps.push(app);
                    self.reporter
                        .info(&format!("successfully converted: {}", app_name));
                }
                Ok(None) => {
                    skipped += 1;
                    self.reporter
                        .notice(&format!("skipped incomplete app: {}", app_name));
                }
                Err(e) => {
                    skipped += 1;
                    self.reporter
                        .fail(&format!("error converting app {}: {}", app_name, e));
                }
            }
        }

        let converted = apps.len();
        catalog.set_apps(apps);
        Ok((converted, skipped))
    }

    /// Reads `input`, converts it and writes the result to `output`.
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<ConversionSummary> {
        let input = input.as_ref();
        let output = output.as_ref();

        if !input.is_file() {
            return Err(ConvertError::FileNotFound(input.to_path_buf()));
        }
        self.reporter
            .info(&format!("converting {} to AltStore format...", input.display()));

        let raw = fs::read_to_string(input)?;
        let mut catalog: Catalog = serde_json::from_str(&raw)?;

        let (converted, skipped) = self.convert_catalog(&mut catalog)?;
        backfill_source_fields(&mut catalog, output);
        write_catalog(&catalog, output)?;

        let summary = ConversionSummary {
            converted,
            skipped,
            output: output.to_path_buf(),
        };
        self.reporter.info(RULE);
        self.reporter.info("conversion complete");
        self.reporter
            .info(&format!("successfully converted: {} apps", summary.converted));
        self.reporter.info(&format!("skipped: {} apps", summary.skipped));
        self.reporter
            .info(&format!("output saved to: {}", output.display()));
        Ok(summary)
    }

    /// Converts every `*.json` directly inside `input_dir` into
    /// `output_dir/converted_<name>`. A failing file doesn't stop the batch.
    pub fn convert_directory<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: Q,
    ) -> Result<BatchSummary> {
        let input_dir = input_dir.as_ref();
        let output_dir = output_dir.as_ref();

        if !input_dir.is_dir() {
            return Err(ConvertError::FileNotFound(input_dir.to_path_buf()));
        }
        fs::create_dir_all(output_dir)?;

        let pattern = format!(
            "{}/*.json",
            glob::Pattern::escape(&input_dir.to_string_lossy())
        );
        let mut inputs = Vec::new();
        for entry in glob::glob(&pattern)? {
            match entry {
                Ok(path) if path.is_file() => inputs.push(path),
                Ok(_) => {}
                Err(e) => self.reporter.warn(&format!("cannot read {}", e)),
            }
        }
        inputs.sort();

        let mut batch = BatchSummary::default();
        for input in inputs {
            let Some(file_name) = input.file_name() else {
                continue;
            };
            let output = output_dir.join(batch_output_name(&file_name.to_string_lossy()));

            self.reporter.info(RULE);
            self.reporter
                .info(&format!("converting {}", file_name.to_string_lossy()));

            match self.convert_file(&input, &output) {
                Ok(summary) => batch.files_converted.push(summary),
                Err(e) => {
                    self.reporter.fail(&format!(
                        "error converting {}: {}",
                        file_name.to_string_lossy(),
                        e
                    ));
                    batch.files_failed.push(input);
                }
            }
        }

        self.reporter.info(&format!(
            "batch complete: {} files converted, {} failed",
            batch.files_converted.len(),
            batch.files_failed.len()
        ));
        Ok(batch)
    }
}

pub fn batch_output_name(file_name: &str) -> String {
    format!("{}{}", BATCH_OUTPUT_PREFIX, file_name)
}

/// Adds `identifier` and `sourceURL` after the existing keys when the input
/// lacked them. Keys that are present are never touched.
pub fn backfill_source_fields(catalog: &mut Catalog, output: &Path) {
    if !catalog.contains("identifier") {
        catalog.insert_str("identifier", DEFAULT_SOURCE_IDENTIFIER.to_string());
    }
    if !catalog.contains("sourceURL") {
        let file_name = output
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        catalog.insert_str(
            "sourceURL",
            format!("{}/{}", DEFAULT_SOURCE_URL_BASE, file_name),
        );
    }
}

/// Two-space indented JSON; non-ASCII is written as-is.
pub fn write_catalog(catalog: &Catalog, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(catalog)?;
    fs::write(output, json)?;
    Ok(())
}
