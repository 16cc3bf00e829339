use crate::config::FetchSettings;
use crate::converter::PermissionAnalyzer;
use crate::error::{ConvertError, Result};
use crate::inspector::PackageInspector;
use crate::ipa;
use crate::model::PermissionResult;
use crate::report::Reporter;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::io::Write;
use tempfile::NamedTempFile;

const ARCHIVE_CONTENT_TYPES: [&str; 2] = ["application/octet-stream", "application/zip"];

/// Downloads an IPA into a temp file and hands it to the inspector.
pub struct ArchiveFetcher<'a> {
    client: Client,
    inspector: &'a dyn PackageInspector,
    reporter: &'a dyn Reporter,
}

impl<'a> ArchiveFetcher<'a> {
    pub fn new(
        settings: &FetchSettings,
        inspector: &'a dyn PackageInspector,
        reporter: &'a dyn Reporter,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            inspector,
            reporter,
        })
    }

    /// Any failure yields an empty result. The downloaded file is gone by
    /// the time this returns.
    pub fn download_and_analyze(&self, url: &str) -> PermissionResult {
        self.reporter.info(&format!("analyzing IPA: {}", url));

        let mut temp = match tempfile::Builder::new()
            .prefix("altconv-")
            .suffix(".ipa")
            .tempfile()
        {
            Ok(temp) => temp,
            Err(e) => {
                self.reporter
                    .fail(&format!("could not create temporary file: {}", e));
                return PermissionResult::default();
            }
        };

        let result = self.fetch_into(url, &mut temp).unwrap_or_else(|e| {
            self.report_failure(url, &e);
            PermissionResult::default()
        });

        match temp.close() {
            Ok(()) => self.reporter.info("cleaned up temporary file"),
            Err(e) => self
                .reporter
                .warn(&format!("could not delete temp file: {}", e)),
        }

        result
    }

    fn fetch_into(&self, url: &str, temp: &mut NamedTempFile) -> Result<PermissionResult> {
        self.reporter.info("downloading IPA...");
        let mut response = self.client.get(url).send()?.error_for_status()?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !ARCHIVE_CONTENT_TYPES.iter().any(|t| content_type.contains(t)) {
            self.reporter
                .warn(&format!("unexpected content type: {}", content_type));
        }

        let written = response.copy_to(temp.as_file_mut())?;
        temp.as_file_mut().flush()?;
        self.reporter.info(&format!("downloaded {} bytes", written));

        if !ipa::is_zip_archive(temp.path()) {
            self.reporter
                .fail("downloaded file is not a valid ZIP/IPA file");
            return Ok(PermissionResult::default());
        }

        self.reporter.info("analyzing IPA contents...");
        let permissions = self.inspector.inspect_package(temp.path());
        self.reporter.info(&format!(
            "analysis complete, found {} permissions",
            permissions.total()
        ));
        Ok(permissions)
    }

    fn report_failure(&self, url: &str, e: &ConvertError) {
        let message = match e {
            ConvertError::Http(err) if err.is_timeout() => "download timed out".to_string(),
            ConvertError::Http(err) if err.is_connect() => "connection error".to_string(),
            ConvertError::Http(err) if err.is_status() => format!("HTTP error: {}", err),
            other => format!("error analyzing IPA {}: {}", url, other),
        };
        self.reporter.fail(&message);
    }
}

impl PermissionAnalyzer for ArchiveFetcher<'_> {
    fn analyze(&self, download_url: &str) -> PermissionResult {
        self.download_and_analyze(download_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspector::ArchiveInspector;
    use crate::report::{MemoryReporter, Severity};
    use crate::sign::SigningInspector;
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use zip::write::SimpleFileOptions;

    struct StaticSigning(Vec<&'static str>);

    impl SigningInspector for StaticSigning {
        fn inspect_signing(&self, _bundle_path: &Path) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|k| k.to_string()).collect())
        }

        fn decode_provisioning(&self, _profile_path: &Path) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    /// Remembers where the download landed and what it looked like then.
    #[derive(Default)]
    struct RecordingInspector {
        seen: RefCell<Vec<(PathBuf, bool)>>,
    }

    impl PackageInspector for RecordingInspector {
        fn inspect_package(&self, ipa_path: &Path) -> PermissionResult {
            self.seen
                .borrow_mut()
                .push((ipa_path.to_path_buf(), ipa::is_zip_archive(ipa_path)));
            let mut result = PermissionResult::default();
            result.entitlements.insert("get-task-allow".into());
            result
        }
    }

    fn ipa_bytes() -> Vec<u8> {
        let mut dict = plist::Dictionary::new();
        dict.insert(
            "NSCameraUsageDescription".into(),
            plist::Value::String("Take photos".into()),
        );
        let mut manifest = Vec::new();
        plist::to_writer_xml(&mut manifest, &dict).expect("plist");

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("Payload/Demo.app/Info.plist", SimpleFileOptions::default())
            .expect("start");
        zip.write_all(&manifest).expect("write");
        zip.finish().expect("finish").into_inner()
    }

    fn settings(timeout: Duration) -> FetchSettings {
        FetchSettings {
            timeout,
            ..FetchSettings::default()
        }
    }

    #[test]
    fn downloads_with_mobile_user_agent_and_inspects() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/apps/demo.ipa")
                .header("user-agent", crate::config::MOBILE_USER_AGENT);
            then.status(200)
                .header("content-type", "application/octet-stream")
                .body(ipa_bytes());
        });

        let signing = StaticSigning(vec!["get-task-allow", "com.example.unknown"]);
        let reporter = MemoryReporter::new();
        let inspector = ArchiveInspector::new(&signing, &reporter);
        let fetcher = ArchiveFetcher::new(&settings(Duration::from_secs(10)), &inspector, &reporter)
            .expect("client");

        let result = fetcher.download_and_analyze(&server.url("/apps/demo.ipa"));

        mock.assert_calls(1);
        assert_eq!(result.privacy["NSCameraUsageDescription"], "Take photos");
        assert_eq!(
            result.entitlements.iter().collect::<Vec<_>>(),
            vec!["get-task-allow"]
        );
        assert!(reporter.contains("found 2 permissions"));
        assert!(reporter.contains("cleaned up temporary file"));
        assert!(reporter.messages(Severity::Warning).is_empty());
    }

    #[test]
    fn downloaded_file_is_removed_after_inspection() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/demo.ipa");
            then.status(200)
                .header("content-type", "application/zip")
                .body(ipa_bytes());
        });

        let inspector = RecordingInspector::default();
        let reporter = MemoryReporter::new();
        let fetcher = ArchiveFetcher::new(&settings(Duration::from_secs(10)), &inspector, &reporter)
            .expect("client");

        let result = fetcher.download_and_analyze(&server.url("/demo.ipa"));
        assert!(result.entitlements.contains("get-task-allow"));

        let seen = inspector.seen.borrow();
        assert_eq!(seen.len(), 1);
        let (path, was_zip) = &seen[0];
        assert!(*was_zip);
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("ipa"));
        assert!(!path.exists());
    }

    #[test]
    fn non_archive_body_yields_empty_result() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/login");
            then.status(200)
                .header("content-type", "text/html")
                .body("<html>sign in</html>");
        });

        let signing = StaticSigning(vec!["get-task-allow"]);
        let reporter = MemoryReporter::new();
        let inspector = ArchiveInspector::new(&signing, &reporter);
        let fetcher = ArchiveFetcher::new(&settings(Duration::from_secs(10)), &inspector, &reporter)
            .expect("client");

        let result = fetcher.download_and_analyze(&server.url("/login"));
        assert!(result.is_empty());
        assert!(reporter.contains("unexpected content type: text/html"));
        assert!(reporter.contains("not a valid ZIP/IPA file"));
        assert!(reporter.contains("cleaned up temporary file"));
    }

    #[test]
    fn http_status_connection_and_timeout_failures_are_distinguished() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing.ipa");
            then.status(404);
        });
        server.mock(|when, then| {
            when.method(GET).path("/slow.ipa");
            then.status(200)
                .delay(Duration::from_millis(1500))
                .body(ipa_bytes());
        });

        let signing = StaticSigning(vec!["get-task-allow"]);
        let reporter = MemoryReporter::new();
        let inspector = ArchiveInspector::new(&signing, &reporter);
        let fetcher =
            ArchiveFetcher::new(&settings(Duration::from_millis(300)), &inspector, &reporter)
                .expect("client");

        assert!(fetcher
            .download_and_analyze(&server.url("/missing.ipa"))
            .is_empty());
        assert!(reporter
            .messages(Severity::Failure)
            .iter()
            .any(|m| m.starts_with("HTTP error:")));

        assert!(fetcher
            .download_and_analyze(&server.url("/slow.ipa"))
            .is_empty());
        assert!(reporter.contains("download timed out"));

        assert!(fetcher
            .download_and_analyze("http://127.0.0.1:1/unreachable.ipa")
            .is_empty());
        assert!(reporter.contains("connection error"));
    }
}
