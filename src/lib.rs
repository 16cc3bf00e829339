pub mod catalog;
pub mod config;
pub mod converter;
pub mod error;
pub mod fetcher;
pub mod inspector;
pub mod ipa;
pub mod model;
pub mod permissions;
pub mod plist_ext;
pub mod report;
pub mod sign;

pub use catalog::{BatchSummary, CatalogConverter, ConversionSummary};
pub use config::{ConvertOptions, FetchSettings, ToolSettings};
pub use converter::{PermissionAnalyzer, SchemaConverter};
pub use error::{ConvertError, Result};
pub use fetcher::ArchiveFetcher;
pub use inspector::{ArchiveInspector, PackageInspector};
pub use model::{AppPermissions, Catalog, ConvertedApp, PermissionResult, SourceApp};
pub use plist_ext::PlistDocument;
pub use report::{ConsoleReporter, MemoryReporter, Reporter, Severity};
pub use sign::{SigningInspector, SystemSigningTools};
