use crate::error::{ConvertError, Result};
use std::fs::{self, File};
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

pub const PROVISIONING_PROFILE_NAME: &str = "embedded.mobileprovision";

/// True if `path` opens as a ZIP container (central directory readable).
pub fn is_zip_archive<P: AsRef<Path>>(path: P) -> bool {
    File::open(path.as_ref())
        .ok()
        .and_then(|f| ZipArchive::new(f).ok())
        .is_some()
}

pub fn open_archive<P: AsRef<Path>>(path: P) -> Result<ZipArchive<File>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ConvertError::FileNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    ZipArchive::new(file).map_err(|_| ConvertError::NotAnArchive(path.to_path_buf()))
}

/// Returns the `Payload/<Name>.app/` prefix of the first bundle in the
/// archive. Directory entries don't have to be present.
pub fn find_app_folder<R: Read + Seek>(archive: &ZipArchive<R>) -> Option<String> {
    archive.file_names().find_map(app_folder_of)
}

fn app_folder_of(name: &str) -> Option<String> {
    let mut parts = name.split('/');
    if parts.next()? != "Payload" {
        return None;
    }
    let bundle = parts.next()?;
    // Needs at least a trailing separator after the bundle name
    parts.next()?;
    if bundle.len() > ".app".len() && bundle.ends_with(".app") {
        Some(format!("Payload/{}/", bundle))
    } else {
        None
    }
}

/// Reads one entry fully, `None` if the archive has no such entry.
pub fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<Vec<u8>>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    // Declared entry size is untrusted
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(Some(buf))
}

/// The bundle's own provisioning profile, or the first nested one
/// (an extension's) when the top-level bundle has none.
pub fn find_provisioning_profile<R: Read + Seek>(
    archive: &ZipArchive<R>,
    app_folder: &str,
) -> Option<String> {
    let direct = format!("{}{}", app_folder, PROVISIONING_PROFILE_NAME);
    if archive.file_names().any(|n| n == direct) {
        return Some(direct);
    }
    archive
        .file_names()
        .find(|n| n.starts_with(app_folder) && n.ends_with(PROVISIONING_PROFILE_NAME))
        .map(str::to_string)
}

/// Extracts every file below `app_folder` into `dest`, keeping the archive
/// layout, and returns the path of the extracted bundle.
pub fn extract_bundle<R: Read + Seek, P: AsRef<Path>>(
    archive: &mut ZipArchive<R>,
    app_folder: &str,
    dest: P,
) -> Result<PathBuf> {
    let dest = dest.as_ref();
    let mut extracted = 0usize;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if !file.name().starts_with(app_folder) || file.is_dir() {
            continue;
        }

        let relative = file.enclosed_name().ok_or_else(|| {
            ConvertError::InvalidIpa(format!("unsafe entry path: {}", file.name()))
        })?;
        let outpath = dest.join(relative);

        if let Some(p) = outpath.parent() {
            if !p.exists() {
                fs::create_dir_all(p)?;
            }
        }
        let mut outfile = File::create(&outpath)?;
        std::io::copy(&mut file, &mut outfile)?;
        extracted += 1;

        // Preserve Unix permissions
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = file.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode))?;
            }
        }
    }

    if extracted == 0 {
        return Err(ConvertError::InvalidIpa(format!(
            "no files found under {}",
            app_folder
        )));
    }

    tracing::debug!(files = extracted, folder = app_folder, "extracted app bundle");
    Ok(dest.join(app_folder.trim_end_matches('/')))
}
