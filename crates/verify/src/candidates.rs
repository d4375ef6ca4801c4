//! Candidate executable extraction from package archives

use serde::Deserialize;
use smrv_errors::{ArchiveError, Error};
use smrv_types::{ArchiveEntry, CandidatePolicy};
use std::io::{Cursor, Read};
use std::path::{Component, Path};
use zip::result::ZipError;
use zip::ZipArchive;

/// Manifest listing the objects a package ships
pub const MANIFEST_PATH: &str = "data.json";

#[derive(Deserialize)]
struct Manifest {
    objects: Vec<ManifestObject>,
}

#[derive(Deserialize)]
struct ManifestObject {
    #[serde(rename = "type")]
    object_type: String,
    #[serde(default)]
    path: Option<String>,
}

/// A selected entry that was not extracted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: String,
}

/// Outcome of candidate selection for one archive
#[derive(Debug, Default)]
pub struct Extraction {
    /// Candidates in selection order
    pub entries: Vec<ArchiveEntry>,
    /// Selected but absent or unreadable; these count as safe
    pub skipped: Vec<SkippedEntry>,
}

impl Extraction {
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.path.clone()).collect()
    }
}

/// Select and read the candidate executables of a zip archive
///
/// Blocking; run it on the blocking pool.
///
/// # Errors
///
/// Returns `ArchiveError::InvalidArchive` if `bytes` is not a zip archive,
/// `ArchiveError::ManifestMissing` or `ArchiveError::InvalidManifest` if the
/// manifest policy cannot read `data.json`, and `ArchiveError::UnsafePath` if
/// a selected path leaves the package root.
pub fn extract_candidates(bytes: &[u8], policy: &CandidatePolicy) -> Result<Extraction, Error> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| ArchiveError::InvalidArchive {
            message: e.to_string(),
        })?;

    match policy {
        CandidatePolicy::Manifest { .. } => by_manifest(&mut archive, policy),
        CandidatePolicy::Extension { .. } => by_extension(&mut archive, policy),
    }
}

fn by_manifest(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    policy: &CandidatePolicy,
) -> Result<Extraction, Error> {
    let mut extraction = Extraction::default();

    let raw = match read_entry(archive, MANIFEST_PATH) {
        Ok(raw) => raw,
        Err(ZipError::FileNotFound) => {
            return Err(ArchiveError::ManifestMissing {
                path: MANIFEST_PATH.to_string(),
            }
            .into())
        }
        Err(e) => return Err(invalid_manifest(e.to_string())),
    };
    let manifest: Manifest =
        serde_json::from_slice(&raw).map_err(|e| invalid_manifest(e.to_string()))?;

    for (index, object) in manifest.objects.into_iter().enumerate() {
        if !policy.accepts_type(&object.object_type) {
            continue;
        }
        let Some(path) = object.path else {
            extraction.skipped.push(SkippedEntry {
                path: format!("#{index}"),
                reason: format!("`{}` object has no path", object.object_type),
            });
            continue;
        };
        ensure_enclosed(&path)?;

        match read_entry(archive, &path) {
            Ok(content) => extraction.entries.push(ArchiveEntry::new(path, content)),
            Err(e) => extraction.skipped.push(SkippedEntry {
                reason: skip_reason(&e),
                path,
            }),
        }
    }

    Ok(extraction)
}

fn by_extension(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    policy: &CandidatePolicy,
) -> Result<Extraction, Error> {
    let mut extraction = Extraction::default();

    for index in 0..archive.len() {
        let mut file = match archive.by_index(index) {
            Ok(file) => file,
            Err(e) => {
                extraction.skipped.push(SkippedEntry {
                    path: format!("#{index}"),
                    reason: skip_reason(&e),
                });
                continue;
            }
        };
        if file.is_dir() || !policy.accepts_path(file.name()) {
            continue;
        }

        let path = file.name().to_string();
        if file.enclosed_name().is_none() {
            return Err(ArchiveError::UnsafePath { path }.into());
        }
        let mut content = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
        match file.read_to_end(&mut content) {
            Ok(_) => extraction.entries.push(ArchiveEntry::new(path, content)),
            Err(e) => extraction.skipped.push(SkippedEntry {
                path,
                reason: format!("unreadable: {e}"),
            }),
        }
    }

    Ok(extraction)
}

/// Reject paths that are absolute or climb out of the archive root
fn ensure_enclosed(path: &str) -> Result<(), Error> {
    let enclosed = !path.is_empty()
        && !path.contains('\0')
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

    if enclosed {
        Ok(())
    } else {
        Err(ArchiveError::UnsafePath {
            path: path.to_string(),
        }
        .into())
    }
}

fn read_entry(archive: &mut ZipArchive<Cursor<&[u8]>>, path: &str) -> Result<Vec<u8>, ZipError> {
    let mut file = archive.by_name(path)?;
    let mut content = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
    file.read_to_end(&mut content)?;
    Ok(content)
}

fn skip_reason(error: &ZipError) -> String {
    match error {
        ZipError::FileNotFound => "not present in archive".to_string(),
        other => format!("unreadable: {other}"),
    }
}

fn invalid_manifest(message: String) -> Error {
    ArchiveError::InvalidManifest {
        path: MANIFEST_PATH.to_string(),
        message,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn zip_of(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in files {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn manifest(objects: &[(&str, &str)]) -> Vec<u8> {
        let objects: Vec<_> = objects
            .iter()
            .map(|(t, p)| serde_json::json!({ "type": t, "path": p }))
            .collect();
        serde_json::to_vec(&serde_json::json!({ "objects": objects })).unwrap()
    }

    #[test]
    fn test_manifest_selects_code_objects() {
        let data = manifest(&[
            ("sml_mod", "Win64/Mod.dll"),
            ("pak", "Content/Mod.pak"),
            ("core_mod", "Win64/Core.dll"),
        ]);
        let archive = zip_of(&[
            (MANIFEST_PATH, &data),
            ("Win64/Mod.dll", b"MZ-mod"),
            ("Content/Mod.pak", b"pak"),
            ("Win64/Core.dll", b"MZ-core"),
        ]);

        let extraction = extract_candidates(&archive, &CandidatePolicy::default()).unwrap();

        assert_eq!(extraction.paths(), ["Win64/Mod.dll", "Win64/Core.dll"]);
        assert_eq!(extraction.entries[0].content, b"MZ-mod");
        assert!(extraction.skipped.is_empty());
    }

    #[test]
    fn test_missing_manifest_is_an_error() {
        let archive = zip_of(&[("Binaries/Win64/Evil.dll", b"MZ-evil")]);

        let error = extract_candidates(&archive, &CandidatePolicy::default()).unwrap_err();

        assert!(matches!(
            error,
            Error::Archive(ArchiveError::ManifestMissing { .. })
        ));
    }

    #[test]
    fn test_manifest_path_outside_root_is_rejected() {
        for evil in ["../../../../../tmp/escape.dll", "/etc/escape.dll", "Win64/../../x.dll"] {
            let data = manifest(&[("sml_mod", evil)]);
            let archive = zip_of(&[(MANIFEST_PATH, &data), ("Win64/Mod.dll", b"MZ")]);

            let error = extract_candidates(&archive, &CandidatePolicy::default()).unwrap_err();

            assert!(
                matches!(error, Error::Archive(ArchiveError::UnsafePath { ref path }) if path == evil),
                "{evil}: {error:?}"
            );
        }
    }

    #[test]
    fn test_extension_entry_outside_root_is_rejected() {
        let archive = zip_of(&[("../Mod.dll", b"MZ")]);
        let policy = CandidatePolicy::Extension {
            extensions: vec!["dll".into()],
        };

        let error = extract_candidates(&archive, &policy).unwrap_err();

        assert!(matches!(
            error,
            Error::Archive(ArchiveError::UnsafePath { .. })
        ));
    }

    #[test]
    fn test_object_without_path_is_skipped_by_index() {
        let data = serde_json::to_vec(&serde_json::json!({
            "objects": [
                { "type": "pak", "path": "Content/Mod.pak" },
                { "type": "sml_mod" },
            ]
        }))
        .unwrap();
        let archive = zip_of(&[(MANIFEST_PATH, &data)]);

        let extraction = extract_candidates(&archive, &CandidatePolicy::default()).unwrap();

        assert!(extraction.entries.is_empty());
        assert_eq!(extraction.skipped[0].path, "#1");
    }

    #[test]
    fn test_absent_entry_is_skipped() {
        let data = manifest(&[("sml_mod", "Win64/Gone.dll"), ("sml_mod", "Win64/Mod.dll")]);
        let archive = zip_of(&[(MANIFEST_PATH, &data), ("Win64/Mod.dll", b"MZ")]);

        let extraction = extract_candidates(&archive, &CandidatePolicy::default()).unwrap();

        assert_eq!(extraction.paths(), ["Win64/Mod.dll"]);
        assert_eq!(extraction.skipped.len(), 1);
        assert_eq!(extraction.skipped[0].path, "Win64/Gone.dll");
    }

    #[test]
    fn test_malformed_manifest_is_an_error() {
        for data in [&b"{ not json"[..], &br#"{"files": []}"#[..]] {
            let archive = zip_of(&[(MANIFEST_PATH, data)]);
            let error = extract_candidates(&archive, &CandidatePolicy::default()).unwrap_err();
            assert!(matches!(
                error,
                Error::Archive(ArchiveError::InvalidManifest { .. })
            ));
        }
    }

    #[test]
    fn test_not_a_zip() {
        let error = extract_candidates(b"<html>502</html>", &CandidatePolicy::default()).unwrap_err();
        assert!(matches!(
            error,
            Error::Archive(ArchiveError::InvalidArchive { .. })
        ));
    }

    #[test]
    fn test_extension_policy() {
        let archive = zip_of(&[
            ("Binaries/Win64/Mod.DLL", b"MZ"),
            ("Binaries/Linux/libMod.so", b"ELF"),
            ("Content/Mod.pak", b"pak"),
            (MANIFEST_PATH, b"{ not even json"),
        ]);
        let policy = CandidatePolicy::Extension {
            extensions: vec!["dll".into(), "so".into()],
        };

        let extraction = extract_candidates(&archive, &policy).unwrap();

        assert_eq!(
            extraction.paths(),
            ["Binaries/Win64/Mod.DLL", "Binaries/Linux/libMod.so"]
        );
    }
}
