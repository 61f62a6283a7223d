//! Documents, signature files and ciphertext files on disk.
//!
//! A signature lives next to its document as `<document>.sig` and holds the
//! canonical hex form with no prefix and no trailing newline. Files written by
//! older tools with a `0x` prefix are still read.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::CryptoError;
use crate::cipher::Ciphertext;
use crate::signatures::Signature;

/// Suffix appended to a document path to name its signature file.
pub const SIGNATURE_SUFFIX: &str = ".sig";

/// Path of the signature file for `document`.
#[must_use]
pub fn signature_path(document: &Path) -> PathBuf {
    let mut name = OsString::from(document.as_os_str());
    name.push(SIGNATURE_SUFFIX);
    PathBuf::from(name)
}

/// Open a document for streaming.
///
/// # Errors
///
/// Returns [`CryptoError::DocumentNotFound`] if nothing exists at `path`, or
/// [`CryptoError::Io`] for any other failure.
pub fn open_document(path: &Path) -> Result<File, CryptoError> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CryptoError::DocumentNotFound(path.to_path_buf()),
        _ => CryptoError::io(path, e),
    })
}

/// Read a whole document into memory.
///
/// # Errors
///
/// Same as [`open_document`].
pub fn read_document(path: &Path) -> Result<Vec<u8>, CryptoError> {
    fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CryptoError::DocumentNotFound(path.to_path_buf()),
        _ => CryptoError::io(path, e),
    })
}

/// Write the signature for `document` and return the signature path.
///
/// # Errors
///
/// Returns [`CryptoError::Io`] if the file cannot be written.
pub fn write_signature(document: &Path, signature: &Signature) -> Result<PathBuf, CryptoError> {
    let path = signature_path(document);
    write_atomic(&path, signature.as_str().as_bytes())?;
    tracing::debug!(path = %path.display(), "signature written");
    Ok(path)
}

/// Read the signature stored next to `document`.
///
/// # Errors
///
/// - [`CryptoError::SignatureNotFound`] if there is no `.sig` file
/// - [`CryptoError::InvalidSignature`] if its contents are not a hex integer
/// - [`CryptoError::Io`] for any other read failure
pub fn read_signature(document: &Path) -> Result<Signature, CryptoError> {
    let path = signature_path(document);
    let text = fs::read_to_string(&path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CryptoError::SignatureNotFound(path.clone()),
        io::ErrorKind::InvalidData => {
            CryptoError::InvalidSignature("signature file is not UTF-8".into())
        }
        _ => CryptoError::io(&path, e),
    })?;
    Signature::from_hex(&text)
}

/// Save ciphertext as a single line.
///
/// # Errors
///
/// Returns [`CryptoError::Io`] if the file cannot be written.
pub fn write_ciphertext(path: &Path, ciphertext: &Ciphertext) -> Result<(), CryptoError> {
    write_atomic(path, ciphertext.as_str().as_bytes())?;
    tracing::debug!(path = %path.display(), "ciphertext written");
    Ok(())
}

/// Load ciphertext saved by [`write_ciphertext`].
///
/// # Errors
///
/// Returns [`CryptoError::DocumentNotFound`] if the file is missing,
/// [`CryptoError::InvalidEncoding`] if it is not UTF-8, or
/// [`CryptoError::Io`] otherwise.
pub fn read_ciphertext(path: &Path) -> Result<Ciphertext, CryptoError> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CryptoError::DocumentNotFound(path.to_path_buf()),
        io::ErrorKind::InvalidData => {
            CryptoError::InvalidEncoding("ciphertext file is not UTF-8".into())
        }
        _ => CryptoError::io(path, e),
    })?;
    Ok(Ciphertext::new(text))
}

/// Replace `path` with `contents` in one step.
///
/// The data goes to `<name>.tmp` in the same directory, is synced, then
/// renamed over `path`. Readers see either the old file or the new one.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), CryptoError> {
    let tmp_path = tmp_sibling(path)?;

    let result = File::create(&tmp_path)
        .and_then(|mut file| {
            file.write_all(contents)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp_path, path));

    if let Err(e) = result {
        match fs::remove_file(&tmp_path) {
            Err(cleanup) if cleanup.kind() != io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %tmp_path.display(),
                    error = %cleanup,
                    "failed to remove temporary file"
                );
            }
            _ => {}
        }
        return Err(CryptoError::io(path, e));
    }

    Ok(())
}

fn tmp_sibling(path: &Path) -> Result<PathBuf, CryptoError> {
    let Some(file_name) = path.file_name() else {
        return Err(CryptoError::io(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        ));
    };
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    Ok(path.with_file_name(tmp_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::signatures::SignatureEngine;
    use tempfile::TempDir;

    #[test]
    fn test_signature_path_appends_suffix() {
        assert_eq!(
            signature_path(Path::new("docs/report.txt")),
            PathBuf::from("docs/report.txt.sig")
        );
        assert_eq!(signature_path(Path::new("README")), PathBuf::from("README.sig"));
    }

    #[test]
    fn test_signature_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let document = dir.path().join("report.txt");
        fs::write(&document, b"hello").unwrap();

        let signature = SignatureEngine::sha256().sign(b"hello", 42);
        let written = write_signature(&document, &signature).unwrap();

        assert_eq!(written, dir.path().join("report.txt.sig"));
        let raw = fs::read_to_string(&written).unwrap();
        assert_eq!(raw, signature.as_str());
        assert!(!raw.ends_with('\n'));
        assert_eq!(read_signature(&document).unwrap(), signature);
        assert!(!dir.path().join("report.txt.sig.tmp").exists());
    }

    #[test]
    fn test_reads_prefixed_signature_file() {
        let dir = TempDir::new().unwrap();
        let document = dir.path().join("hello.txt");
        fs::write(&document, b"hello").unwrap();
        fs::write(
            signature_path(&document),
            "0x2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b980e",
        )
        .unwrap();

        let signature = read_signature(&document).unwrap();
        let content = read_document(&document).unwrap();
        assert!(SignatureEngine::sha256().verify(&content, &signature, 42));
    }

    #[test]
    fn test_missing_files() {
        let dir = TempDir::new().unwrap();
        let document = dir.path().join("absent.txt");

        let err = read_document(&document).unwrap_err();
        assert!(matches!(err, CryptoError::DocumentNotFound(_)));
        assert_eq!(err.kind(), ErrorKind::Storage);

        assert!(matches!(
            read_signature(&document),
            Err(CryptoError::SignatureNotFound(_))
        ));
        assert!(matches!(open_document(&document), Err(CryptoError::DocumentNotFound(_))));
    }

    #[test]
    fn test_garbage_signature_file() {
        let dir = TempDir::new().unwrap();
        let document = dir.path().join("doc");
        fs::write(signature_path(&document), "not a signature").unwrap();

        let err = read_signature(&document).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_non_utf8_artifacts_are_decode_errors() {
        let dir = TempDir::new().unwrap();
        let document = dir.path().join("doc");
        fs::write(signature_path(&document), [0xff, 0xfe]).unwrap();

        let err = read_signature(&document).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidSignature(_)));
        assert_eq!(err.kind(), ErrorKind::Decode);

        let message_file = dir.path().join("email.txt");
        fs::write(&message_file, [0xff, 0xfe]).unwrap();

        let err = read_ciphertext(&message_file).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidEncoding(_)));
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_ciphertext_file_trims() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("email.txt");

        write_ciphertext(&path, &Ciphertext::new("aGVsbG8=")).unwrap();
        assert_eq!(read_ciphertext(&path).unwrap().as_str(), "aGVsbG8=");

        fs::write(&path, "  aGVsbG8=\n").unwrap();
        assert_eq!(read_ciphertext(&path).unwrap().as_str(), "aGVsbG8=");
    }

    #[test]
    fn test_write_atomic_into_missing_directory_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("file.txt");

        let err = write_atomic(&path, b"data").unwrap_err();
        assert!(matches!(err, CryptoError::Io { .. }));
        assert!(!path.exists());
    }
}
