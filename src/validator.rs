//! File intake policy.
//!
//! Rules run in order: absent input is a silent no-op, then the extension
//! check, then the size check. A rejected file never reaches the network.

use crate::error::ValidationError;
use crate::state::{CandidateFile, SelectedFile};

/// Extensions the analysis service can extract text from.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "docx", "txt"];

/// Upload limit enforced by the service (10 MiB).
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Last dot-delimited segment of `name`, lowercased.
///
/// A name without a dot, or ending in one, has no extension.
pub fn file_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Validate a candidate file against type and size policy.
///
/// Returns `Ok(None)` when nothing was chosen (dialog cancelled, empty
/// drop), `Ok(Some(_))` with the file ready to become the selection.
pub fn validate(candidate: Option<&CandidateFile>) -> Result<Option<SelectedFile>, ValidationError> {
    let Some(candidate) = candidate else {
        return Ok(None);
    };

    let extension = file_extension(&candidate.name);
    let supported = extension
        .as_deref()
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext));
    if !supported {
        return Err(ValidationError::InvalidType { extension });
    }

    if candidate.byte_size > MAX_FILE_SIZE_BYTES {
        return Err(ValidationError::TooLarge {
            byte_size: candidate.byte_size,
        });
    }

    Ok(Some(SelectedFile {
        name: candidate.name.clone(),
        byte_size: candidate.byte_size,
        raw_content: candidate.content.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn candidate(name: &str, byte_size: u64) -> CandidateFile {
        CandidateFile {
            name: name.to_string(),
            byte_size,
            content: Vec::new(),
        }
    }

    #[test]
    fn test_absent_file_is_noop() {
        assert_eq!(validate(None), Ok(None));
    }

    #[test]
    fn test_extension_parsing() {
        assert_eq!(file_extension("report.PDF").as_deref(), Some("pdf"));
        assert_eq!(file_extension("archive.tar.txt").as_deref(), Some("txt"));
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension("trailing."), None);
    }

    #[test]
    fn test_size_boundary() {
        let exact = candidate("ledger.pdf", MAX_FILE_SIZE_BYTES);
        assert!(matches!(validate(Some(&exact)), Ok(Some(_))));

        let over = candidate("ledger.pdf", MAX_FILE_SIZE_BYTES + 1);
        assert_eq!(
            validate(Some(&over)),
            Err(ValidationError::TooLarge {
                byte_size: MAX_FILE_SIZE_BYTES + 1
            })
        );
    }

    #[test]
    fn test_type_checked_before_size() {
        let both_bad = candidate("movie.mp4", MAX_FILE_SIZE_BYTES * 4);
        assert!(matches!(
            validate(Some(&both_bad)),
            Err(ValidationError::InvalidType { .. })
        ));
    }

    #[test]
    fn test_accepted_file_keeps_content() {
        let file = CandidateFile {
            name: "Invoice.Docx".to_string(),
            byte_size: 3,
            content: b"abc".to_vec(),
        };
        let selected = validate(Some(&file)).unwrap().unwrap();
        assert_eq!(selected.name, "Invoice.Docx");
        assert_eq!(selected.byte_size, 3);
        assert_eq!(selected.raw_content, b"abc".to_vec());
    }

    proptest! {
        #[test]
        fn prop_unsupported_extensions_rejected(
            stem in "[a-z]{1,8}",
            ext in "[a-zA-Z]{1,5}",
            size in 0u64..=MAX_FILE_SIZE_BYTES,
        ) {
            prop_assume!(!SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            let file = candidate(&format!("{stem}.{ext}"), size);
            let rejected = matches!(validate(Some(&file)), Err(ValidationError::InvalidType { .. }));
            prop_assert!(rejected);
        }

        #[test]
        fn prop_supported_within_limit_accepted(
            stem in "[a-z]{1,8}",
            ext_idx in 0usize..3,
            upper in any::<bool>(),
            size in 0u64..=MAX_FILE_SIZE_BYTES,
        ) {
            let ext = SUPPORTED_EXTENSIONS[ext_idx];
            let ext = if upper { ext.to_ascii_uppercase() } else { ext.to_string() };
            let file = candidate(&format!("{stem}.{ext}"), size);
            prop_assert!(matches!(validate(Some(&file)), Ok(Some(_))));
        }
    }
}
