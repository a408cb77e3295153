use std::fmt;
use std::path::PathBuf;

/// A file the user dropped or selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFile {
    pub path: PathBuf,
    pub name: String,
    /// `None` when the size could not be read from disk.
    pub size: Option<u64>,
}

impl DroppedFile {
    pub fn new(path: impl Into<PathBuf>, size: Option<u64>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { path, name, size }
    }
}

/// Client-side pre-check applied before anything is sent. Not a security
/// boundary; the server validates again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Lower-case extensions including the leading dot.
    pub allowed_extensions: Vec<String>,
    pub max_file_bytes: u64,
    pub max_files: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_extensions: vec![".ts".to_string(), ".mp4".to_string(), ".mkv".to_string()],
            max_file_bytes: 18_432 * 1024 * 1024,
            max_files: 6,
        }
    }
}

impl UploadPolicy {
    pub fn accepts_extension(&self, name: &str) -> bool {
        let Some(dot) = name.rfind('.') else {
            return false;
        };
        let extension = name[dot..].to_ascii_lowercase();
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    UnsupportedType,
    TooLarge { size: u64, max: u64 },
    TooManyFiles { max: usize },
    Unreadable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub name: String,
    pub reason: RejectReason,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            RejectReason::UnsupportedType => {
                write!(f, "File {} has an unsupported type", self.name)
            }
            RejectReason::TooLarge { size, max } => write!(
                f,
                "File {} is too large ({}, max {})",
                self.name,
                format_size(*size),
                format_size(*max)
            ),
            RejectReason::TooManyFiles { max } => {
                write!(f, "File {} exceeds the limit of {max} files per upload", self.name)
            }
            RejectReason::Unreadable => write!(f, "File {} could not be read", self.name),
        }
    }
}

/// Splits a drop into files to upload and files to reject, preserving order.
pub fn validate_drop(
    policy: &UploadPolicy,
    files: Vec<DroppedFile>,
) -> (Vec<DroppedFile>, Vec<Rejection>) {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for file in files {
        let reason = match file.size {
            _ if !policy.accepts_extension(&file.name) => Some(RejectReason::UnsupportedType),
            None => Some(RejectReason::Unreadable),
            Some(size) if size > policy.max_file_bytes => Some(RejectReason::TooLarge {
                size,
                max: policy.max_file_bytes,
            }),
            Some(_) if accepted.len() >= policy.max_files => Some(RejectReason::TooManyFiles {
                max: policy.max_files,
            }),
            Some(_) => None,
        };
        match reason {
            Some(reason) => rejected.push(Rejection {
                name: file.name,
                reason,
            }),
            None => accepted.push(file),
        }
    }

    (accepted, rejected)
}

/// Human-readable size with binary units, e.g. `1.5 GB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{} {unit}", trim_decimals(value));
        }
        value /= 1024.0;
    }
    format!("{} TB", trim_decimals(value))
}

fn trim_decimals(value: f64) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dropped(name: &str, size: Option<u64>) -> DroppedFile {
        DroppedFile::new(format!("/media/{name}"), size)
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let policy = UploadPolicy::default();
        assert!(policy.accepts_extension("movie.MKV"));
        assert!(policy.accepts_extension("clip.ts"));
        assert!(!policy.accepts_extension("notes.txt"));
        assert!(!policy.accepts_extension("mkv"));
    }

    #[test]
    fn drop_is_split_by_reason() {
        let policy = UploadPolicy {
            max_file_bytes: 100,
            max_files: 2,
            ..UploadPolicy::default()
        };
        let files = vec![
            dropped("a.mp4", Some(10)),
            dropped("b.avi", Some(10)),
            dropped("c.mkv", Some(101)),
            dropped("d.mkv", None),
            dropped("e.ts", Some(5)),
            dropped("f.ts", Some(5)),
        ];

        let (accepted, rejected) = validate_drop(&policy, files);

        let names: Vec<_> = accepted.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.mp4", "e.ts"]);
        let reasons: Vec<_> = rejected.iter().map(|r| r.reason.clone()).collect();
        assert_eq!(
            reasons,
            vec![
                RejectReason::UnsupportedType,
                RejectReason::TooLarge { size: 101, max: 100 },
                RejectReason::Unreadable,
                RejectReason::TooManyFiles { max: 2 },
            ]
        );
    }

    #[test]
    fn sizes_use_binary_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(18_432 * 1024 * 1024), "18 GB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024 * 1024), "3 TB");
    }
}
