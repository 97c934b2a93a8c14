// converse-cli/src/rendering.rs
use colored::*;
use converse_core::{ConverseError, ErrorCategory, list_json_files};
use std::path::Path;

const RULE_WIDTH: usize = 60;

pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

pub fn print_banner(payload_file: &Path) {
    println!("{}", "Bedrock Converse API Caller".cyan().bold());
    println!("{}: {}", "Payload file".cyan(), payload_file.display());
    println!("{}", rule());
}

/// Detail lines shown under the error headline. A missing payload file also
/// lists the JSON files that do exist in `cwd`.
pub fn error_details(err: &ConverseError, cwd: &Path) -> Vec<String> {
    let mut lines = vec![err.to_string()];
    match err {
        ConverseError::PayloadNotFound { .. } => {
            lines.push(format!("Current directory: {}", cwd.display()));
            lines.push("Available JSON files:".to_string());
            let files = list_json_files(cwd);
            if files.is_empty() {
                lines.push("   - No JSON files found in current directory".to_string());
            } else {
                lines.extend(files.into_iter().map(|f| format!("   - {}", f)));
            }
        }
        _ if err.category() == ErrorCategory::Credentials => {
            lines.push(
                "Check AWS_BEARER_TOKEN_BEDROCK or the AWS credentials in the environment, .env, \
                 or the active profile in ~/.aws/config."
                    .to_string(),
            );
        }
        _ => {}
    }
    lines
}

pub fn print_converse_error(err: &ConverseError, cwd: &Path) {
    let mut details = error_details(err, cwd).into_iter();
    if let Some(first) = details.next() {
        eprintln!("{} {}", format!("{}:", err.category()).red().bold(), first);
    }
    for line in details {
        eprintln!("{}", line.dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_not_found_lists_json_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("other.json"), "{}").unwrap();
        let err = ConverseError::PayloadNotFound {
            path: PathBuf::from("payload.json"),
        };
        let lines = error_details(&err, dir.path());
        assert_eq!(lines[0], "Payload file 'payload.json' not found");
        assert!(lines.iter().any(|l| l == "   - other.json"));
    }

    #[test]
    fn test_not_found_without_json_files() {
        let dir = tempdir().unwrap();
        let err = ConverseError::PayloadNotFound {
            path: PathBuf::from("payload.json"),
        };
        let lines = error_details(&err, dir.path());
        assert_eq!(
            lines.last().map(String::as_str),
            Some("   - No JSON files found in current directory")
        );
    }

    #[test]
    fn test_other_errors_have_single_line() {
        let err = ConverseError::EmptyMessages {
            path: PathBuf::from("p.json"),
        };
        assert_eq!(error_details(&err, Path::new(".")).len(), 1);
    }

    #[test]
    fn test_rejected_credentials_get_a_hint() {
        let err = ConverseError::Service(converse_core::ServiceError {
            kind: converse_core::ServiceErrorKind::Authentication,
            status: 403,
            code: Some("MissingAuthenticationTokenException".to_string()),
            message: "Missing Authentication Token".to_string(),
        });
        let lines = error_details(&err, Path::new("."));
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("AWS_BEARER_TOKEN_BEDROCK"));
    }
}
