use crate::utils::error::{Result, TrackError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(TrackError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(TrackError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(TrackError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(TrackError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(TrackError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// 必填欄位：缺少或只有空白都算缺少
pub fn validate_required_field<'a>(field_name: &str, value: &'a Option<String>) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(TrackError::MissingConfigError {
            field: field_name.to_string(),
        }),
    }
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(TrackError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("POSTNL_BASE_URL", "https://api-sandbox.postnl.nl").is_ok());
        assert!(validate_url("POSTNL_BASE_URL", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("POSTNL_BASE_URL", "").is_err());
        assert!(validate_url("POSTNL_BASE_URL", "invalid-url").is_err());
        assert!(validate_url("POSTNL_BASE_URL", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("3SDEVC1234567".to_string());
        let blank = Some("   ".to_string());
        assert_eq!(
            validate_required_field("POSTNL_REFERENCE", &present).unwrap(),
            "3SDEVC1234567"
        );
        assert!(matches!(
            validate_required_field("POSTNL_REFERENCE", &blank),
            Err(TrackError::MissingConfigError { .. })
        ));
        assert!(validate_required_field("POSTNL_REFERENCE", &None).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("max_attempts", 1u32, 1, 10).is_ok());
        assert!(validate_range("max_attempts", 0u32, 1, 10).is_err());
        assert!(validate_range("max_attempts", 11u32, 1, 10).is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("artifacts_dir", "artifacts").is_ok());
        assert!(validate_path("artifacts_dir", "").is_err());
        assert!(validate_path("artifacts_dir", "bad\0path").is_err());
    }
}
