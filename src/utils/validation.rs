use crate::domain::location::{split_inputs, Location};
use crate::utils::error::{RunnerError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Accepted schemes per location role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationRole {
    Input,
    ReferenceDatabase,
    OutputFolder,
}

pub fn validate_location(field_name: &str, value: &str, role: LocationRole) -> Result<Location> {
    let location = Location::parse(value).map_err(|e| RunnerError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })?;

    let allowed = match (&location, role) {
        (_, LocationRole::Input) => true,
        (Location::Local(_) | Location::S3 { .. }, _) => true,
        _ => false,
    };

    if !allowed {
        return Err(RunnerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Only local paths and s3:// are supported here".to_string(),
        });
    }

    if role == LocationRole::Input {
        location
            .sample_name()
            .map_err(|e| RunnerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: value.to_string(),
                reason: e.to_string(),
            })?;
    }

    Ok(location)
}

pub fn validate_inputs(field_name: &str, value: &str) -> Result<Vec<Location>> {
    let inputs = split_inputs(value);
    if inputs.is_empty() {
        return Err(RunnerError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    inputs
        .iter()
        .map(|input| validate_location(field_name, input, LocationRole::Input))
        .collect()
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(RunnerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(RunnerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(RunnerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RunnerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_location_roles() {
        assert!(validate_location("input", "sra://SRR100", LocationRole::Input).is_ok());
        assert!(validate_location("input", "ftp://host/x.fq", LocationRole::Input).is_ok());
        assert!(validate_location("ref_db", "s3://b/db", LocationRole::ReferenceDatabase).is_ok());
        assert!(validate_location("ref_db", "/refs/db", LocationRole::ReferenceDatabase).is_ok());
        assert!(validate_location("ref_db", "sra://SRR1", LocationRole::ReferenceDatabase).is_err());
        assert!(validate_location("output_folder", "ftp://h/x", LocationRole::OutputFolder).is_err());
    }

    #[test]
    fn test_input_must_name_a_file() {
        for value in ["s3://bucket/reads/", "s3://bucket", "https://host/"] {
            match validate_location("input", value, LocationRole::Input) {
                Err(RunnerError::InvalidConfigValueError { field, reason, .. }) => {
                    assert_eq!(field, "input");
                    assert!(reason.contains("not a folder"));
                }
                other => panic!("unexpected result for {}: {:?}", value, other),
            }
        }
        // 資料夾形式的資料庫與輸出位置仍然有效
        assert!(validate_location("ref_db", "s3://bucket", LocationRole::ReferenceDatabase).is_ok());
        assert!(validate_location("output_folder", "s3://bucket/out/", LocationRole::OutputFolder).is_ok());
    }

    #[test]
    fn test_validate_inputs() {
        let inputs = validate_inputs("input", "sra://SRR1,s3://bucket/a.fq").unwrap();
        assert_eq!(inputs.len(), 2);

        assert!(matches!(
            validate_inputs("input", " , "),
            Err(RunnerError::MissingConfigError { .. })
        ));
        assert!(validate_inputs("input", "sra://SRR1,gs://b/k").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("threads", 4, 1).is_ok());
        assert!(validate_positive_number("threads", 0, 1).is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("temp_folder", "/share").is_ok());
        assert!(validate_path("temp_folder", "").is_err());
        assert!(validate_path("temp_folder", "a\0b").is_err());
    }
}
