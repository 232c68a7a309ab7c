use crate::{MAX_KIND_NAME_LEN, MAX_PARAM_NAME_LEN, error::DefinitionError};

/// Validate a parameter identifier: `[A-Za-z0-9_]`, non-empty, bounded.
pub fn validate_param_name(name: &str) -> Result<(), DefinitionError> {
    validate_ident(name, MAX_PARAM_NAME_LEN)
}

/// Validate a node-kind identifier with the same charset as parameters.
pub fn validate_kind_name(name: &str) -> Result<(), DefinitionError> {
    validate_ident(name, MAX_KIND_NAME_LEN)
}

fn validate_ident(name: &str, max_len: usize) -> Result<(), DefinitionError> {
    if name.is_empty() {
        return Err(invalid(name, "identifier is empty"));
    }
    if name.len() > max_len {
        return Err(invalid(
            name,
            format!("identifier exceeds {max_len} characters"),
        ));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid(
            name,
            "identifiers may only contain ASCII letters, digits, and underscores",
        ));
    }

    Ok(())
}

fn invalid(name: &str, reason: impl Into<String>) -> DefinitionError {
    DefinitionError::InvalidName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_kind_name, validate_param_name};

    #[test]
    fn accepts_underscored_alphanumerics() {
        assert!(validate_param_name("flux_group_1").is_ok());
        assert!(validate_kind_name("assembly").is_ok());
    }

    #[test]
    fn rejects_empty_and_oversized() {
        assert!(validate_param_name("").is_err());
        assert!(validate_param_name(&"p".repeat(65)).is_err());
        assert!(validate_param_name(&"p".repeat(64)).is_ok());
    }

    #[test]
    fn rejects_punctuation_and_whitespace() {
        for name in ["axial-mesh", "flux group", "power.total", "flüx"] {
            assert!(validate_param_name(name).is_err(), "{name}");
        }
    }
}
