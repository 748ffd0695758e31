//! Centralized validation and helper functions.

/// Maximum number of nodes allowed in a single contact graph.
///
/// Graphs are stored densely and the matcher allocates several
/// `(n1 + 1) x (n2 + 1)` matrices, so memory grows quadratically.
pub const MAX_NODES: usize = 10_000;

/// Check if a declared node count exceeds the maximum allowed.
///
/// Returns an error message if it does, None if the count is acceptable.
#[must_use]
pub fn check_node_limit(count: usize) -> Option<String> {
    if count > MAX_NODES {
        Some(format!(
            "Too many nodes: {count} exceeds maximum of {MAX_NODES}"
        ))
    } else {
        None
    }
}

/// Parameter validation error types
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    #[error("Failed to read parameter file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse parameter file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Require a finite, strictly positive value.
///
/// # Errors
///
/// Returns `ParamsError::InvalidValue` naming the parameter otherwise.
pub fn require_positive(name: &'static str, value: f64) -> Result<(), ParamsError> {
    if !value.is_finite() {
        return Err(ParamsError::InvalidValue {
            name,
            reason: format!("{value} is not finite"),
        });
    }
    if value <= 0.0 {
        return Err(ParamsError::InvalidValue {
            name,
            reason: format!("{value} must be greater than 0"),
        });
    }
    Ok(())
}

/// Require `value > bound`.
///
/// # Errors
///
/// Returns `ParamsError::InvalidValue` naming the parameter otherwise.
pub fn require_greater(
    name: &'static str,
    value: f64,
    bound_name: &str,
    bound: f64,
) -> Result<(), ParamsError> {
    if value.is_finite() && value > bound {
        Ok(())
    } else {
        Err(ParamsError::InvalidValue {
            name,
            reason: format!("{value} must be greater than {bound_name} ({bound})"),
        })
    }
}

/// Require an iteration count of at least one.
///
/// # Errors
///
/// Returns `ParamsError::InvalidValue` naming the parameter otherwise.
pub fn require_iterations(name: &'static str, value: usize) -> Result<(), ParamsError> {
    if value == 0 {
        Err(ParamsError::InvalidValue {
            name,
            reason: "must be at least 1".to_string(),
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_limit() {
        assert!(check_node_limit(0).is_none());
        assert!(check_node_limit(MAX_NODES).is_none());
        assert!(check_node_limit(MAX_NODES + 1).is_some());
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive("b0", 0.5).is_ok());
        assert!(require_positive("b0", 0.0).is_err());
        assert!(require_positive("b0", -1.0).is_err());
        assert!(require_positive("b0", f64::NAN).is_err());
        assert!(require_positive("b0", f64::INFINITY).is_err());
    }

    #[test]
    fn test_require_greater() {
        assert!(require_greater("br", 1.075, "1", 1.0).is_ok());
        assert!(require_greater("br", 1.0, "1", 1.0).is_err());
        assert!(require_greater("bf", f64::INFINITY, "b0", 0.5).is_err());
    }

    #[test]
    fn test_require_iterations() {
        assert!(require_iterations("i0", 1).is_ok());
        let err = require_iterations("i0", 0).unwrap_err();
        assert!(err.to_string().contains("i0"));
    }
}
