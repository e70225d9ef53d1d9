use thiserror::Error;

/// Errors raised by the viewer core.
///
/// Compile and link failures are logged and the affected program is skipped.
/// Everything else is returned to the caller.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("shader stage `{label}` failed to compile: {log}")]
    CompileFailure { label: String, log: String },

    #[error("program `{label}` failed to link: {log}")]
    LinkFailure { label: String, log: String },

    #[error("failed to allocate {what}: {reason}")]
    ResourceExhaustion { what: String, reason: String },

    #[error("invalid geometry `{label}`: {reason}")]
    InvalidGeometry { label: String, reason: String },

    #[error("surface error: {0}")]
    Surface(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("mesh import failed: {0}")]
    Mesh(String),
}

impl ViewerError {
    pub fn exhausted(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResourceExhaustion {
            what: what.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_geometry(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            label: label.into(),
            reason: reason.into(),
        }
    }
}

pub type ViewerResult<T> = std::result::Result<T, ViewerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_and_allocation_errors_read_differently() {
        let invalid = ViewerError::invalid_geometry("cube", "attribute 0 has 0 components");
        assert_eq!(
            invalid.to_string(),
            "invalid geometry `cube`: attribute 0 has 0 components"
        );
        let exhausted = ViewerError::exhausted("buffer `cube.attr0`", "out of memory");
        assert_eq!(
            exhausted.to_string(),
            "failed to allocate buffer `cube.attr0`: out of memory"
        );
    }

    #[test]
    fn messages_carry_the_label() {
        let err = ViewerError::LinkFailure {
            label: "axis".into(),
            log: "missing output".into(),
        };
        assert_eq!(
            err.to_string(),
            "program `axis` failed to link: missing output"
        );
    }
}
