/// Represents an issue found while validating a composed weaver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// A hard error: some intercepted call is guaranteed to fail.
    Error(String),
    /// A warning: the configuration works but is probably not what was meant.
    Warning(String),
}

/// The result of a pre-flight validation pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.issues.push(ValidationIssue::Error(msg.into()));
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.issues.push(ValidationIssue::Warning(msg.into()));
    }

    pub fn is_safe(&self) -> bool {
        !self.issues.iter().any(|i| matches!(i, ValidationIssue::Error(_)))
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| matches!(i, ValidationIssue::Warning(_)))
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.issues.iter().filter_map(|i| match i {
            ValidationIssue::Error(msg) => Some(msg.as_str()),
            ValidationIssue::Warning(_) => None,
        })
    }

    pub fn print_summary(&self) {
        if self.is_safe() && !self.has_warnings() {
            println!("✅ Aspect validation passed: every trigger resolves to an aspect.");
            return;
        }

        for issue in &self.issues {
            match issue {
                ValidationIssue::Error(msg) => println!("❌ Error: {}", msg),
                ValidationIssue::Warning(msg) => println!("⚠️ Warning: {}", msg),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_is_safe() {
        let result = ValidationResult::new();
        assert!(result.is_safe());
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_warnings_do_not_make_result_unsafe() {
        let mut result = ValidationResult::new();
        result.add_warning("careful");
        assert!(result.is_safe());
        assert!(result.has_warnings());
    }

    #[test]
    fn test_errors_make_result_unsafe() {
        let mut result = ValidationResult::new();
        result.add_warning("careful");
        result.add_error("broken");
        assert!(!result.is_safe());
        assert_eq!(result.errors().collect::<Vec<_>>(), vec!["broken"]);
    }
}
