//! Schema-based form validation.
//!
//! All storefront forms (new card, profile, image upload) run through the
//! same declarative layer: a [`Schema`] lists per-field rules, validation
//! checks every field without aborting early, and failures come back as a
//! [`FieldErrors`] map keyed by field name so templates can render the
//! message inline next to the input.
//!
//! Rules are deliberately shallow. Card fields only check presence; CPF and
//! card-number digit validity is the backend's problem.

use std::collections::BTreeMap;

use quitanda_core::Email;

/// A validation rule applied to one field.
#[derive(Debug, Clone, Copy)]
enum Rule {
    /// Field must be present and non-blank.
    Required,
    /// Field must parse as a structurally valid email (implies required).
    Email,
}

/// One field of a schema: name, rule, and the message shown on failure.
#[derive(Debug, Clone)]
struct Field {
    name: &'static str,
    rule: Rule,
    message: &'static str,
}

/// A declarative set of field rules.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Start an empty schema.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// The named field must be present and non-blank.
    #[must_use]
    pub fn required(mut self, name: &'static str, message: &'static str) -> Self {
        self.fields.push(Field {
            name,
            rule: Rule::Required,
            message,
        });
        self
    }

    /// The named field must be a structurally valid email address.
    #[must_use]
    pub fn email(mut self, name: &'static str, message: &'static str) -> Self {
        self.fields.push(Field {
            name,
            rule: Rule::Email,
            message,
        });
        self
    }

    /// Check every rule against the submitted values.
    ///
    /// All fields are checked (no early abort) so the user sees every
    /// problem at once; only the first failing rule per field is reported.
    ///
    /// # Errors
    ///
    /// Returns the field-scoped error messages when any rule fails.
    pub fn validate(&self, values: &FormValues) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();

        for field in &self.fields {
            if errors.get(field.name).is_some() {
                continue;
            }

            let value = values.get(field.name).map(str::trim).unwrap_or_default();

            let ok = match field.rule {
                Rule::Required => !value.is_empty(),
                Rule::Email => Email::parse(value).is_ok(),
            };

            if !ok {
                errors.insert(field.name, field.message);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Submitted form values, keyed by field name.
#[derive(Debug, Clone, Default)]
pub struct FormValues(BTreeMap<&'static str, String>);

impl FormValues {
    /// Start an empty value set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add a field value.
    #[must_use]
    pub fn with(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.0.insert(name, value.into());
        self
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

/// Field-scoped validation errors, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, &'static str>);

impl FieldErrors {
    /// The error message for a field, if any. Templates call this to render
    /// inline messages.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'static str> {
        self.0.get(name).copied()
    }

    /// Whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn insert(&mut self, name: &'static str, message: &'static str) {
        self.0.insert(name, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_schema() -> Schema {
        Schema::new()
            .required("nickname", "Card nickname is required")
            .required("owner", "Name on card is required")
            .required("card_number", "Card number is required")
            .required("valid_thru", "Card expiry date is required")
            .required("cvv", "Card CVV is required")
            .required("cpf_client", "Card holder CPF is required")
    }

    #[test]
    fn test_all_fields_present_passes() {
        let values = FormValues::new()
            .with("nickname", "Nubank")
            .with("owner", "GUILHERME ILLESCAS")
            .with("card_number", "5162-3062-1937-8829")
            .with("valid_thru", "01/25")
            .with("cvv", "123")
            .with("cpf_client", "123.456.789-00");

        assert!(card_schema().validate(&values).is_ok());
    }

    #[test]
    fn test_missing_fields_all_reported() {
        // No early abort: every failing field gets its message.
        let values = FormValues::new().with("nickname", "Nubank");

        let errors = card_schema().validate(&values).expect_err("should fail");
        assert!(errors.get("nickname").is_none());
        assert_eq!(errors.get("owner"), Some("Name on card is required"));
        assert_eq!(errors.get("cvv"), Some("Card CVV is required"));
        assert_eq!(errors.get("cpf_client"), Some("Card holder CPF is required"));
    }

    #[test]
    fn test_blank_counts_as_missing() {
        let values = FormValues::new().with("nickname", "   ");
        let errors = Schema::new()
            .required("nickname", "Card nickname is required")
            .validate(&values)
            .expect_err("should fail");
        assert_eq!(errors.get("nickname"), Some("Card nickname is required"));
    }

    #[test]
    fn test_email_rule() {
        let schema = Schema::new().email("email", "Please enter a valid e-mail");

        let ok = FormValues::new().with("email", "gui@example.com");
        assert!(schema.validate(&ok).is_ok());

        let bad = FormValues::new().with("email", "not-an-email");
        let errors = schema.validate(&bad).expect_err("should fail");
        assert_eq!(errors.get("email"), Some("Please enter a valid e-mail"));

        // Email rule implies required
        let empty = FormValues::new();
        assert!(schema.validate(&empty).is_err());
    }

    #[test]
    fn test_profile_save_requires_password() {
        let schema = Schema::new()
            .required("first_name", "First name is required")
            .required("last_name", "Last name is required")
            .email("email", "Please enter a valid e-mail")
            .required("password", "Password is required");

        // Edit mode never submits without the password present.
        let values = FormValues::new()
            .with("first_name", "Guilherme")
            .with("last_name", "Illescas")
            .with("email", "gui@example.com");

        let errors = schema.validate(&values).expect_err("should fail");
        assert_eq!(errors.get("password"), Some("Password is required"));

        let with_password = values.with("password", "hunter2");
        assert!(schema.validate(&with_password).is_ok());
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let schema = Schema::new()
            .required("email", "E-mail is required")
            .email("email", "Please enter a valid e-mail");

        let errors = schema
            .validate(&FormValues::new())
            .expect_err("should fail");
        assert_eq!(errors.get("email"), Some("E-mail is required"));
    }
}
