use std::collections::BTreeMap;

use serde::Serialize;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
pub const INVALID_IMAGE: &str = "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
pub const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const PASSWORD_TOO_SHORT: &str =
    "This password is too short. It must contain at least 8 characters.";

pub const USERNAME_MAX_LEN: usize = 150;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const GROUP_TITLE_MAX_LEN: usize = 200;

/// Field-level validation errors, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `Ok(value)` when no error was recorded.
    pub fn finish<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// Trims the value and records `REQUIRED` if nothing is left.
pub fn required_text(errors: &mut FormErrors, field: &str, value: Option<&str>) -> String {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    }
    value.to_string()
}

pub fn validate_username(errors: &mut FormErrors, username: &str) {
    if username.is_empty() {
        errors.add("username", REQUIRED);
        return;
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if username.chars().count() > USERNAME_MAX_LEN || !username.chars().all(allowed) {
        errors.add("username", INVALID_USERNAME);
    }
}

pub fn validate_email(errors: &mut FormErrors, email: &str) {
    if email.is_empty() {
        errors.add("email", REQUIRED);
        return;
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if !valid || email.chars().any(char::is_whitespace) {
        errors.add("email", INVALID_EMAIL);
    }
}

pub fn validate_password(errors: &mut FormErrors, password: &str) {
    if password.is_empty() {
        errors.add("password", REQUIRED);
    } else if password.chars().count() < PASSWORD_MIN_LEN {
        errors.add("password", PASSWORD_TOO_SHORT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_required() {
        let mut errors = FormErrors::new();
        let text = required_text(&mut errors, "text", Some("   "));
        assert!(text.is_empty());
        assert_eq!(errors.field("text"), [REQUIRED.to_string()]);

        let mut errors = FormErrors::new();
        required_text(&mut errors, "text", None);
        assert_eq!(errors.field("text").len(), 1);
    }

    #[test]
    fn text_is_trimmed() {
        let mut errors = FormErrors::new();
        assert_eq!(required_text(&mut errors, "text", Some("  hi \n")), "hi");
        assert!(errors.is_empty());
    }

    #[test]
    fn usernames_follow_the_allowed_alphabet() {
        let mut errors = FormErrors::new();
        validate_username(&mut errors, "bender.rodriguez+1@planet_express");
        assert!(errors.is_empty());

        validate_username(&mut errors, "bender rodriguez");
        assert_eq!(errors.field("username"), [INVALID_USERNAME.to_string()]);
    }

    #[test]
    fn email_and_password_rules() {
        let mut errors = FormErrors::new();
        validate_email(&mut errors, "bender@robot.com");
        validate_password(&mut errors, "antiquing");
        assert!(errors.is_empty());

        validate_email(&mut errors, "bender-at-robot");
        validate_password(&mut errors, "12345");
        assert_eq!(errors.field("email"), [INVALID_EMAIL.to_string()]);
        assert_eq!(errors.field("password"), [PASSWORD_TOO_SHORT.to_string()]);
    }

    #[test]
    fn finish_returns_errors_when_any_were_recorded() {
        let mut errors = FormErrors::new();
        errors.add("group", INVALID_CHOICE);
        let result = errors.finish(());
        assert_eq!(
            result.unwrap_err().field("group"),
            [INVALID_CHOICE.to_string()]
        );
    }
}
