use crate::constants::forms::{PASSWORD_MIN_CHARS, USERNAME_MAX_CHARS, USERNAME_MIN_CHARS};

const REQUIRED: &str = "This field is required.";

/// Per-field messages collected while checking a submitted form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors {
    errors: Vec<(&'static str, String)>,
}

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push((field, message.into()));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |(f, _)| *f == field)
            .map(|(_, msg)| msg.as_str())
    }
}

fn required(errors: &mut FormErrors, field: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, REQUIRED);
        return false;
    }
    true
}

fn length(errors: &mut FormErrors, field: &'static str, value: &str, min: usize, max: Option<usize>) {
    let len = value.chars().count();
    match max {
        Some(max) if len < min || len > max => errors.add(
            field,
            format!("Field must be between {min} and {max} characters long."),
        ),
        None if len < min => {
            errors.add(field, format!("Field must be at least {min} characters long."));
        }
        _ => {}
    }
}

fn username(errors: &mut FormErrors, value: &str) {
    if required(errors, "username", value) {
        length(
            errors,
            "username",
            value,
            USERNAME_MIN_CHARS,
            Some(USERNAME_MAX_CHARS),
        );
    }
}

pub fn validate_registration(username_value: &str, password: &str) -> FormErrors {
    let mut errors = FormErrors::default();
    username(&mut errors, username_value);
    if required(&mut errors, "password", password) {
        length(&mut errors, "password", password, PASSWORD_MIN_CHARS, None);
    }
    errors
}

pub fn validate_login(username_value: &str, password: &str) -> FormErrors {
    let mut errors = FormErrors::default();
    required(&mut errors, "username", username_value);
    required(&mut errors, "password", password);
    errors
}

pub fn validate_profile(username_value: &str) -> FormErrors {
    let mut errors = FormErrors::default();
    username(&mut errors, username_value);
    errors
}

/// Only same-site absolute paths are honoured as post-login targets.
#[must_use]
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_registration() {
        assert!(validate_registration("alice", "secret1").is_empty());

        let errors = validate_registration("bob", "secret1");
        assert_eq!(
            errors.for_field("username").collect::<Vec<_>>(),
            vec!["Field must be between 4 and 150 characters long."]
        );

        let errors = validate_registration("alice", "short");
        assert_eq!(
            errors.for_field("password").collect::<Vec<_>>(),
            vec!["Field must be at least 6 characters long."]
        );

        let errors = validate_registration("", "");
        assert_eq!(errors.for_field("username").count(), 1);
        assert_eq!(errors.for_field("password").next(), Some(REQUIRED));

        assert!(!validate_registration(&"a".repeat(151), "secret1").is_empty());
        assert!(validate_registration(&"a".repeat(150), "secret1").is_empty());
    }

    #[test]
    fn test_username_length_counts_chars() {
        assert!(validate_profile("żółw").is_empty());
        assert!(!validate_profile("żół").is_empty());
    }

    #[test]
    fn test_validate_login() {
        assert!(validate_login("al", "x").is_empty());
        assert!(!validate_login("   ", "x").is_empty());
        assert!(!validate_login("alice", "").is_empty());
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/accounts")), Some("/accounts"));
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(Some("https://evil.example")), None);
        assert_eq!(safe_next(Some("/\\evil")), None);
        assert_eq!(safe_next(None), None);
    }
}
