//! Input validation for auth requests.
//!
//! Validation is data-driven: each field carries an ordered list of
//! (predicate, message) checks. Evaluation reports the first failing check
//! per field and always inspects every field, so the client receives the
//! full set of problems in one round trip. Pure functions, no side effects.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    /// Names are alphabetic only. Deliberately strict: no spaces, digits,
    /// or punctuation.
    static ref NAME_REGEX: Regex = Regex::new(r"^[A-Za-z]+$").unwrap();

    /// Pragmatic email syntax check.
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
}

/// A single validation check: predicate plus the message reported on failure.
type Check = (fn(&str) -> bool, &'static str);

fn is_present(value: &str) -> bool {
    !value.is_empty()
}

fn at_least_3_chars(value: &str) -> bool {
    value.chars().count() >= 3
}

fn at_most_50_chars(value: &str) -> bool {
    value.chars().count() <= 50
}

fn alphabetic_only(value: &str) -> bool {
    NAME_REGEX.is_match(value)
}

fn valid_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

fn at_least_8_chars(value: &str) -> bool {
    value.chars().count() >= 8
}

/// Strength predicate: at least one lowercase, uppercase, digit, and symbol.
fn strong_password(value: &str) -> bool {
    let has_lowercase = value.chars().any(|c| c.is_lowercase());
    let has_uppercase = value.chars().any(|c| c.is_uppercase());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    let has_symbol = value.chars().any(|c| !c.is_alphanumeric());
    has_lowercase && has_uppercase && has_digit && has_symbol
}

static FIRSTNAME_CHECKS: &[Check] = &[
    (is_present, "First name is required"),
    (at_least_3_chars, "First name must be at least 3 characters"),
    (at_most_50_chars, "First name cannot exceed 50 characters"),
    (alphabetic_only, "First name must contain only alphabets"),
];

static LASTNAME_CHECKS: &[Check] = &[
    (is_present, "Last name is required"),
    (at_least_3_chars, "Last name must be at least 3 characters"),
    (at_most_50_chars, "Last name cannot exceed 50 characters"),
    (alphabetic_only, "Last name must contain only alphabets"),
];

static EMAIL_CHECKS: &[Check] = &[
    (is_present, "Email is required"),
    (valid_email, "Please provide a valid email address"),
];

static PASSWORD_CHECKS: &[Check] = &[
    (is_present, "Password is required"),
    (at_least_8_chars, "Password must be at least 8 characters long"),
    (
        strong_password,
        "Password must contain uppercase, lowercase, numbers, and special characters",
    ),
];

/// Login re-checks shape only, not strength.
static LOGIN_PASSWORD_CHECKS: &[Check] = &[
    (is_present, "Password is required"),
    (at_least_8_chars, "Password must be at least 8 characters long"),
];

/// Run each field through its checks; the first failing check per field is
/// reported.
fn apply_rules(fields: &[(&'static str, &str, &[Check])]) -> HashMap<String, String> {
    let mut errors = HashMap::new();
    for (field, value, checks) in fields {
        for (check, message) in checks.iter() {
            if !check(value) {
                errors.insert(field.to_string(), message.to_string());
                break;
            }
        }
    }
    errors
}

/// Validate a registration payload. Returns an empty map when valid.
pub fn validate_registration(
    firstname: &str,
    lastname: &str,
    email: &str,
    password: &str,
) -> HashMap<String, String> {
    apply_rules(&[
        ("firstname", firstname, FIRSTNAME_CHECKS),
        ("lastname", lastname, LASTNAME_CHECKS),
        ("email", email, EMAIL_CHECKS),
        ("password", password, PASSWORD_CHECKS),
    ])
}

/// Validate a login payload. Returns an empty map when valid.
pub fn validate_login(email: &str, password: &str) -> HashMap<String, String> {
    apply_rules(&[
        ("email", email, EMAIL_CHECKS),
        ("password", password, LOGIN_PASSWORD_CHECKS),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_registration_errors(firstname: &str) -> HashMap<String, String> {
        validate_registration(firstname, "Smith", "alice@example.com", "Str0ng!pass")
    }

    #[test]
    fn test_valid_registration_passes() {
        let errors = validate_registration("Alice", "Smith", "alice@example.com", "Str0ng!pass");
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }

    #[test]
    fn test_names_accept_alphabetic_3_to_50() {
        for name in ["Abc", "Alice", &"A".repeat(50)] {
            assert!(valid_registration_errors(name).is_empty(), "rejected {}", name);
        }
    }

    #[test]
    fn test_names_reject_digits_spaces_symbols() {
        for name in ["Al1ce", "Alice Smith", "Al-ice", "O'Brien", "Anne_Marie"] {
            let errors = valid_registration_errors(name);
            assert_eq!(
                errors.get("firstname").map(String::as_str),
                Some("First name must contain only alphabets"),
                "case: {}",
                name
            );
        }
    }

    #[test]
    fn test_name_length_bounds() {
        let errors = valid_registration_errors("Jo");
        assert_eq!(
            errors["firstname"],
            "First name must be at least 3 characters"
        );

        let long = "A".repeat(51);
        let errors = valid_registration_errors(&long);
        assert_eq!(errors["firstname"], "First name cannot exceed 50 characters");
    }

    #[test]
    fn test_missing_fields_all_reported() {
        let errors = validate_registration("", "", "", "");
        assert_eq!(errors.len(), 4);
        assert_eq!(errors["firstname"], "First name is required");
        assert_eq!(errors["lastname"], "Last name is required");
        assert_eq!(errors["email"], "Email is required");
        assert_eq!(errors["password"], "Password is required");
    }

    #[test]
    fn test_email_syntax() {
        let errors = validate_registration("Alice", "Smith", "not-an-email", "Str0ng!pass");
        assert_eq!(errors["email"], "Please provide a valid email address");

        for email in ["a@b.co", "first.last+tag@example.org"] {
            let errors = validate_registration("Alice", "Smith", email, "Str0ng!pass");
            assert!(errors.is_empty(), "rejected {}", email);
        }
    }

    #[test]
    fn test_password_strength_monotonic() {
        // All four classes with length >= 8 always passes.
        for pw in ["Str0ng!pass", "aB3$efgh", "P@ssw0rd"] {
            let errors = validate_registration("Alice", "Smith", "a@b.co", pw);
            assert!(errors.is_empty(), "rejected {}", pw);
        }
        // Removing any one class, or dropping below 8, always fails.
        let missing_class = [
            "str0ng!pass", // no uppercase
            "STR0NG!PASS", // no lowercase
            "Strong!pass", // no digit
            "Str0ngpass",  // no symbol
        ];
        for pw in missing_class {
            let errors = validate_registration("Alice", "Smith", "a@b.co", pw);
            assert_eq!(
                errors["password"],
                "Password must contain uppercase, lowercase, numbers, and special characters",
                "case: {}",
                pw
            );
        }
        let errors = validate_registration("Alice", "Smith", "a@b.co", "aB3$efg");
        assert_eq!(
            errors["password"],
            "Password must be at least 8 characters long"
        );
    }

    #[test]
    fn test_login_skips_strength() {
        // A weak-but-long password passes login validation.
        let errors = validate_login("alice@example.com", "alllowercase");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_login_shape_checks() {
        let errors = validate_login("", "short");
        assert_eq!(errors["email"], "Email is required");
        assert_eq!(
            errors["password"],
            "Password must be at least 8 characters long"
        );
    }
}
