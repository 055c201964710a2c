//! Input validation and normalization
//!
//! Email addresses are stored trimmed and lower-cased; every lookup key must
//! go through [`normalize_email`] so lookups match storage normalization.

use validator::ValidateEmail;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Normalize an email for storage and lookup: trim whitespace, lower-case.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate email format (after normalization)
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    if !email.validate_email() {
        return Err("Invalid email format".to_string());
    }
    // The HTML5-style check above accepts bare hostnames; real accounts
    // need a dotted domain.
    match email.rsplit_once('@') {
        Some((_, domain)) if domain.contains('.') => Ok(()),
        _ => Err("Invalid email format".to_string()),
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }
    if password.len() > 128 {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Validate a graduation year as a 4-digit string, e.g. "2026"
pub fn validate_graduation_year(year: &str) -> Result<(), String> {
    let year_regex = regex_lite::Regex::new(r"^\d{4}$").unwrap();
    if !year_regex.is_match(year) {
        return Err("Graduation year must be a 4-digit year".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a@b.com", "a@b.com")]
    #[case("  a@b.com  ", "a@b.com")]
    #[case("Ada@Example.COM", "ada@example.com")]
    #[case("\tMixed@Case.Org \n", "mixed@case.org")]
    fn test_normalize_email(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_email(input), expected);
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret1").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[rstest]
    #[case("2026", true)]
    #[case("1999", true)]
    #[case("26", false)]
    #[case("twenty", false)]
    #[case("20266", false)]
    fn test_validate_graduation_year(#[case] year: &str, #[case] ok: bool) {
        assert_eq!(validate_graduation_year(year).is_ok(), ok);
    }
}
