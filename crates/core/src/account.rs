//! Signup input validation shared by the DB and API layers.

/// Minimum accepted password length for new accounts.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum accepted display name length.
pub const MAX_NAME_LENGTH: usize = 100;

/// Validate an email address: non-empty, contains a single `@` with
/// characters on both sides. Full RFC validation is deliberately out of
/// scope; the unique constraint and a confirmation flow catch the rest.
pub fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Email must not be empty".to_string());
    }
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(format!("'{email}' is not a valid email address"));
    }
    Ok(())
}

/// Validate a user's display name.
pub fn validate_display_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name must not be empty".to_string());
    }
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(format!(
            "Name must be at most {MAX_NAME_LENGTH} characters long"
        ));
    }
    Ok(())
}
