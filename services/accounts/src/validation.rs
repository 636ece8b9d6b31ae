//! Input validation utilities
//!
//! The email is only used as a lookup key, so it is checked for shape, not
//! deliverability: any non-empty local part and domain around the last `@`.

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("Email is required".to_string());
    }

    match email.rsplit_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err("Invalid email format".to_string()),
    }
}

/// Validate display name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    Ok(())
}
