//! Form field validation.
//!
//! Each function returns `None` when the input is acceptable, and the
//! message to show under the field otherwise. Validation always runs before
//! any network call.

pub fn validate_email(email: &str) -> Option<&'static str> {
    if email.is_empty() {
        return Some("Email is required");
    }
    if !is_valid_email(email) {
        return Some("Please enter a valid email address");
    }
    None
}

pub fn validate_password(password: &str) -> Option<&'static str> {
    if password.is_empty() {
        return Some("Password is required");
    }
    if password.chars().count() < 6 {
        return Some("Password must be at least 6 characters long");
    }
    None
}

pub fn validate_username(username: &str) -> Option<&'static str> {
    if username.is_empty() {
        return Some("Username is required");
    }
    if username.chars().count() < 3 {
        return Some("Username must be at least 3 characters long");
    }
    None
}

pub fn validate_name(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("Name is required");
    }
    if name.chars().count() < 2 {
        return Some("Name must be at least 2 characters long");
    }
    None
}

pub fn validate_message(message: &str) -> Option<&'static str> {
    if message.is_empty() {
        return Some("Message is required");
    }
    if message.chars().count() < 10 {
        return Some("Message must be at least 10 characters long");
    }
    None
}

/// Accepts exactly the addresses matched by `^[^\s@]+@[^\s@]+\.[^\s@]+$`:
/// no whitespace anywhere, a single `@` with a non-empty local part, and a
/// domain containing an interior dot.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain
                    .bytes()
                    .enumerate()
                    .any(|(i, b)| b == b'.' && i > 0 && i < domain.len() - 1)
        }
        _ => false,
    }
}
