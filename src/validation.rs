use std::collections::BTreeMap;

use validator::{validate_email, validate_url};

use crate::form::RegistrationForm;
use crate::models::NewUser;

pub const NAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 50;
pub const AGE_MIN: u32 = 18;
pub const AGE_MAX: u32 = 65;

/// Field name -> message for the first violated rule of that field.
/// Fields that pass have no entry.
pub type FieldErrors = BTreeMap<&'static str, String>;

fn name_error(name: &str) -> Option<String> {
    if name.is_empty() {
        return Some("Name is required".to_string());
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Some(format!("Name must be at most {} characters", NAME_MAX_LEN));
    }
    None
}

/// Rules in order of relevance; only the first violation is reported.
/// The permitted alphabet is ASCII letters and digits.
fn password_error(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Some(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LEN
        ));
    }
    if password.chars().count() > PASSWORD_MAX_LEN {
        return Some(format!(
            "Password must be at most {} characters",
            PASSWORD_MAX_LEN
        ));
    }
    if !password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Some("Password may only contain latin letters and digits".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Some("Password must contain at least one digit".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Some("Password must contain at least one uppercase letter".to_string());
    }
    None
}

/// Compared against the password value as of submit time.
fn repeat_password_error(repeat_password: &str, password: &str) -> Option<String> {
    if repeat_password.is_empty() {
        return Some("Please repeat the password".to_string());
    }
    if repeat_password != password {
        return Some("Passwords must match".to_string());
    }
    None
}

fn email_error(email: &str) -> Option<String> {
    if email.is_empty() {
        return Some("Email is required".to_string());
    }
    if !validate_email(email) {
        return Some("Invalid email address".to_string());
    }
    None
}

fn website_error(website: &str) -> Option<String> {
    if !website.is_empty() && !validate_url(website) {
        return Some("Invalid website address".to_string());
    }
    None
}

fn age_error(age: Option<u32>) -> Option<String> {
    match age {
        // 0 is the "unset" sentinel legacy clients send for an empty age
        None | Some(0) => None,
        Some(age) if age < AGE_MIN => Some(format!("You must be at least {}", AGE_MIN)),
        Some(age) if age > AGE_MAX => {
            Some(format!("You must be at most {} to register", AGE_MAX))
        }
        _ => None,
    }
}

fn accept_terms_error(accept_terms: bool) -> Option<String> {
    if accept_terms {
        None
    } else {
        Some("You must accept the terms".to_string())
    }
}

/// Validates the live form, including the client-only cross-field and
/// checkbox rules. Pure: re-run on every change; whether an error is shown
/// is a touch-tracking concern, not a validity one.
pub fn validate_form(form: &RegistrationForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let checks = [
        ("name", name_error(&form.name)),
        ("password", password_error(&form.password)),
        (
            "repeat_password",
            repeat_password_error(&form.repeat_password, &form.password),
        ),
        ("email", email_error(&form.email)),
        ("website", website_error(&form.website)),
        ("age", age_error(form.age_or_unset())),
        ("accept_terms", accept_terms_error(form.accept_terms)),
    ];
    for (field, error) in checks {
        if let Some(message) = error {
            errors.insert(field, message);
        }
    }
    errors
}

/// Validates a wire payload with the same field rules. The service runs this
/// on every candidate rather than trusting the client.
pub fn validate_new_user(user: &NewUser) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let checks = [
        ("name", name_error(&user.name)),
        ("password", password_error(&user.password)),
        ("email", email_error(&user.email)),
        ("website", website_error(user.website.as_deref().unwrap_or(""))),
        ("age", age_error(user.age)),
    ];
    for (field, error) in checks {
        if let Some(message) = error {
            errors.insert(field, message);
        }
    }
    errors
}
