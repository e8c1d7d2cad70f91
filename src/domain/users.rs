//! Input rules for account names, passwords and email addresses.

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 20;
const PASSWORD_MIN: usize = 3;
const PASSWORD_MAX: usize = 20;

/// 3 to 20 characters drawn from ASCII letters, digits, `_` and `-`.
pub fn valid_username(name: &str) -> bool {
    (NAME_MIN..=NAME_MAX).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// 3 to 20 characters of anything except line breaks.
pub fn valid_password(password: &str) -> bool {
    let count = password.chars().count();
    (PASSWORD_MIN..=PASSWORD_MAX).contains(&count) && !password.contains('\n')
}

/// Email is optional; when given it must look like `local@domain.tld`.
pub fn valid_email(email: Option<&str>) -> bool {
    let Some(email) = email else {
        return true;
    };
    if email.is_empty() {
        return true;
    }
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    // The domain needs a dot with text on both sides; later `@`s are allowed.
    match domain.rfind('.') {
        Some(dot) => dot > 0 && dot + 1 < domain.len(),
        None => false,
    }
}
