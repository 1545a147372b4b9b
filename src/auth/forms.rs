// src/auth/forms.rs — Login / sign-up form validation

use crate::infra::errors::ClientError;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ClientError::Validation("Please fill in all fields".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    /// Checks run in the order the user would fix them: missing fields,
    /// mismatch, then length.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.full_name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
        {
            return Err(ClientError::Validation("Please fill in all fields".into()));
        }
        if self.password != self.confirm_password {
            return Err(ClientError::Validation("Passwords do not match".into()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ClientError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordStrength {
    /// 0-100
    pub score: u8,
    pub label: &'static str,
}

pub fn password_strength(password: &str) -> PasswordStrength {
    let len = password.chars().count();
    let (score, label) = if len == 0 {
        (0, "")
    } else if len < 6 {
        (25, "Weak")
    } else if len < 10 {
        (50, "Fair")
    } else if !password.chars().any(|c| c.is_ascii_uppercase())
        || !password.chars().any(|c| c.is_ascii_digit())
    {
        (65, "Good")
    } else {
        (100, "Strong")
    };
    PasswordStrength { score, label }
}
