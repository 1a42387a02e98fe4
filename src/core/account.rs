use serde::Serialize;

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Body of `POST /api/users/signup`; the confirmation never leaves the client.
#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), Error> {
        if self.password != self.confirm_password {
            return Err(Error::Validation("Passwords do not match!".into()));
        }
        Ok(())
    }

    pub fn request(&self) -> SignupRequest<'_> {
        SignupRequest {
            name: &self.name,
            email: &self.email,
            password: &self.password,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Medium => "medium",
            Self::Strong => "strong",
        }
    }
}

pub fn password_strength(password: &str) -> PasswordStrength {
    let len = password.chars().count();
    if len < 6 {
        return PasswordStrength::Weak;
    }
    let upper = password.chars().any(|c| c.is_ascii_uppercase());
    let digit = password.chars().any(|c| c.is_ascii_digit());
    let symbol = password.chars().any(|c| "!@#$%^&*".contains(c));
    if len >= 10 && upper && digit && symbol {
        PasswordStrength::Strong
    } else {
        PasswordStrength::Medium
    }
}
