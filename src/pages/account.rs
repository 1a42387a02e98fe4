use finish_it::core::account::PasswordStrength;

pub fn password_hint(strength: PasswordStrength) -> String {
    let advice = match strength {
        PasswordStrength::Weak => " (use at least 6 characters)",
        PasswordStrength::Medium => {
            " (10+ characters with an uppercase letter, a digit and a symbol is stronger)"
        }
        PasswordStrength::Strong => "",
    };
    format!("Password strength: {}{}", strength.label(), advice)
}
