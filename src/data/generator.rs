use fake::faker::internet::en::{Password, SafeEmail};
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;

/// Random account details for registration
#[derive(Debug, Clone)]
pub struct AccountData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl AccountData {
    pub fn generate() -> Self {
        Self {
            first_name: FirstName().fake(),
            last_name: LastName().fake(),
            email: SafeEmail().fake(),
            password: Password(8..16).fake(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_account_is_usable() {
        let account = AccountData::generate();
        assert!(!account.first_name.is_empty());
        assert!(!account.last_name.is_empty());
        assert!(account.email.contains('@'));
        assert!((8..16).contains(&account.password.chars().count()));
    }
}
