//! Account section contract and the name uniqueness rule

use pw_core::config::{AccountRules, AvatarConfig};
use pw_core::error::{ValidationErrors, WizardError};
use pw_core::types::UserId;
use pw_models::{AccountSection, Avatar, UserRecord};

use crate::base::{derive_rules, Contract, ValidationResult};

/// Lookup over the names of finalized user records
pub trait NameRegistry: Send + Sync {
    /// Whether `name` is used, case-insensitively, by a record other than `except`
    fn name_taken(&self, name: &str, except: Option<UserId>) -> bool;
}

impl NameRegistry for [UserRecord] {
    fn name_taken(&self, name: &str, except: Option<UserId>) -> bool {
        self.iter()
            .filter(|user| Some(user.id) != except)
            .any(|user| user.has_name(name))
    }
}

impl NameRegistry for Vec<UserRecord> {
    fn name_taken(&self, name: &str, except: Option<UserId>) -> bool {
        self.as_slice().name_taken(name, except)
    }
}

/// Fail with [`WizardError::DuplicateName`] when another record owns `name`.
///
/// `except` is the record being edited, which may keep its own name.
pub fn ensure_unique_name(
    registry: &dyn NameRegistry,
    name: &str,
    except: Option<UserId>,
) -> Result<(), WizardError> {
    if registry.name_taken(name, except) {
        return Err(WizardError::DuplicateName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Contract for the account step
#[derive(Debug, Clone)]
pub struct AccountContract {
    rules: AccountRules,
    avatar: AvatarConfig,
}

impl AccountContract {
    pub fn new(rules: AccountRules, avatar: AvatarConfig) -> Self {
        Self { rules, avatar }
    }

    pub fn validate_name(&self, name: &str, errors: &mut ValidationErrors) {
        if name.chars().count() > self.rules.name_max_length {
            errors.add("name", "Too Long!");
        }
    }

    pub fn validate_password(&self, account: &AccountSection, errors: &mut ValidationErrors) {
        let length = account.password.chars().count();
        if length > 0 && length < self.rules.password_min_length {
            errors.add("password", "Too Short!");
        } else if length > self.rules.password_max_length {
            errors.add("password", "Too Long!");
        }

        if !account.repeat_password.is_empty() && account.repeat_password != account.password {
            errors.add("repeatpassword", "passwords don't match");
        }
    }

    pub fn validate_avatar(&self, avatar: &Avatar, errors: &mut ValidationErrors) {
        if avatar.size_bytes > self.avatar.max_size_bytes {
            errors.add("avatar", "upload file is too big");
        }

        let supported = avatar
            .content_type
            .parse::<mime::Mime>()
            .map(|parsed| {
                let essence = parsed.essence_str().to_ascii_lowercase();
                self.avatar
                    .allowed_content_types
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(&essence))
            })
            .unwrap_or(false);
        if !supported {
            errors.add("avatar", "upload file has unsuported format");
        }
    }
}

impl Contract<AccountSection> for AccountContract {
    fn validate(&self, entity: &AccountSection) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        derive_rules(entity, &mut errors);
        self.validate_name(&entity.name, &mut errors);
        self.validate_password(entity, &mut errors);
        if let Some(avatar) = &entity.avatar {
            self.validate_avatar(avatar, &mut errors);
        }

        errors.into_result()
    }
}
