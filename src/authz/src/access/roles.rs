//! Role assignments per principal
//!
//! The registry enforces the owner invariant: [`RoleId::OWNER`] is held by
//! exactly one principal, assigned at construction, and only moves through
//! [`RoleRegistry::transfer_owner`]. The generic `grant`/`revoke` paths refuse
//! it unconditionally.

use crate::error::{AuthzError, Result};
use agora_core::{Principal, RoleId};
use std::collections::HashMap;

/// Principal → roles held
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    owner: Principal,
    assignments: HashMap<Principal, Vec<RoleId>>,
}

impl RoleRegistry {
    /// Create a registry with `owner` holding the owner role
    pub fn new(owner: Principal) -> Result<Self> {
        if owner.is_absent() {
            return Err(AuthzError::RoleOperationInvalid(
                "owner cannot be the absent principal".to_string(),
            ));
        }

        let mut assignments = HashMap::new();
        assignments.insert(owner.clone(), vec![RoleId::OWNER]);

        Ok(Self { owner, assignments })
    }

    pub fn owner(&self) -> &Principal {
        &self.owner
    }

    pub fn has_role(&self, account: &Principal, role: RoleId) -> bool {
        self.roles_of(account).contains(&role)
    }

    /// Roles held by an account, in no particular order
    pub fn roles_of(&self, account: &Principal) -> &[RoleId] {
        self.assignments
            .get(account)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Grant a non-owner role
    pub fn grant(&mut self, account: &Principal, role: RoleId) -> Result<()> {
        Self::check_generic(account, role)?;

        if self.has_role(account, role) {
            return Err(AuthzError::RoleOperationInvalid(format!(
                "{} already holds {}",
                account, role
            )));
        }

        self.assignments
            .entry(account.clone())
            .or_default()
            .push(role);
        Ok(())
    }

    /// Revoke a non-owner role. Order of the remaining roles is not preserved.
    pub fn revoke(&mut self, account: &Principal, role: RoleId) -> Result<()> {
        Self::check_generic(account, role)?;

        let Some(roles) = self.assignments.get_mut(account) else {
            return Err(Self::not_held(account, role));
        };
        let Some(index) = roles.iter().position(|held| *held == role) else {
            return Err(Self::not_held(account, role));
        };

        roles.swap_remove(index);
        if roles.is_empty() {
            self.assignments.remove(account);
        }
        Ok(())
    }

    /// Move the owner role from the current owner to `new_owner` in one step
    pub fn transfer_owner(&mut self, new_owner: &Principal) -> Result<Principal> {
        if new_owner.is_absent() {
            return Err(AuthzError::RoleOperationInvalid(
                "cannot transfer ownership to the absent principal".to_string(),
            ));
        }
        if *new_owner == self.owner {
            return Err(AuthzError::RoleOperationInvalid(format!(
                "{} is already the owner",
                new_owner
            )));
        }

        let previous = std::mem::replace(&mut self.owner, new_owner.clone());

        if let Some(roles) = self.assignments.get_mut(&previous) {
            roles.retain(|role| !role.is_owner());
            if roles.is_empty() {
                self.assignments.remove(&previous);
            }
        }
        self.assignments
            .entry(new_owner.clone())
            .or_default()
            .push(RoleId::OWNER);

        Ok(previous)
    }

    /// Number of principals holding at least one role
    pub fn principal_count(&self) -> usize {
        self.assignments.len()
    }

    fn check_generic(account: &Principal, role: RoleId) -> Result<()> {
        if account.is_absent() {
            return Err(AuthzError::RoleOperationInvalid(
                "account cannot be the absent principal".to_string(),
            ));
        }
        if role.is_owner() {
            return Err(AuthzError::RoleOperationInvalid(
                "the owner role cannot be granted or revoked directly".to_string(),
            ));
        }
        Ok(())
    }

    fn not_held(account: &Principal, role: RoleId) -> AuthzError {
        AuthzError::RoleOperationInvalid(format!("{} does not hold {}", account, role))
    }
}
