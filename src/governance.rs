//! Single-principal access control for every mutating operation.

use tracing::warn;

use crate::core_types::Principal;
use crate::error::{OracleError, OracleResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GovernanceGate {
    principal: Principal,
}

impl GovernanceGate {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> Principal {
        self.principal
    }

    pub fn is_governance(&self, caller: Principal) -> bool {
        caller == self.principal
    }

    pub fn authorize(&self, caller: Principal) -> OracleResult<()> {
        if self.is_governance(caller) {
            Ok(())
        } else {
            warn!(%caller, "rejected mutation from non-governance caller");
            Err(OracleError::Unauthorized { caller })
        }
    }

    /// Hand control to `new_principal`. Returns the previous principal.
    pub fn transfer(&mut self, caller: Principal, new_principal: Principal) -> OracleResult<Principal> {
        self.authorize(caller)?;
        Ok(std::mem::replace(&mut self.principal, new_principal))
    }
}
