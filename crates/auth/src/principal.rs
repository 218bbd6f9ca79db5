use serde::{Deserialize, Serialize};

use storefront_core::UserId;

/// The authenticated identity under which an operation runs.
///
/// Opaque to the domain: components receive a verified user id and nothing
/// else. Produced by token verification; absence of a principal is rejected
/// at the transport boundary before any core code runs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    user_id: UserId,
}

impl Principal {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
