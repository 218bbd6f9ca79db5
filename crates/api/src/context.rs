use storefront_core::UserId;

/// Authenticated identity for a request.
///
/// Present on every cart/order route; the auth middleware rejects the
/// request before the handler runs otherwise.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
}

impl PrincipalContext {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
