use itemvault_core::Uid;

/// Tenant context for a request, inserted by the auth middleware.
///
/// Immutable, and present on every `/items` route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    uid: Uid,
}

impl TenantContext {
    pub fn new(uid: Uid) -> Self {
        Self { uid }
    }

    pub fn uid(&self) -> &Uid {
        &self.uid
    }
}
