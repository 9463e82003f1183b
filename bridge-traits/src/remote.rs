//! Remote Document Store Abstraction
//!
//! The remote document store is the source of truth for the Pro entitlement
//! flag. The core only reads that one field; writes happen host-side
//! (purchase flow, support tooling) and the sync protocol and document
//! schema are the host's concern.

use async_trait::async_trait;

use crate::error::Result;

/// Read access to the per-user Pro entitlement flag in the remote document
/// store.
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    /// Read the Pro flag for a user. Returns `false` for unknown users.
    async fn is_pro(&self, user_id: &str) -> Result<bool>;
}
