//! Fulfillment authorization collaborator.

use async_trait::async_trait;
use common::UserId;

use crate::error::FlowError;

/// The acting user as supplied by the authentication collaborator.
///
/// The core never manages credentials; it only consumes the user id and
/// role flag the auth layer resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl Actor {
    /// A regular customer.
    pub fn customer(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    /// A fulfillment/admin actor.
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }
}

/// Decides whether an actor may drive fulfillment transitions.
#[async_trait]
pub trait FulfillmentAuthorizer: Send + Sync {
    /// Fails with [`FlowError::Unauthorized`] unless the actor carries
    /// fulfillment authority.
    async fn authorize_fulfillment(&self, actor: &Actor) -> Result<(), FlowError>;
}

/// Grants fulfillment authority to admins, per the role flag from the
/// auth collaborator.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminAuthorizer;

impl AdminAuthorizer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FulfillmentAuthorizer for AdminAuthorizer {
    async fn authorize_fulfillment(&self, actor: &Actor) -> Result<(), FlowError> {
        if actor.is_admin {
            Ok(())
        } else {
            Err(FlowError::Unauthorized)
        }
    }
}
