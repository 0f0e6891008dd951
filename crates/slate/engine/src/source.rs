//! Billet feed collaborator.

use async_trait::async_trait;
use slate_types::{Billet, SlateResult, UserId};

/// Where the store gets its billets from.
#[async_trait]
pub trait BilletSource: Send + Sync {
    /// Fetch the billets available to a user, in browse order.
    async fn fetch_billets(&self, user_id: &UserId) -> SlateResult<Vec<Billet>>;
}

/// Serves a fixed list to every user.
#[derive(Debug, Clone, Default)]
pub struct StaticBilletSource {
    billets: Vec<Billet>,
}

impl StaticBilletSource {
    pub fn new(billets: Vec<Billet>) -> Self {
        Self { billets }
    }
}

#[async_trait]
impl BilletSource for StaticBilletSource {
    async fn fetch_billets(&self, _user_id: &UserId) -> SlateResult<Vec<Billet>> {
        Ok(self.billets.clone())
    }
}
