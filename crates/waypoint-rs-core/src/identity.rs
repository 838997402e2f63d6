//! Identity collaborator: the current owner and its changes.

use log::info;
use tokio::sync::watch;
use waypoint_rs_protocol::OwnerId;

/// Supplies the authenticated owner, if any.
pub trait IdentityProvider: Send + Sync {
    fn current_owner(&self) -> Option<OwnerId>;
    /// Receiver notified on every sign-in or sign-out.
    fn subscribe(&self) -> watch::Receiver<Option<OwnerId>>;
}

/// Identity held in a watch channel; sign-in and sign-out are explicit calls.
#[derive(Debug)]
pub struct SharedIdentity {
    sender: watch::Sender<Option<OwnerId>>,
}

impl SharedIdentity {
    pub fn new(owner: Option<OwnerId>) -> Self {
        let (sender, _) = watch::channel(owner);
        Self { sender }
    }

    pub fn signed_out() -> Self {
        Self::new(None)
    }

    pub fn sign_in(&self, owner: impl Into<OwnerId>) {
        let owner = owner.into();
        info!("identity signed in (owner={})", owner);
        self.sender.send_replace(Some(owner));
    }

    pub fn sign_out(&self) {
        info!("identity signed out");
        self.sender.send_replace(None);
    }
}

impl IdentityProvider for SharedIdentity {
    fn current_owner(&self) -> Option<OwnerId> {
        self.sender.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<OwnerId>> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::{IdentityProvider, SharedIdentity};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn subscribers_see_sign_in() {
        let identity = SharedIdentity::signed_out();
        let mut receiver = identity.subscribe();
        assert_eq!(identity.current_owner(), None);

        identity.sign_in("alice");
        receiver.changed().await.expect("changed");
        assert_eq!(receiver.borrow().as_deref(), Some("alice"));
        assert_eq!(identity.current_owner().as_deref(), Some("alice"));
    }
}
