/// Identity provider.
///
/// The game only reads who is playing. `LocalIdentity` signs in the player
/// profile from `config.toml` and notifies subscribers on every change.
/// Subscriptions are removed when their handle is dropped.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::config::PlayerProfile;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

impl User {
    /// Name shown on leaderboards: display name, else email, else id.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentityError {
    NotConfigured,
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "no player profile configured (set [player] id in config.toml)"),
        }
    }
}

impl std::error::Error for IdentityError {}

type Listener = Box<dyn FnMut(Option<&User>)>;

pub trait IdentityProvider {
    fn current_user(&self) -> Option<User>;
    /// Call `listener` now with the current user and again on every change.
    fn on_change(&self, listener: Listener) -> Subscription;
}

#[derive(Default)]
struct Registry {
    current: Option<User>,
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Keeps a listener registered; dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(reg) = self.registry.upgrade() {
            reg.borrow_mut().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

pub struct LocalIdentity {
    profile: Option<User>,
    registry: Rc<RefCell<Registry>>,
}

impl LocalIdentity {
    pub fn new(profile: Option<&PlayerProfile>) -> Self {
        let profile = profile.map(|p| User {
            id: p.id.clone(),
            display_name: p.name.clone(),
            email: p.email.clone(),
            photo_url: p.photo_url.clone(),
        });
        LocalIdentity { profile, registry: Rc::new(RefCell::new(Registry::default())) }
    }

    pub fn is_configured(&self) -> bool {
        self.profile.is_some()
    }

    pub fn sign_in(&self) -> Result<User, IdentityError> {
        let user = self.profile.clone().ok_or(IdentityError::NotConfigured)?;
        log::info!("signed in as {}", user.label());
        log::debug!("profile email {:?}, photo {:?}", user.email, user.photo_url);
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    pub fn sign_out(&self) {
        if self.registry.borrow().current.is_some() {
            log::info!("signed out");
            self.set_current(None);
        }
    }

    fn set_current(&self, user: Option<User>) {
        // Listeners run outside the borrow so they may read current_user().
        let mut listeners = {
            let mut reg = self.registry.borrow_mut();
            reg.current = user.clone();
            std::mem::take(&mut reg.listeners)
        };
        for (_, listener) in listeners.iter_mut() {
            listener(user.as_ref());
        }
        let mut reg = self.registry.borrow_mut();
        listeners.append(&mut reg.listeners);
        reg.listeners = listeners;
    }
}

impl IdentityProvider for LocalIdentity {
    fn current_user(&self) -> Option<User> {
        self.registry.borrow().current.clone()
    }

    fn on_change(&self, mut listener: Listener) -> Subscription {
        let current = self.current_user();
        listener(current.as_ref());
        let mut reg = self.registry.borrow_mut();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.listeners.push((id, listener));
        Subscription { id, registry: Rc::downgrade(&self.registry) }
    }
}
