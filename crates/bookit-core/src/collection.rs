//! Cached resource collections and their load status.
//!
//! A collection is always written whole. Status moves
//! `Idle → Loading → Success | Error` on each sync; a failed sync leaves the
//! default (empty) contents behind.

use serde::{Deserialize, Serialize};

/// Load status of a cached collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl CollectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionStatus::Idle => "idle",
            CollectionStatus::Loading => "loading",
            CollectionStatus::Success => "success",
            CollectionStatus::Error => "error",
        }
    }
}

/// Items of one resource type plus the status of the last sync.
///
/// `C` is the container: `Vec<Listing>` for listings,
/// `BookingPartition` for bookings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceCollection<C> {
    pub items: C,
    pub status: CollectionStatus,
}

impl<C: Default> ResourceCollection<C> {
    /// Empty collection that has never been synced.
    pub fn idle() -> Self {
        Self::default()
    }

    /// A sync is in flight; previous items are kept until it lands.
    pub fn loading(self) -> Self {
        Self {
            items: self.items,
            status: CollectionStatus::Loading,
        }
    }

    pub fn success(items: C) -> Self {
        Self {
            items,
            status: CollectionStatus::Success,
        }
    }

    /// The last sync failed; contents reset to empty.
    pub fn error() -> Self {
        Self {
            items: C::default(),
            status: CollectionStatus::Error,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.status == CollectionStatus::Success
    }
}
