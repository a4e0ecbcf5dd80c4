//! Core entities for position ordering

use super::errors::RankError;
use super::rank::RankValue;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identifier of an ordered item (a card, or a list in the coarse tier).
    ItemId
);

string_id!(
    /// Identifier of a container (a list, or a board in the coarse tier).
    ParentId
);

impl ItemId {
    /// Fresh random identifier for a newly inserted item.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Per-parent optimistic concurrency token.
///
/// Bumped by every write that changes a parent's membership or ranks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Revision(pub u64);

impl Revision {
    pub fn next(self) -> Self {
        Revision(self.0 + 1)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// An item with a validated rank.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedItem {
    pub id: ItemId,
    pub parent_id: ParentId,
    pub rank: RankValue,
}

/// An item row as the store holds it; the rank is unvalidated text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredItem {
    pub id: ItemId,
    pub parent_id: ParentId,
    pub rank: String,
}

impl StoredItem {
    pub fn new(id: impl Into<ItemId>, parent_id: impl Into<ParentId>, rank: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            rank: rank.into(),
        }
    }

    /// Parse the stored rank.
    pub fn parse_rank(&self) -> Result<RankValue, RankError> {
        RankValue::parse(&self.rank)
    }

    /// Validate into an [`OrderedItem`].
    pub fn into_ordered(self) -> Result<OrderedItem, RankError> {
        let rank = RankValue::parse(&self.rank)?;
        Ok(OrderedItem {
            id: self.id,
            parent_id: self.parent_id,
            rank,
        })
    }
}

impl From<OrderedItem> for StoredItem {
    fn from(item: OrderedItem) -> Self {
        Self {
            id: item.id,
            parent_id: item.parent_id,
            rank: item.rank.into(),
        }
    }
}

/// Item in the integer-ordered tier (lists under a board).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoarseOrderedItem {
    pub id: ItemId,
    pub parent_id: ParentId,
    pub order: i64,
}

/// Requested position relative to the caller's view of the siblings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Placement {
    /// Sibling that should end up immediately before the item
    pub prev: Option<ItemId>,
    /// Sibling that should end up immediately after the item
    pub next: Option<ItemId>,
}

impl Placement {
    pub fn at_end() -> Self {
        Self::default()
    }

    pub fn after(prev: impl Into<ItemId>) -> Self {
        Self {
            prev: Some(prev.into()),
            next: None,
        }
    }

    pub fn before(next: impl Into<ItemId>) -> Self {
        Self {
            prev: None,
            next: Some(next.into()),
        }
    }

    pub fn between(prev: impl Into<ItemId>, next: impl Into<ItemId>) -> Self {
        Self {
            prev: Some(prev.into()),
            next: Some(next.into()),
        }
    }

    pub fn new(prev: Option<ItemId>, next: Option<ItemId>) -> Self {
        Self { prev, next }
    }
}

/// Whether a position write creates the row or moves an existing one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Update,
}

/// Conditional single-row position write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionWrite {
    pub item_id: ItemId,
    pub parent_id: ParentId,
    pub rank: RankValue,
    /// Revision of `parent_id` observed when the neighbors were read
    pub expected_revision: Revision,
    pub mode: WriteMode,
}

/// Conditional multi-row rank write for one parent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchPositionWrite {
    pub parent_id: ParentId,
    pub expected_revision: Revision,
    pub entries: Vec<(ItemId, RankValue)>,
}

/// Outcome of a rebalance pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RebalanceReport {
    pub parent_id: ParentId,
    pub item_count: usize,
    pub previous_revision: Revision,
    pub new_rank_length: usize,
    /// Siblings that shared a rank with an earlier sibling before the pass
    pub duplicates_repaired: Vec<ItemId>,
}
