//! Stable identifiers for recipes and their parts
//!
//! Every identifier is a UUID newtype, so an ingredient id can never be
//! passed where a step id is expected. Fresh ids come from an [`IdSource`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random id
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Build an id from a fixed value (fixtures, replays)
            #[inline]
            #[must_use]
            pub const fn from_u128(value: u128) -> Self {
                Self(Uuid::from_u128(value))
            }

            /// Underlying UUID
            #[inline]
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id! {
    /// Identity of a recipe document, fixed for its whole lifetime
    RecipeId
}

uuid_id! {
    /// Identity of an ingredient row; never reused once removed
    IngredientId
}

uuid_id! {
    /// Identity of a step
    StepId
}

uuid_id! {
    /// Identity of one patch proposal
    PatchSetId
}

/// Source of fresh ids for rows created while applying patches
///
/// Application is otherwise a pure function of its inputs; routing id
/// minting through this trait lets replays and tests pin the ids down.
pub trait IdSource {
    /// Mint an id for a new ingredient
    fn next_ingredient_id(&mut self) -> IngredientId;

    /// Mint an id for a new step
    fn next_step_id(&mut self) -> StepId;
}

/// Random (UUID v4) ids. The default for live editing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_ingredient_id(&mut self) -> IngredientId {
        IngredientId::new()
    }

    fn next_step_id(&mut self) -> StepId {
        StepId::new()
    }
}

/// Deterministic, monotonically increasing ids
///
/// Ingredients and steps share one counter, so no two minted ids are equal.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    /// Default starting point, well clear of hand-written fixture ids
    pub const DEFAULT_START: u128 = 1 << 120;

    /// Create a sequence starting at [`Self::DEFAULT_START`]
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Self::DEFAULT_START)
    }

    /// Create a sequence starting at `start`
    #[inline]
    #[must_use]
    pub fn starting_at(start: u128) -> Self {
        Self { next: start }
    }

    fn bump(&mut self) -> u128 {
        let value = self.next;
        self.next = self.next.wrapping_add(1);
        value
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for SequentialIds {
    fn next_ingredient_id(&mut self) -> IngredientId {
        IngredientId::from_u128(self.bump())
    }

    fn next_step_id(&mut self) -> StepId {
        StepId::from_u128(self.bump())
    }
}
