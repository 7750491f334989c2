use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice.
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
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_id! {
    /// Stable identifier of a chapter.
    ChapterId
}

string_id! {
    /// Optional stable identifier of a slide, used for non-linear jumps.
    SlideId
}

string_id! {
    /// Identifier of an inventory item.
    ItemId
}

string_id! {
    /// Name under which a hook is registered with the engine.
    HookId
}

/// One of the three named side-paths a slide may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideSlot {
    /// The "loop" detour.
    Loop,
    /// The "quest" detour, which runs a quest stepper.
    Quest,
    /// The "weird" detour.
    Weird,
}

impl SideSlot {
    /// Every slot, in the order used by the "require all" gate shorthand.
    pub const ALL: [SideSlot; 3] = [SideSlot::Weird, SideSlot::Quest, SideSlot::Loop];

    /// Parse a slot name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "loop" => Some(Self::Loop),
            "quest" => Some(Self::Quest),
            "weird" => Some(Self::Weird),
            _ => None,
        }
    }

    /// The slot's script name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Loop => "loop",
            Self::Quest => "quest",
            Self::Weird => "weird",
        }
    }
}

impl fmt::Display for SideSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
