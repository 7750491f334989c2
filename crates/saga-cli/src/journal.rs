//! Timestamped record of a play session.

use chrono::{DateTime, Utc};
use saga_core::{ChapterId, ItemId};
use saga_engine::EngineEvent;
use saga_profile::LedgerEvent;
use serde::{Deserialize, Serialize};

/// A single entry in the session journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum JournalEntry {
    /// A chapter traversal began.
    ChapterStarted {
        /// The chapter.
        chapter: ChapterId,
        /// When it started.
        timestamp: DateTime<Utc>,
    },
    /// A slide became current.
    SlideEntered {
        /// Its chapter.
        chapter: ChapterId,
        /// Its index.
        slide_index: usize,
        /// When it was entered.
        timestamp: DateTime<Utc>,
    },
    /// An item was granted.
    ItemGranted {
        /// The item.
        item: ItemId,
        /// When it was granted.
        timestamp: DateTime<Utc>,
    },
    /// Currency was added.
    CurrencyGranted {
        /// Amount added.
        amount: u64,
        /// Balance afterwards.
        balance: u64,
        /// When it was added.
        timestamp: DateTime<Utc>,
    },
    /// A recipe was crafted.
    Crafted {
        /// The product.
        item: ItemId,
        /// Items consumed.
        consumed: Vec<ItemId>,
        /// When it was crafted.
        timestamp: DateTime<Utc>,
    },
    /// A chapter was unlocked.
    ChapterUnlocked {
        /// The chapter.
        chapter: ChapterId,
        /// When it was unlocked.
        timestamp: DateTime<Utc>,
    },
    /// A chapter was finished.
    ChapterCompleted {
        /// The chapter.
        chapter: ChapterId,
        /// When it finished.
        timestamp: DateTime<Utc>,
    },
}

impl JournalEntry {
    /// The entry worth recording for an engine event, if any.
    pub fn from_event(event: &EngineEvent) -> Option<Self> {
        let timestamp = Utc::now();
        let entry = match event {
            EngineEvent::ChapterStarted(chapter) => Self::ChapterStarted {
                chapter: chapter.clone(),
                timestamp,
            },
            EngineEvent::SlideEntered {
                chapter_id,
                slide_index,
            } => Self::SlideEntered {
                chapter: chapter_id.clone(),
                slide_index: *slide_index,
                timestamp,
            },
            EngineEvent::Ledger(LedgerEvent::ItemGranted { id }) => Self::ItemGranted {
                item: id.clone(),
                timestamp,
            },
            EngineEvent::Ledger(LedgerEvent::CurrencyGranted { amount, balance }) => {
                Self::CurrencyGranted {
                    amount: *amount,
                    balance: *balance,
                    timestamp,
                }
            }
            EngineEvent::Ledger(LedgerEvent::Crafted { produces, consumed }) => Self::Crafted {
                item: produces.clone(),
                consumed: consumed.clone(),
                timestamp,
            },
            EngineEvent::ChapterUnlocked(chapter) => Self::ChapterUnlocked {
                chapter: chapter.clone(),
                timestamp,
            },
            EngineEvent::ChapterCompleted(chapter) => Self::ChapterCompleted {
                chapter: chapter.clone(),
                timestamp,
            },
            _ => return None,
        };
        Some(entry)
    }

    fn timestamp(&self) -> &DateTime<Utc> {
        match self {
            Self::ChapterStarted { timestamp, .. }
            | Self::SlideEntered { timestamp, .. }
            | Self::ItemGranted { timestamp, .. }
            | Self::CurrencyGranted { timestamp, .. }
            | Self::Crafted { timestamp, .. }
            | Self::ChapterUnlocked { timestamp, .. }
            | Self::ChapterCompleted { timestamp, .. } => timestamp,
        }
    }
}

/// A chronological log of session events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to the journal.
    pub fn append(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }

    /// Record an engine event if it is journal-worthy.
    pub fn record(&mut self, event: &EngineEvent) {
        if let Some(entry) = JournalEntry::from_event(event) {
            self.append(entry);
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the journal is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Export the journal as markdown.
    pub fn export_markdown(&self) -> String {
        let mut out = String::from("# Saga Session Journal\n\n");
        for entry in &self.entries {
            let time = entry.timestamp().format("%H:%M:%S");
            let line = match entry {
                JournalEntry::ChapterStarted { chapter, .. } => {
                    format!("## Chapter {chapter}\n\n*{time}* started")
                }
                JournalEntry::SlideEntered { slide_index, .. } => {
                    format!("- *{time}* slide {}", slide_index + 1)
                }
                JournalEntry::ItemGranted { item, .. } => {
                    format!("- *{time}* received **{item}**")
                }
                JournalEntry::CurrencyGranted {
                    amount, balance, ..
                } => format!("- *{time}* +{amount} coins (wallet: {balance})"),
                JournalEntry::Crafted { item, consumed, .. } => {
                    let used: Vec<&str> = consumed.iter().map(ItemId::as_str).collect();
                    format!("- *{time}* crafted **{item}** from {}", used.join(", "))
                }
                JournalEntry::ChapterUnlocked { chapter, .. } => {
                    format!("- *{time}* unlocked chapter {chapter}")
                }
                JournalEntry::ChapterCompleted { chapter, .. } => {
                    format!("\n*{time}* finished chapter {chapter}\n")
                }
            };
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}
