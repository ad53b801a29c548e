//! Resource state engine. Turns buff status and inventory text into a consume command.
//!
//! Both inputs are unstructured prose full of emoji and counts, so parsing is
//! permissive about surroundings and strict about values: a number only counts
//! as a resource when it falls inside a configured category, and a short code
//! only counts when its index names a configured category.
//!
//! ```text
//! status:    "... hunt is empowered by <:egem3:123> <:mgem1:456> ..."
//! inventory: "051 ❤️ 27   057 💎 3   064 ✨ 1"
//! command:   "ouse 064"
//! ```

use gemfarm_core::message::Message;
use gemfarm_core::resource::{CategoryTable, ResourceCategory, ResourceId};
use regex_lite::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::FarmError;

/// Two or three digits, optionally behind one leading zero, on word boundaries.
static RESOURCE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b0?[0-9]{2,3}\b").expect("resource token pattern"));

/// Owned resource IDs parsed from one inventory listing.
///
/// Always ascending and duplicate-free.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventorySnapshot {
    ids: Vec<ResourceId>,
}

impl InventorySnapshot {
    pub fn from_ids(ids: impl IntoIterator<Item = ResourceId>) -> Self {
        let set: BTreeSet<ResourceId> = ids.into_iter().collect();
        Self {
            ids: set.into_iter().collect(),
        }
    }

    pub fn ids(&self) -> &[ResourceId] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Category names currently providing their buff.
///
/// Keeps first-seen order for logging; membership is set-like.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveCategorySet {
    names: Vec<String>,
}

impl ActiveCategorySet {
    pub fn from_names<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        let mut set = Self::default();
        for name in names {
            set.insert(name.into());
        }
        set
    }

    fn insert(&mut self, name: String) {
        if !self.contains(&name) {
            self.names.push(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Parses buff and inventory text against a fixed category table.
#[derive(Debug, Clone)]
pub struct ResourceEngine {
    table: CategoryTable,
    short_code: Regex,
    consume_keyword: String,
}

impl ResourceEngine {
    /// `marker` is the literal between the rarity letter and the category
    /// index in active-buff short codes (`gem` in `egem3`).
    pub fn new(
        table: CategoryTable,
        marker: &str,
        consume_keyword: impl Into<String>,
    ) -> Result<Self, FarmError> {
        let pattern = format!(r"[a-z]{}(\d+)", regex_lite::escape(marker));
        let short_code = Regex::new(&pattern).map_err(|e| FarmError::InvalidPattern {
            pattern,
            reason: e.to_string(),
        })?;

        Ok(Self {
            table,
            short_code,
            consume_keyword: consume_keyword.into(),
        })
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    pub fn consume_keyword(&self) -> &str {
        &self.consume_keyword
    }

    /// Every configured resource ID mentioned in an inventory listing.
    pub fn parse_inventory(&self, text: &str) -> InventorySnapshot {
        InventorySnapshot::from_ids(
            RESOURCE_TOKEN
                .find_iter(text)
                .filter_map(|m| m.as_str().parse::<u16>().ok())
                .map(ResourceId)
                .filter(|id| self.table.is_known(*id)),
        )
    }

    /// Categories named by short codes in a buff status text.
    pub fn parse_active_categories(&self, text: &str) -> ActiveCategorySet {
        let mut active = ActiveCategorySet::default();
        for caps in self.short_code.captures_iter(text) {
            let Some(index) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) else {
                continue;
            };
            if let Some(category) = self.table.by_index(index) {
                active.insert(category.name.clone());
            }
        }
        active
    }

    /// Configured categories absent from `active`, in declaration order.
    pub fn inactive_categories(&self, active: &ActiveCategorySet) -> Vec<&ResourceCategory> {
        self.table
            .iter()
            .filter(|c| !active.contains(&c.name))
            .collect()
    }

    /// Owned IDs that resolve to `category`.
    ///
    /// Resolution goes through the table, so with overlapping ranges an ID
    /// belongs only to the first category declared for it.
    pub fn owned_in<'a>(
        &'a self,
        owned: &'a InventorySnapshot,
        category: &'a ResourceCategory,
    ) -> impl Iterator<Item = ResourceId> + 'a {
        owned
            .ids()
            .iter()
            .copied()
            .filter(move |id| self.table.lookup(*id).is_some_and(|c| c.name == category.name))
    }

    /// The highest owned ID of each category, ascending by ID.
    ///
    /// Categories with nothing owned contribute nothing; an empty result
    /// means there is nothing to consume.
    pub fn select_highest_per_category(
        &self,
        owned: &InventorySnapshot,
        categories: &[&ResourceCategory],
    ) -> Vec<ResourceId> {
        let selected: BTreeSet<ResourceId> = categories
            .iter()
            .filter_map(|category| self.owned_in(owned, category).max())
            .collect();
        selected.into_iter().collect()
    }

    /// `"<keyword> 027 051"`: three-digit zero-padded IDs, space-joined.
    pub fn format_consume_command(&self, ids: &[ResourceId]) -> String {
        let mut command = self.consume_keyword.clone();
        for id in ids {
            command.push_str(&format!(" {:03}", id.0));
        }
        command
    }

    /// Inverse of [`format_consume_command`](Self::format_consume_command).
    ///
    /// Returns `None` when the keyword is wrong or a token is not a
    /// three-digit number.
    pub fn parse_consume_command(&self, command: &str) -> Option<Vec<ResourceId>> {
        let mut tokens = command.split_whitespace();
        if tokens.next()? != self.consume_keyword {
            return None;
        }
        tokens
            .map(|t| {
                if t.len() == 3 && t.bytes().all(|b| b.is_ascii_digit()) {
                    t.parse::<u16>().ok().map(ResourceId)
                } else {
                    None
                }
            })
            .collect()
    }
}

/// The first inventory listing among `messages`.
///
/// A body mentioning "inventory" wins; otherwise an embed whose title
/// contains one of `title_markers` and has a description.
pub fn find_inventory_text(messages: &[Message], title_markers: &[String]) -> Option<String> {
    for msg in messages {
        if msg.content.to_lowercase().contains("inventory") {
            return Some(msg.content.clone());
        }

        for embed in &msg.embeds {
            let title = embed.title_text().to_lowercase();
            let description = embed.description_text();
            if !description.is_empty()
                && title_markers
                    .iter()
                    .any(|m| !m.is_empty() && title.contains(&m.to_lowercase()))
            {
                return Some(description.to_string());
            }
        }
    }
    None
}

/// The first buff status announcement among `messages`.
///
/// Matches `phrase` case-insensitively in the body, then in each embed's
/// title or description (returned as description + title).
pub fn find_status_text(messages: &[Message], phrase: &str) -> Option<String> {
    let phrase = phrase.to_lowercase();
    for msg in messages {
        if msg.content.to_lowercase().contains(&phrase) {
            return Some(msg.content.clone());
        }

        for embed in &msg.embeds {
            let description = embed.description_text();
            let title = embed.title_text();
            if description.to_lowercase().contains(&phrase)
                || title.to_lowercase().contains(&phrase)
            {
                return Some(format!("{description} {title}"));
            }
        }
    }
    None
}
