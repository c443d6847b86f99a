use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Item multiset owned by one user.
///
/// Stored names are canonical catalog names; [`Inventory::find`] resolves
/// user input case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    items: BTreeMap<String, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, quantity: u32) {
        if quantity == 0 {
            return;
        }
        *self.items.entry(name.into()).or_insert(0) += quantity;
    }

    /// Removes a single unit. Returns `false` when none was held.
    pub fn remove_one(&mut self, name: &str) -> bool {
        match self.items.get_mut(name) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.items.remove(name);
                true
            }
            None => false,
        }
    }

    pub fn count(&self, name: &str) -> u32 {
        self.items.get(name).copied().unwrap_or(0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.count(name) > 0
    }

    /// Case-insensitive lookup returning the stored name.
    pub fn find(&self, name: &str) -> Option<&str> {
        let wanted = name.trim();
        self.items
            .keys()
            .find(|stored| stored.eq_ignore_ascii_case(wanted))
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.items.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Drops every item `keep` rejects and returns how many units were removed.
    pub fn strip(&mut self, mut keep: impl FnMut(&str) -> bool) -> u32 {
        let mut removed = 0;
        self.items.retain(|name, count| {
            let kept = keep(name);
            if !kept {
                removed += *count;
            }
            kept
        });
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<(String, u32)> for Inventory {
    fn from_iter<T: IntoIterator<Item = (String, u32)>>(iter: T) -> Self {
        let mut inventory = Inventory::new();
        for (name, quantity) in iter {
            inventory.add(name, quantity);
        }
        inventory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_removes_units() {
        let mut inv = Inventory::new();
        inv.add("Potion", 2);
        assert!(inv.remove_one("Potion"));
        assert_eq!(inv.count("Potion"), 1);
        assert!(inv.remove_one("Potion"));
        assert!(!inv.contains("Potion"));
        assert!(!inv.remove_one("Potion"));
        assert!(inv.is_empty());
    }

    #[test]
    fn find_ignores_case() {
        let inv: Inventory = [("Iron Sword".to_string(), 1)].into_iter().collect();
        assert_eq!(inv.find("iron sword"), Some("Iron Sword"));
        assert_eq!(inv.find("wooden staff"), None);
    }

    #[test]
    fn strip_reports_removed_units() {
        let mut inv = Inventory::new();
        inv.add("Potion", 3);
        inv.add("Gold Coin", 10);
        let removed = inv.strip(|name| name == "Gold Coin");
        assert_eq!(removed, 3);
        assert_eq!(inv.iter().collect::<Vec<_>>(), vec![("Gold Coin", 10)]);
    }
}
