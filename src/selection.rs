//! Ordered, bounded set of selected catalog ids

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Adding would exceed the configured maximum
    #[error("you can only select up to {max} items to mix")]
    Full { max: usize },
}

/// What a successful toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

/// Distinct ids in the order they were picked, bounded by
/// `[min_select, max_select]`.
///
/// `max_select` limits [`toggle`](Self::toggle); `min_select` gates
/// [`can_combine`](Self::can_combine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    ids: Vec<String>,
    min_select: usize,
    max_select: Option<usize>,
}

impl SelectionSet {
    /// `max_select` of `None` means unbounded.
    pub fn new(min_select: usize, max_select: Option<usize>) -> Self {
        Self { ids: Vec::new(), min_select, max_select }
    }

    /// Remove `id` if present, otherwise add it at the end.
    ///
    /// Adding to a full set is rejected and leaves the set unchanged.
    pub fn toggle(&mut self, id: &str) -> Result<Toggle, SelectionError> {
        if let Some(pos) = self.ids.iter().position(|s| s == id) {
            self.ids.remove(pos);
            return Ok(Toggle::Removed);
        }

        if let Some(max) = self.max_select {
            if self.ids.len() >= max {
                return Err(SelectionError::Full { max });
            }
        }

        self.ids.push(id.to_string());
        Ok(Toggle::Added)
    }

    pub fn can_combine(&self) -> bool {
        let n = self.ids.len();
        n >= self.min_select && self.max_select.map_or(true, |max| n <= max)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Keep only ids for which `keep` returns true. Returns how many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| keep(id));
        before - self.ids.len()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn min_select(&self) -> usize {
        self.min_select
    }

    pub fn max_select(&self) -> Option<usize> {
        self.max_select
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_toggle_adds_and_removes_in_order() {
        let mut set = SelectionSet::new(2, Some(3));
        assert_eq!(set.toggle("a"), Ok(Toggle::Added));
        assert_eq!(set.toggle("b"), Ok(Toggle::Added));
        assert_eq!(set.toggle("c"), Ok(Toggle::Added));
        assert_eq!(set.toggle("b"), Ok(Toggle::Removed));
        assert_eq!(set.ids(), &["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_capacity_rejected() {
        let mut set = SelectionSet::new(2, Some(3));
        for id in ["a", "b", "c"] {
            set.toggle(id).unwrap();
        }
        assert_eq!(set.toggle("d"), Err(SelectionError::Full { max: 3 }));
        assert_eq!(set.len(), 3);
        assert!(!set.contains("d"));
        // Removing still works at capacity
        assert_eq!(set.toggle("a"), Ok(Toggle::Removed));
    }

    #[test]
    fn test_can_combine_bounds() {
        let mut set = SelectionSet::new(2, Some(3));
        assert!(!set.can_combine());
        set.toggle("a").unwrap();
        assert!(!set.can_combine());
        set.toggle("b").unwrap();
        assert!(set.can_combine());

        let mut open = SelectionSet::new(1, None);
        assert!(!open.can_combine());
        for i in 0..50 {
            open.toggle(&i.to_string()).unwrap();
        }
        assert!(open.can_combine());
    }

    #[test]
    fn test_clear_and_retain() {
        let mut set = SelectionSet::new(1, None);
        for id in ["a", "b", "c"] {
            set.toggle(id).unwrap();
        }
        assert_eq!(set.retain(|id| id != "b"), 1);
        assert_eq!(set.ids(), &["a".to_string(), "c".to_string()]);
        set.clear();
        assert!(set.is_empty());
    }

    proptest! {
        #[test]
        fn prop_toggle_twice_is_identity(
            picks in proptest::collection::vec(0u8..8, 0..6),
            target in 0u8..8,
            max in 1usize..6,
        ) {
            let mut set = SelectionSet::new(1, Some(max));
            for p in picks {
                let _ = set.toggle(&p.to_string());
            }
            let before = set.clone();
            let id = target.to_string();
            let was_selected = set.contains(&id);
            if set.toggle(&id).is_ok() {
                set.toggle(&id).unwrap();
            }
            if was_selected {
                // Re-adding appends, so only membership is restored.
                let mut now = set.ids().to_vec();
                let mut then = before.ids().to_vec();
                now.sort();
                then.sort();
                prop_assert_eq!(now, then);
            } else {
                prop_assert_eq!(set, before);
            }
        }

        #[test]
        fn prop_full_set_rejects_new_ids(max in 1usize..6, extra in 100u32..200) {
            let mut set = SelectionSet::new(1, Some(max));
            for i in 0..max {
                set.toggle(&i.to_string()).unwrap();
            }
            let before = set.clone();
            prop_assert_eq!(set.toggle(&extra.to_string()), Err(SelectionError::Full { max }));
            prop_assert_eq!(set, before);
        }
    }
}
