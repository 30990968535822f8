use crate::model::ids::QuestionId;

/// Ordered ids of the questions visited in the current run.
///
/// Append-only except for [`History::pop`], which drops the newest entry when
/// there is somewhere to go back to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    visited: Vec<QuestionId>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// History containing a single starting question.
    #[must_use]
    pub fn seeded(first: QuestionId) -> Self {
        Self {
            visited: vec![first],
        }
    }

    /// History rebuilt from a path recorded by the service.
    #[must_use]
    pub fn from_path(path: impl IntoIterator<Item = QuestionId>) -> Self {
        Self {
            visited: path.into_iter().collect(),
        }
    }

    pub fn push(&mut self, id: QuestionId) {
        self.visited.push(id);
    }

    /// Id that would become current after stepping back, without changing anything.
    #[must_use]
    pub fn previous_id(&self) -> Option<QuestionId> {
        if self.has_previous() {
            self.visited.get(self.visited.len() - 2).copied()
        } else {
            None
        }
    }

    /// Drop the newest entry and return the new newest one.
    ///
    /// No-op returning `None` when there are fewer than two entries.
    pub fn pop(&mut self) -> Option<QuestionId> {
        if !self.has_previous() {
            return None;
        }
        self.visited.pop();
        self.visited.last().copied()
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.visited.len() > 1
    }

    #[must_use]
    pub fn last(&self) -> Option<QuestionId> {
        self.visited.last().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.visited.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[QuestionId] {
        &self.visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<QuestionId> {
        raw.iter().copied().map(QuestionId::new).collect()
    }

    #[test]
    fn pop_is_noop_with_single_entry() {
        let mut history = History::seeded(QuestionId::new(1));
        assert!(!history.has_previous());
        assert_eq!(history.pop(), None);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn pop_twice_from_three_entries_leaves_one() {
        let mut history = History::from_path(ids(&[1, 2, 3]));
        assert_eq!(history.previous_id(), Some(QuestionId::new(2)));
        assert_eq!(history.pop(), Some(QuestionId::new(2)));
        assert_eq!(history.pop(), Some(QuestionId::new(1)));
        assert_eq!(history.as_slice(), ids(&[1]).as_slice());
        assert!(!history.has_previous());
    }

    #[test]
    fn push_appends_to_the_end() {
        let mut history = History::seeded(QuestionId::new(5));
        history.push(QuestionId::new(9));
        assert_eq!(history.last(), Some(QuestionId::new(9)));
        assert!(history.has_previous());
    }

    #[test]
    fn empty_history_has_no_previous() {
        let history = History::new();
        assert!(history.is_empty());
        assert_eq!(history.previous_id(), None);
    }
}
