use crate::application::store::Snapshot;
use crate::domain::todo::{ListFilter, TodoId};

/// Selection and filter for the list screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListView {
    pub selected: usize,
    pub filter: ListFilter,
}

impl ListView {
    pub fn up(&mut self) { self.selected = self.selected.saturating_sub(1); }

    pub fn down(&mut self, len: usize) { if self.selected + 1 < len { self.selected += 1; } }

    /// Keeps the cursor inside a list that may have shrunk since the last frame.
    pub fn clamp(&mut self, len: usize) { if self.selected >= len { self.selected = len.saturating_sub(1); } }

    pub fn cycle_filter(&mut self) -> ListFilter {
        self.filter = self.filter.next();
        self.selected = 0;
        self.filter
    }

    pub fn selected_id(&self, snap: &Snapshot) -> Option<TodoId> { snap.todos.get(self.selected).map(|t| t.id) }

    /// Id next to `current` in list order, used to page through details.
    pub fn neighbour(snap: &Snapshot, current: TodoId, forward: bool) -> Option<TodoId> {
        let pos = snap.todos.iter().position(|t| t.id == current)?;
        let next = if forward { pos.checked_add(1)? } else { pos.checked_sub(1)? };
        snap.todos.get(next).map(|t| t.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::todo::TodoSummary;

    fn snap(ids: &[i64]) -> Snapshot {
        Snapshot {
            todos: ids.iter().map(|&id| TodoSummary { id: TodoId(id), title: format!("t{id}"), is_finished: false, created_at: None }).collect(),
            ..Snapshot::default()
        }
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut view = ListView::default();
        view.up();
        assert_eq!(view.selected, 0);
        view.down(2);
        view.down(2);
        assert_eq!(view.selected, 1);
        view.clamp(1);
        assert_eq!(view.selected, 0);
        view.clamp(0);
        assert_eq!(view.selected, 0);
    }

    #[test]
    fn selection_maps_to_ids() {
        let s = snap(&[5, 9]);
        let mut view = ListView::default();
        view.down(2);
        assert_eq!(view.selected_id(&s), Some(TodoId(9)));
        assert_eq!(view.selected_id(&snap(&[])), None);
    }

    #[test]
    fn neighbours_follow_list_order() {
        let s = snap(&[1, 2, 3]);
        assert_eq!(ListView::neighbour(&s, TodoId(2), true), Some(TodoId(3)));
        assert_eq!(ListView::neighbour(&s, TodoId(2), false), Some(TodoId(1)));
        assert_eq!(ListView::neighbour(&s, TodoId(1), false), None);
        assert_eq!(ListView::neighbour(&s, TodoId(3), true), None);
        assert_eq!(ListView::neighbour(&s, TodoId(7), true), None);
    }

    #[test]
    fn filter_change_resets_cursor() {
        let mut view = ListView { selected: 4, filter: ListFilter::All };
        assert_eq!(view.cycle_filter(), ListFilter::Pending);
        assert_eq!(view.selected, 0);
    }
}
