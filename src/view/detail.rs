use uuid::Uuid;

use crate::domain::todo::{Todo, TodoId, TodoUpdate};

/// A picked file shown before the server has accepted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPreview {
    /// Ephemeral handle, never sent to the server.
    pub handle: String,
    pub file_name: String,
}

/// Cover shown on the detail screen: pending local preview, then the server's reference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CoverPreview {
    #[default]
    Absent,
    Pending(LocalPreview),
    Confirmed(String),
}

impl CoverPreview {
    fn from_remote(cover: Option<&str>) -> Self {
        cover.map_or(CoverPreview::Absent, |url| CoverPreview::Confirmed(url.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DraftField { #[default] Title, Description, Status }

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub description: String,
    pub is_finished: bool,
}

impl Draft {
    fn of(todo: &Todo) -> Self {
        Self { title: todo.title.clone(), description: todo.description.clone(), is_finished: todo.is_finished }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    route: TodoId,
    seen: Option<Todo>,
    pub editing: bool,
    pub draft: Draft,
    pub field: DraftField,
    pub cover: CoverPreview,
    pub uploading: bool,
}

impl DetailView {
    pub fn open(route: TodoId) -> Self {
        Self {
            route,
            seen: None,
            editing: false,
            draft: Draft::default(),
            field: DraftField::default(),
            cover: CoverPreview::Absent,
            uploading: false,
        }
    }

    pub fn route(&self) -> TodoId { self.route }

    /// Moves to another task, dropping every local buffer. Returns whether a fetch is needed.
    pub fn navigate(&mut self, route: TodoId) -> bool {
        if route == self.route { return false; }
        *self = Self::open(route);
        true
    }

    /// Takes in the detail currently held by the store. A task for another route is ignored.
    pub fn sync(&mut self, detail: Option<&Todo>) {
        let Some(todo) = detail.filter(|t| t.id == self.route) else { return };
        if self.seen.as_ref() == Some(todo) { return; }
        if !self.editing { self.draft = Draft::of(todo); }
        if !matches!(self.cover, CoverPreview::Pending(_)) { self.cover = CoverPreview::from_remote(todo.cover.as_deref()); }
        self.seen = Some(todo.clone());
    }

    pub fn shown(&self) -> Option<&Todo> { self.seen.as_ref() }

    pub fn toggle_edit(&mut self) {
        if self.editing { self.cancel_edit(); } else if self.seen.is_some() { self.editing = true; self.field = DraftField::Title; }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = false;
        self.draft = self.seen.as_ref().map(Draft::of).unwrap_or_default();
    }

    /// Leaves edit mode and hands back the values to send.
    pub fn save(&mut self) -> Option<(TodoId, TodoUpdate)> {
        if !self.editing { return None; }
        self.editing = false;
        let Draft { title, description, is_finished } = self.draft.clone();
        Some((self.route, TodoUpdate { title, description, is_finished }))
    }

    pub fn next_field(&mut self) {
        self.field = match self.field { DraftField::Title => DraftField::Description, DraftField::Description => DraftField::Status, DraftField::Status => DraftField::Title };
    }

    pub fn push(&mut self, c: char) {
        match self.field {
            DraftField::Title => self.draft.title.push(c),
            DraftField::Description => self.draft.description.push(c),
            DraftField::Status => if c == ' ' { self.draft.is_finished = !self.draft.is_finished },
        }
    }

    pub fn pop(&mut self) {
        match self.field {
            DraftField::Title => { self.draft.title.pop(); }
            DraftField::Description => { self.draft.description.pop(); }
            DraftField::Status => {}
        }
    }

    /// Shows `file_name` right away and marks an upload as running.
    pub fn select_cover(&mut self, file_name: impl Into<String>) -> LocalPreview {
        let preview = LocalPreview { handle: format!("blob:{}", Uuid::new_v4()), file_name: file_name.into() };
        self.uploading = true;
        self.cover = CoverPreview::Pending(preview.clone());
        preview
    }

    /// Ends an upload. On success the store's detail supersedes the preview; on failure the
    /// last confirmed cover comes back.
    pub fn finish_upload(&mut self, succeeded: bool, detail: Option<&Todo>) {
        self.uploading = false;
        let detail = detail.filter(|t| t.id == self.route);
        if succeeded {
            if let Some(todo) = detail {
                self.seen = None;
                self.cover = CoverPreview::Absent;
                self.sync(Some(todo));
                return;
            }
        }
        self.cover = CoverPreview::from_remote(self.seen.as_ref().and_then(|t| t.cover.as_deref()));
    }

    pub fn upload_label(&self) -> &'static str {
        if self.uploading { "Uploading..." } else { "Update Cover" }
    }

    pub fn edit_label(&self) -> &'static str {
        if self.editing { "Cancel Edit" } else { "Edit" }
    }
}
