use std::collections::VecDeque;
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent};

use crate::application::store::Snapshot;
use crate::domain::todo::{ListFilter, NewTodo, TodoId, TodoUpdate};
use crate::view::detail::DetailView;
use crate::view::form::CreateForm;
use crate::view::list::ListView;

/// Work the event loop must start on behalf of a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Quit,
    LoadList(ListFilter),
    OpenDetail(TodoId),
    Create(NewTodo, ListFilter),
    Delete(TodoId, ListFilter),
    Save(TodoId, TodoUpdate),
    UploadCover(TodoId, PathBuf),
    DismissError,
}

/// Completions reported back by spawned work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    CoverSettled { id: TodoId, succeeded: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    List,
    Detail(DetailView),
    Create(CreateForm),
}

pub struct App {
    pub list: ListView,
    pub screen: Screen,
    /// Path being typed for a cover upload.
    pub cover_prompt: Option<String>,
    /// Errors waiting to be acknowledged, oldest first.
    pub notices: VecDeque<String>,
}

impl App {
    /// A fresh app on the list screen plus the load it needs on mount.
    pub fn new() -> (Self, Vec<Effect>) {
        let app = Self { list: ListView::default(), screen: Screen::List, cover_prompt: None, notices: VecDeque::new() };
        (app, vec![Effect::LoadList(ListFilter::All)])
    }

    pub fn push_notice(&mut self, message: String) { self.notices.push_back(message); }

    pub fn on_event(&mut self, event: UiEvent, snap: &Snapshot) {
        match event {
            UiEvent::CoverSettled { id, succeeded } => {
                if let Screen::Detail(view) = &mut self.screen {
                    if view.route() == id { view.finish_upload(succeeded, snap.current_detail()); }
                }
            }
        }
    }

    /// Brings local view state in line with the latest snapshot. Call once per frame.
    pub fn sync(&mut self, snap: &Snapshot) {
        self.list.clamp(snap.todos.len());
        if let Screen::Detail(view) = &mut self.screen { view.sync(snap.current_detail()); }
    }

    pub fn handle_key(&mut self, key: KeyEvent, snap: &Snapshot) -> Vec<Effect> {
        if !self.notices.is_empty() {
            self.notices.pop_front();
            return if self.notices.is_empty() { vec![Effect::DismissError] } else { vec![] };
        }
        if self.cover_prompt.is_some() { return self.cover_prompt_key(key); }
        match self.screen {
            Screen::List => self.list_key(key, snap),
            Screen::Detail(_) => self.detail_key(key, snap),
            Screen::Create(_) => self.create_key(key),
        }
    }

    fn list_key(&mut self, key: KeyEvent, snap: &Snapshot) -> Vec<Effect> {
        match key.code {
            KeyCode::Char('q') => vec![Effect::Quit],
            KeyCode::Up | KeyCode::Char('k') => { self.list.up(); vec![] }
            KeyCode::Down | KeyCode::Char('j') => { self.list.down(snap.todos.len()); vec![] }
            KeyCode::Char('r') => vec![Effect::LoadList(self.list.filter)],
            KeyCode::Char('f') => vec![Effect::LoadList(self.list.cycle_filter())],
            KeyCode::Char('n') => { self.screen = Screen::Create(CreateForm::default()); vec![] }
            KeyCode::Char('d') => match self.list.selected_id(snap) {
                Some(id) => vec![Effect::Delete(id, self.list.filter)],
                None => vec![],
            },
            KeyCode::Enter => match self.list.selected_id(snap) {
                Some(id) => { self.screen = Screen::Detail(DetailView::open(id)); vec![Effect::OpenDetail(id)] }
                None => vec![],
            },
            _ => vec![],
        }
    }

    fn detail_key(&mut self, key: KeyEvent, snap: &Snapshot) -> Vec<Effect> {
        let Screen::Detail(view) = &mut self.screen else { return vec![] };
        if view.editing {
            return match key.code {
                KeyCode::Esc => { view.cancel_edit(); vec![] }
                KeyCode::Tab => { view.next_field(); vec![] }
                KeyCode::Backspace => { view.pop(); vec![] }
                KeyCode::Enter => view.save().map(|(id, update)| vec![Effect::Save(id, update)]).unwrap_or_default(),
                KeyCode::Char(c) => { view.push(c); vec![] }
                _ => vec![],
            };
        }
        match key.code {
            KeyCode::Char('q') => vec![Effect::Quit],
            KeyCode::Esc | KeyCode::Backspace => {
                self.screen = Screen::List;
                vec![Effect::LoadList(self.list.filter)]
            }
            KeyCode::Char('e') => { view.toggle_edit(); vec![] }
            KeyCode::Char('c') => {
                if view.shown().is_some() && !view.uploading { self.cover_prompt = Some(String::new()); }
                vec![]
            }
            KeyCode::Left | KeyCode::Right => {
                let forward = key.code == KeyCode::Right;
                match ListView::neighbour(snap, view.route(), forward) {
                    Some(id) if view.navigate(id) => vec![Effect::OpenDetail(id)],
                    _ => vec![],
                }
            }
            _ => vec![],
        }
    }

    fn create_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let Screen::Create(form) = &mut self.screen else { return vec![] };
        match key.code {
            KeyCode::Esc => { self.screen = Screen::List; vec![] }
            KeyCode::Tab => { form.switch_field(); vec![] }
            KeyCode::Backspace => { form.pop(); vec![] }
            KeyCode::Enter => match form.submit() {
                Some(new) => {
                    self.screen = Screen::List;
                    vec![Effect::Create(new, self.list.filter)]
                }
                None => vec![],
            },
            KeyCode::Char(c) => { form.push(c); vec![] }
            _ => vec![],
        }
    }

    fn cover_prompt_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let Some(path) = self.cover_prompt.as_mut() else { return vec![] };
        match key.code {
            KeyCode::Esc => { self.cover_prompt = None; vec![] }
            KeyCode::Backspace => { path.pop(); vec![] }
            KeyCode::Char(c) => { path.push(c); vec![] }
            KeyCode::Enter => {
                let path = PathBuf::from(path.trim());
                self.cover_prompt = None;
                let Screen::Detail(view) = &mut self.screen else { return vec![] };
                if path.as_os_str().is_empty() { return vec![]; }
                let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                view.select_cover(file_name);
                vec![Effect::UploadCover(view.route(), path)]
            }
            _ => vec![],
        }
    }
}
