use crate::domain::todo::NewTodo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveField { #[default] Title, Description }

/// Buffers for the create screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateForm {
    pub title: String,
    pub description: String,
    pub field: ActiveField,
}

impl CreateForm {
    pub fn switch_field(&mut self) {
        self.field = match self.field { ActiveField::Title => ActiveField::Description, ActiveField::Description => ActiveField::Title };
    }

    pub fn push(&mut self, c: char) {
        match self.field { ActiveField::Title => self.title.push(c), ActiveField::Description => self.description.push(c) }
    }

    pub fn pop(&mut self) {
        match self.field { ActiveField::Title => { self.title.pop(); } ActiveField::Description => { self.description.pop(); } }
    }

    /// `None` while the title is blank.
    pub fn submit(&self) -> Option<NewTodo> {
        let title = self.title.trim();
        if title.is_empty() { return None; }
        Some(NewTodo { title: title.to_string(), description: self.description.trim().to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_goes_to_active_field() {
        let mut form = CreateForm::default();
        "Buy".chars().for_each(|c| form.push(c));
        form.switch_field();
        "milk!".chars().for_each(|c| form.push(c));
        form.pop();
        assert_eq!(form.title, "Buy");
        assert_eq!(form.description, "milk");
    }

    #[test]
    fn blank_title_is_not_submitted() {
        let mut form = CreateForm { title: "   ".into(), ..CreateForm::default() };
        assert_eq!(form.submit(), None);
        form.title = " Walk dog ".into();
        form.description = " at 6 ".into();
        assert_eq!(form.submit(), Some(NewTodo { title: "Walk dog".into(), description: "at 6".into() }));
    }
}
