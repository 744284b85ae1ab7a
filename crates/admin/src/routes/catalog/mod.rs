//! Create, edit and delete pages for the catalog: categories, items and
//! coupons.
//!
//! Invalid submissions re-render the form with the staff member's input and
//! the problems found. Successful changes flash a message and return to the
//! list.

pub mod categories;
pub mod coupons;
pub mod items;

use crate::db::RepositoryError;
use crate::error::AppError;

/// Heading, target and errors of a create or edit form.
#[derive(Debug, Clone, Default)]
pub struct FormPage {
    pub heading: String,
    /// Form `action` URL.
    pub action: String,
    /// Delete `action` URL, shown on edit forms.
    pub delete_action: Option<String>,
    pub errors: Vec<String>,
}

impl FormPage {
    /// A create form posting to the list URL.
    #[must_use]
    pub fn create(noun: &str, list_path: &str) -> Self {
        Self {
            heading: format!("Add {noun}"),
            action: list_path.to_owned(),
            delete_action: None,
            errors: Vec::new(),
        }
    }

    /// An edit form for the record at `record_path`.
    #[must_use]
    pub fn edit(noun: &str, record_path: String) -> Self {
        Self {
            heading: format!("Change {noun}"),
            delete_action: Some(format!("{record_path}/delete")),
            action: record_path,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }
}

/// Split a repository failure into a form error to show, or an `AppError`.
pub(crate) fn form_error(err: RepositoryError) -> Result<Vec<String>, AppError> {
    match err {
        RepositoryError::Conflict(what) => Ok(vec![sentence(&what)]),
        other => Err(other.into()),
    }
}

fn sentence(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        format!("{}{}.", first.to_uppercase(), chars.as_str())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_form_links_delete() {
        let page = FormPage::edit("item", "/items/7".to_owned());
        assert_eq!(page.heading, "Change item");
        assert_eq!(page.action, "/items/7");
        assert_eq!(page.delete_action.as_deref(), Some("/items/7/delete"));
    }

    #[test]
    fn test_conflict_becomes_form_error() {
        let errors = form_error(RepositoryError::Conflict("slug already exists".to_owned())).unwrap();
        assert_eq!(errors, vec!["Slug already exists.".to_owned()]);
        assert!(form_error(RepositoryError::NotFound).is_err());
    }
}
