//! Interactive prompt selection.
//!
//! [`SelectionSession`] is a small state machine: it is either browsing the
//! category menu or inside one category's prompt menu. Each line of user input
//! is fed to [`SelectionSession::handle`], which updates the selection and
//! returns the lines to print plus an [`Action`] for the driver. No terminal
//! I/O happens here; see [`console`] for the stdin/stdout loop.

pub mod console;

use crate::models::{AddOutcome, SelectionEntry, SelectionList};
use crate::store::CategoryListing;

pub const BROWSING_PROMPT: &str =
    "Enter category number, 'v' to view selected prompts, 's' to save, or 'q' to quit: ";
pub const CONFIRM_SAVE_PROMPT: &str =
    "You have selected prompts. Do you want to save before quitting? (y/n): ";

const INVALID_CHOICE: &str = "Invalid choice. Please try again.";

/// Which menu the session is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Browsing,
    /// Index into the session catalog.
    InCategory(usize),
}

/// What the driver should do after printing a turn's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    /// Compose and persist the current selection, then keep going.
    Save,
    /// Ask whether to save, then exit.
    ConfirmSaveAndExit,
    Exit,
}

/// Output of one [`SelectionSession::handle`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub lines: Vec<String>,
    pub action: Action,
    /// Reprint the current menu once the action has run.
    pub show_menu: bool,
}

impl Turn {
    fn say(lines: Vec<String>) -> Self {
        Self {
            lines,
            action: Action::Continue,
            show_menu: false,
        }
    }

    fn with_menu(mut self) -> Self {
        self.show_menu = true;
        self
    }

    fn act(action: Action) -> Self {
        Self {
            lines: Vec::new(),
            action,
            show_menu: false,
        }
    }
}

/// Parsed user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Index(usize),
    View,
    Save,
    Quit,
    Back,
    Unknown,
}

impl Command {
    fn parse(input: &str) -> Self {
        let trimmed = input.trim().to_lowercase();
        match trimmed.as_str() {
            "v" => Self::View,
            "s" => Self::Save,
            "q" => Self::Quit,
            "b" => Self::Back,
            other => other
                .parse::<usize>()
                .ok()
                .filter(|n| *n >= 1)
                .map(Self::Index)
                .unwrap_or(Self::Unknown),
        }
    }
}

/// Selection state for one combine run.
#[derive(Debug, Clone)]
pub struct SelectionSession {
    catalog: Vec<CategoryListing>,
    selection: SelectionList,
    view: View,
}

impl SelectionSession {
    /// Start browsing `catalog` with an empty selection.
    pub fn new(catalog: Vec<CategoryListing>) -> Self {
        Self {
            catalog,
            selection: SelectionList::new(),
            view: View::Browsing,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn selection(&self) -> &SelectionList {
        &self.selection
    }

    pub fn catalog(&self) -> &[CategoryListing] {
        &self.catalog
    }

    /// Prompt text to show before reading the next line.
    pub fn input_prompt(&self) -> String {
        match self.view {
            View::Browsing => BROWSING_PROMPT.to_string(),
            View::InCategory(i) => format!(
                "Enter prompt number to select from {}, 'b' to go back: ",
                self.catalog[i].category.name
            ),
        }
    }

    /// Menu for the current view.
    pub fn menu(&self) -> Vec<String> {
        match self.view {
            View::Browsing => self.category_menu(),
            View::InCategory(i) => self.document_menu(i),
        }
    }

    fn category_menu(&self) -> Vec<String> {
        let mut lines = vec![String::new(), "=== Available Prompt Categories ===".to_string()];
        for (i, listing) in self.catalog.iter().enumerate() {
            lines.push(format!(
                "{}. {} ({} prompts)",
                i + 1,
                listing.category.display_name(),
                listing.documents.len()
            ));
        }
        lines.push(String::new());
        lines.push("To view prompts in a category, enter the category number.".to_string());
        lines.push("To exit, enter 'q'.".to_string());
        lines
    }

    fn document_menu(&self, index: usize) -> Vec<String> {
        let listing = &self.catalog[index];
        let mut lines = vec![
            String::new(),
            format!("=== Prompts in {} ===", listing.category.display_name()),
        ];
        for (i, doc) in listing.documents.iter().enumerate() {
            lines.push(format!("{}. {}", i + 1, doc.display_name()));
        }
        lines
    }

    /// Apply one line of input.
    pub fn handle(&mut self, input: &str) -> Turn {
        let command = Command::parse(input);
        match self.view {
            View::Browsing => self.handle_browsing(command),
            View::InCategory(i) => self.handle_in_category(i, command),
        }
    }

    fn handle_browsing(&mut self, command: Command) -> Turn {
        match command {
            Command::Index(n) if n <= self.catalog.len() => {
                self.view = View::InCategory(n - 1);
                Turn::say(self.document_menu(n - 1))
            }
            Command::View => Turn::say(self.describe_selection()).with_menu(),
            Command::Save if self.selection.is_empty() => Turn::say(vec![
                "No prompts selected. Please select at least one prompt before saving.".to_string(),
            ])
            .with_menu(),
            Command::Save => Turn::act(Action::Save).with_menu(),
            Command::Quit if self.selection.is_empty() => Turn::act(Action::Exit),
            Command::Quit => Turn::act(Action::ConfirmSaveAndExit),
            _ => Turn::say(vec![INVALID_CHOICE.to_string()]).with_menu(),
        }
    }

    fn handle_in_category(&mut self, index: usize, command: Command) -> Turn {
        let listing = &self.catalog[index];
        match command {
            Command::Back => {
                self.view = View::Browsing;
                Turn::say(Vec::new()).with_menu()
            }
            Command::Index(n) if n <= listing.documents.len() => {
                let doc = &listing.documents[n - 1];
                let entry = SelectionEntry {
                    category: listing.category.name.clone(),
                    name: doc.name.clone(),
                    path: doc.path.clone(),
                };
                let line = match self.selection.add(entry) {
                    AddOutcome::Added => {
                        tracing::debug!("Selected {}/{}", listing.category.name, doc.name);
                        format!("Added '{}' to selected prompts.", doc.name)
                    }
                    AddOutcome::AlreadySelected => {
                        format!("Prompt '{}' is already selected.", doc.name)
                    }
                };
                Turn::say(vec![line])
            }
            _ => Turn::say(vec![INVALID_CHOICE.to_string()]).with_menu(),
        }
    }

    fn describe_selection(&self) -> Vec<String> {
        if self.selection.is_empty() {
            return vec!["No prompts selected yet.".to_string()];
        }
        let mut lines = vec![String::new(), "=== Selected Prompts ===".to_string()];
        for (i, entry) in self.selection.entries().iter().enumerate() {
            lines.push(format!(
                "{}. [{}] {}",
                i + 1,
                entry.category,
                crate::models::display_name(&entry.name)
            ));
        }
        lines
    }
}
