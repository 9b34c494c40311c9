//! Wire text of the notebook protocol.
//!
//! Prompts and menus are plain ASCII written verbatim; clients script against
//! them, so they must match byte for byte.

pub use notebook_core::error::{STATUS_INVALID, STATUS_NO_GROUP, STATUS_NO_PAGE, STATUS_NO_SPACE};

/// Sent once, right after accept.
pub const GREETING: &str = "ADMIN role required, show me your cred:\n";

/// Longest credential line read from a client.
pub const MAX_CREDENTIAL_LEN: usize = 1024;

/// Sent before every command selector.
pub const MENU: &str = "[+] Notebook Manager\n\
                        [+] 1. Add a note\n\
                        [+] 2. Del a note\n\
                        [+] 3. Show a note\n\
                        [+] 4. Edit a note\n";

pub const PROMPT_SIZE: &str = "Enter the size of note\n> ";
pub const PROMPT_LEVEL: &str = "Enter the Security Level of note\n> ";
pub const PROMPT_DELETE_PAGE: &str = "Which page to delete:\n> ";
pub const PROMPT_SHOW_PAGE: &str = "Which page to read:\n> ";
pub const PROMPT_EDIT_PAGE: &str = "Which page to edit:\n> ";

/// A command selected from the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Add,
    Delete,
    Show,
    Edit,
}

impl Command {
    /// Map a menu selector. Anything else ends the session.
    pub fn from_selector(selector: i64) -> Option<Self> {
        match selector {
            1 => Some(Command::Add),
            2 => Some(Command::Delete),
            3 => Some(Command::Show),
            4 => Some(Command::Edit),
            _ => None,
        }
    }

    /// Page prompt for commands that address an existing note.
    pub fn page_prompt(&self) -> Option<&'static str> {
        match self {
            Command::Add => None,
            Command::Delete => Some(PROMPT_DELETE_PAGE),
            Command::Show => Some(PROMPT_SHOW_PAGE),
            Command::Edit => Some(PROMPT_EDIT_PAGE),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Add => "add",
            Command::Delete => "delete",
            Command::Show => "show",
            Command::Edit => "edit",
        }
    }
}
