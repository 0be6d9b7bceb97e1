//! Widget aggregate, its messages and naming rules.

mod aggregate;
mod commands;
mod events;
mod id;

pub use aggregate::{Widget, WidgetView};
pub use commands::{CreateWidget, DeleteWidget, GetWidget, ListWidgets, RenameWidget};
pub use events::{WidgetCreated, WidgetDeleted, WidgetRenamed};
pub use id::WidgetId;

/// Longest accepted widget name, in characters.
pub const MAX_NAME_LEN: usize = 64;

/// Checks a widget name against the naming rules.
pub fn check_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("name must not be empty".to_string());
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(format!("name must be at most {MAX_NAME_LEN} characters"));
    }
    Ok(())
}
