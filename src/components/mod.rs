//! UI Components
//!
//! Leptos components for the checklist views.

mod add_item_form;
mod grocery_list;
mod login;
mod title_bar;

pub use add_item_form::AddItemForm;
pub use grocery_list::GroceryList;
pub use login::Login;
pub use title_bar::TitleBar;
