//! Table models. Column names are the external schema; see [`crate::naming`].

pub mod budgets;
pub mod expense_categories;
pub mod expenses;
pub mod pets;
pub mod settings;
pub mod user_category_preferences;
