mod navigation;
mod paginated_table;
mod rule_form;

pub use navigation::*;
pub use paginated_table::*;
pub use rule_form::*;
