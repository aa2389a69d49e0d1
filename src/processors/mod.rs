//! Built-in processors registered by [crate::ExtensionRegistry::with_builtins].

mod replace_text;
mod route_on_parity;
mod update_attribute;

pub use replace_text::ReplaceText;
pub use route_on_parity::{ROUTE_TO_FAILURE_ON, RouteOnParity};
pub use update_attribute::UpdateAttribute;
