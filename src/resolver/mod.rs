//! Module indirection: where do the resources of a root module actually live?

mod reference;
mod resolver;

pub use reference::{is_resolvable, normalize_lexically, normalize_source, ModuleReference};
pub use resolver::{ModuleResolution, ModuleResolver};
