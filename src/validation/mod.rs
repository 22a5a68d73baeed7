pub mod rules;
pub mod validator;

pub use rules::{FileComparison, ValidationRule};
pub use validator::{ChangeValidator, ValidationPolicy, ValidationVerdict};
