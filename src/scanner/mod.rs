mod inventory;
mod scanner;

pub use inventory::{FileInventory, FileKind};
pub use scanner::{RepositoryScanner, ScanConfig};
