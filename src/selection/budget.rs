use serde::Serialize;
use std::collections::BTreeMap;

const DEFAULT_MAX_FILES: usize = 50;
const DEFAULT_MAX_TOTAL_CHARS: usize = 200_000;

/// Caps on what is fed downstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionLimits {
    pub max_files: usize,
    /// Combined budget in Unicode scalar values
    pub max_total_chars: usize,
}

impl Default for SelectionLimits {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_total_chars: DEFAULT_MAX_TOTAL_CHARS,
        }
    }
}

/// Candidate contents that fit the budget, keyed by repository-relative path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadedContents {
    /// Paths in the order they were admitted
    pub order: Vec<String>,
    pub contents: BTreeMap<String, String>,
    pub total_chars: usize,
    /// True when the last admitted file was cut short
    pub truncated: bool,
}

/// Admits file contents one at a time until the character budget runs out.
///
/// The file that crosses the budget is cut to exactly the remaining
/// characters; nothing is admitted after that.
#[derive(Debug)]
pub struct ContextBudget {
    remaining: usize,
    loaded: LoadedContents,
}

impl ContextBudget {
    pub fn new(max_total_chars: usize) -> Self {
        Self {
            remaining: max_total_chars,
            loaded: LoadedContents::default(),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Returns false (and admits nothing) once the budget is exhausted
    pub fn admit(&mut self, path: String, content: &str) -> bool {
        if self.is_exhausted() {
            return false;
        }

        let len = content.chars().count();
        let admitted = if len > self.remaining {
            self.loaded.truncated = true;
            content.chars().take(self.remaining).collect()
        } else {
            content.to_string()
        };

        let taken = len.min(self.remaining);
        self.remaining -= taken;
        self.loaded.total_chars += taken;
        self.loaded.order.push(path.clone());
        self.loaded.contents.insert(path, admitted);
        true
    }

    pub fn finish(self) -> LoadedContents {
        self.loaded
    }
}
