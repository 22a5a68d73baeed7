use crate::scanner::FileInventory;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Selection strategies in priority order. The first one producing a
/// non-empty set decides the candidates; tiers never merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionTier {
    /// Files naming an affected resource, plus their directory siblings
    ResourceNameMatch,
    /// Files mentioning the resource type (only when identifiers were given)
    ResourceTypeMatch,
    /// Module internals plus root wiring
    ModuleFallback,
    /// Every definition file
    AllDefinitions,
}

impl SelectionTier {
    pub const ORDER: [SelectionTier; 4] = [
        SelectionTier::ResourceNameMatch,
        SelectionTier::ResourceTypeMatch,
        SelectionTier::ModuleFallback,
        SelectionTier::AllDefinitions,
    ];

    pub fn rank(&self) -> u8 {
        match self {
            SelectionTier::ResourceNameMatch => 1,
            SelectionTier::ResourceTypeMatch => 2,
            SelectionTier::ModuleFallback => 3,
            SelectionTier::AllDefinitions => 4,
        }
    }

    /// Candidate files for this tier, or `None` when it has nothing to offer
    pub fn select(
        &self,
        sets: &MatchSets,
        inventory: &FileInventory,
        has_identifiers: bool,
    ) -> Option<Vec<PathBuf>> {
        let files = match self {
            SelectionTier::ResourceNameMatch => {
                let dirs: HashSet<&Path> = sets
                    .matched_files
                    .iter()
                    .filter_map(|p| p.parent())
                    .collect();
                let siblings = inventory
                    .definition_files
                    .iter()
                    .filter(|p| p.parent().map(|d| dirs.contains(d)).unwrap_or(false));
                merge(&sets.matched_files, siblings)
            }
            SelectionTier::ResourceTypeMatch if has_identifiers => sets.related_files.clone(),
            SelectionTier::ResourceTypeMatch => Vec::new(),
            SelectionTier::ModuleFallback => {
                if sets.module_files.is_empty() {
                    Vec::new()
                } else {
                    merge(&sets.module_files, inventory.root_definition_files().iter())
                }
            }
            SelectionTier::AllDefinitions => inventory.definition_files.clone(),
        };

        (!files.is_empty()).then_some(files)
    }
}

impl fmt::Display for SelectionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectionTier::ResourceNameMatch => "resource-name match",
            SelectionTier::ResourceTypeMatch => "resource-type match",
            SelectionTier::ModuleFallback => "module fallback",
            SelectionTier::AllDefinitions => "all definition files",
        };
        write!(f, "tier {} ({})", self.rank(), name)
    }
}

/// The raw match results every tier draws from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSets {
    /// Definition files containing an affected-resource identifier verbatim
    pub matched_files: Vec<PathBuf>,
    /// Definition and manifest files mentioning the resource type
    pub related_files: Vec<PathBuf>,
    /// Module files after the resource-type restriction
    pub module_files: Vec<PathBuf>,
}

/// Ordered candidate paths and the tier that produced them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateSet {
    pub tier: SelectionTier,
    pub files: Vec<PathBuf>,
}

impl CandidateSet {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn merge<'a>(head: &[PathBuf], tail: impl Iterator<Item = &'a PathBuf>) -> Vec<PathBuf> {
    let mut seen: HashSet<&Path> = head.iter().map(PathBuf::as_path).collect();
    let mut out = head.to_vec();
    for path in tail {
        if seen.insert(path.as_path()) {
            out.push(path.clone());
        }
    }
    out
}
