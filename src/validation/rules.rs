use crate::hcl::BlockCounts;
use anyhow::Result;

/// Original and proposed content of one file, with their block counts
pub struct FileComparison<'a> {
    pub original: &'a str,
    pub proposed: &'a str,
    pub original_blocks: BlockCounts,
    pub proposed_blocks: BlockCounts,
}

impl<'a> FileComparison<'a> {
    pub fn new(original: &'a str, proposed: &'a str) -> Self {
        Self {
            original,
            proposed,
            original_blocks: BlockCounts::of(original),
            proposed_blocks: BlockCounts::of(proposed),
        }
    }

    /// True when the original declared `kind` and the proposal declares none
    fn dropped(&self, kind: &str) -> bool {
        self.original_blocks.has(kind) && !self.proposed_blocks.has(kind)
    }
}

/// One structural-loss check. An `Err` carries the rejection reason.
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, comparison: &FileComparison<'_>) -> Result<()>;
}

pub struct ModuleCountRule;

impl ValidationRule for ModuleCountRule {
    fn name(&self) -> &'static str {
        "ModuleCount"
    }

    fn validate(&self, comparison: &FileComparison<'_>) -> Result<()> {
        let before = comparison.original_blocks.count("module");
        let after = comparison.proposed_blocks.count("module");
        if before > 1 && after < before {
            anyhow::bail!("Removed {} module block(s)", before - after);
        }
        Ok(())
    }
}

pub struct BackendBlockRule;

impl ValidationRule for BackendBlockRule {
    fn name(&self) -> &'static str {
        "BackendBlock"
    }

    fn validate(&self, comparison: &FileComparison<'_>) -> Result<()> {
        if comparison.dropped("terraform") {
            anyhow::bail!("Removed terraform backend configuration");
        }
        Ok(())
    }
}

pub struct ProviderBlockRule;

impl ValidationRule for ProviderBlockRule {
    fn name(&self) -> &'static str {
        "ProviderBlock"
    }

    fn validate(&self, comparison: &FileComparison<'_>) -> Result<()> {
        if comparison.dropped("provider") {
            anyhow::bail!("Removed provider configuration");
        }
        Ok(())
    }
}

pub struct VariablesRule;

impl ValidationRule for VariablesRule {
    fn name(&self) -> &'static str {
        "Variables"
    }

    fn validate(&self, comparison: &FileComparison<'_>) -> Result<()> {
        if comparison.dropped("variable") {
            anyhow::bail!("Removed variable definitions");
        }
        Ok(())
    }
}

pub struct OutputsRule;

impl ValidationRule for OutputsRule {
    fn name(&self) -> &'static str {
        "Outputs"
    }

    fn validate(&self, comparison: &FileComparison<'_>) -> Result<()> {
        if comparison.dropped("output") {
            anyhow::bail!("Removed output definitions");
        }
        Ok(())
    }
}

pub struct ResourcesRule;

impl ValidationRule for ResourcesRule {
    fn name(&self) -> &'static str {
        "Resources"
    }

    fn validate(&self, comparison: &FileComparison<'_>) -> Result<()> {
        if comparison.dropped("resource") {
            anyhow::bail!("Removed resource definitions");
        }
        Ok(())
    }
}

/// Rejects rewrites that shrink a file below `min_ratio` of its original
/// length, measured in characters. An empty original counts as ratio 0.
pub struct SizeRatioRule {
    pub min_ratio: f64,
}

impl ValidationRule for SizeRatioRule {
    fn name(&self) -> &'static str {
        "SizeRatio"
    }

    fn validate(&self, comparison: &FileComparison<'_>) -> Result<()> {
        let original = comparison.original.chars().count();
        let ratio = if original == 0 {
            0.0
        } else {
            comparison.proposed.chars().count() as f64 / original as f64
        };
        if ratio < self.min_ratio {
            let reduced = ((1.0 - ratio) * 100.0) as u32;
            anyhow::bail!("File size reduced by {}% (likely truncated)", reduced);
        }
        Ok(())
    }
}
