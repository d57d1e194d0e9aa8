//! Catalog of known tools.
//!
//! Tools are never stored; a tool exists while it owns at least one record. The
//! registry only adds presentation data (display name, category) on top of the
//! ids found in the store, and derives a sensible entry for ids it has never seen.

use crate::libs::error::StoreError;
use crate::libs::store::StoreAdapter;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    Calculator,
    Converter,
    Text,
    Career,
    Health,
    Productivity,
    Other,
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToolCategory::Calculator => "Calculator",
            ToolCategory::Converter => "Converter",
            ToolCategory::Text => "Text",
            ToolCategory::Career => "Career",
            ToolCategory::Health => "Health",
            ToolCategory::Productivity => "Productivity",
            ToolCategory::Other => "Other",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub id: String,
    pub name: String,
    pub category: ToolCategory,
}

impl ToolDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: ToolCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
        }
    }

    /// Entry for an id the registry does not know: `"unit-converter"` becomes `"Unit Converter"`.
    pub fn derived(id: &str) -> Self {
        Self::new(id, title_case(id), ToolCategory::Other)
    }
}

const BUILTIN_TOOLS: &[(&str, &str, ToolCategory)] = &[
    ("calc", "Calculator", ToolCategory::Calculator),
    ("scientific-calculator", "Scientific Calculator", ToolCategory::Calculator),
    ("loan-calculator", "Loan Calculator", ToolCategory::Calculator),
    ("unit-converter", "Unit Converter", ToolCategory::Converter),
    ("currency-converter", "Currency Converter", ToolCategory::Converter),
    ("notes", "Notes", ToolCategory::Text),
    ("word-counter", "Word Counter", ToolCategory::Text),
    ("password-generator", "Password Generator", ToolCategory::Text),
    ("resume-builder", "Resume Builder", ToolCategory::Career),
    ("job-tracker", "Job Tracker", ToolCategory::Career),
    ("bmi-calculator", "BMI Calculator", ToolCategory::Health),
    ("water-tracker", "Water Tracker", ToolCategory::Health),
    ("pomodoro", "Pomodoro Timer", ToolCategory::Productivity),
    ("todo", "To-Do List", ToolCategory::Productivity),
];

#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolDescriptor>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the tools shipped with the application.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (id, name, category) in BUILTIN_TOOLS {
            registry.register(ToolDescriptor::new(*id, *name, *category));
        }
        registry
    }

    /// Adds or replaces a descriptor.
    pub fn register(&mut self, descriptor: ToolDescriptor) {
        self.tools.insert(descriptor.id.clone(), descriptor);
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.tools.contains_key(id)
    }

    pub fn describe(&self, id: &str) -> ToolDescriptor {
        self.tools.get(id).cloned().unwrap_or_else(|| ToolDescriptor::derived(id))
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Descriptors for every tool that currently holds data, in first-observation order.
    pub async fn discover<S: StoreAdapter + ?Sized>(&self, store: &S) -> Result<Vec<ToolDescriptor>, StoreError> {
        let ids = store.list_distinct_tools().await?;
        Ok(ids.iter().map(|id| self.describe(id)).collect())
    }
}

fn title_case(id: &str) -> String {
    id.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ids_get_derived_entries() {
        let registry = ToolRegistry::builtin();
        let descriptor = registry.describe("habit_tracker");
        assert_eq!(descriptor.name, "Habit Tracker");
        assert_eq!(descriptor.category, ToolCategory::Other);
        assert!(!registry.is_registered("habit_tracker"));
    }

    #[test]
    fn registered_tools_override_builtins() {
        let mut registry = ToolRegistry::builtin();
        assert_eq!(registry.describe("notes").category, ToolCategory::Text);

        registry.register(ToolDescriptor::new("notes", "Sticky Notes", ToolCategory::Productivity));
        assert_eq!(registry.describe("notes").name, "Sticky Notes");
        assert_eq!(registry.len(), BUILTIN_TOOLS.len());
    }
}
