//! Command classification sets

use std::collections::HashSet;

/// Commands counted as user-facing actions when no override is given
pub const DEFAULT_ACTIONABLE_COMMANDS: &[&str] = &[
    "visit",
    "click",
    "type",
    "clear",
    "blur",
    "focus",
    "select",
    "check",
    "uncheck",
    "submit",
    "login",
    "createTransaction",
    "switchUserByXstate",
    "loginByXstate",
];

/// Query, assertion and setup helpers that are never actions
pub const DEFAULT_EXCLUDED_COMMANDS: &[&str] = &[
    "get",
    "find",
    "should",
    "wait",
    "location",
    "contains",
    "its",
    "then",
    "and",
    "intercept",
    "task",
    "database",
    "getBySel",
    "getBySelLike",
    "getCookie",
    "visualSnapshot",
];

/// The actionable/excluded command sets used for one analysis run.
///
/// Immutable once built. The excluded set is carried for reporting only:
/// counting is gated on actionable membership alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSets {
    actionable: Vec<String>,
    excluded: Vec<String>,
    actionable_lookup: HashSet<String>,
    excluded_lookup: HashSet<String>,
}

impl CommandSets {
    /// Build from explicit lists. Blank entries are dropped, duplicates keep
    /// their first position.
    pub fn new<A, E>(actionable: A, excluded: E) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let (actionable, actionable_lookup) = normalize(actionable);
        let (excluded, excluded_lookup) = normalize(excluded);
        Self {
            actionable,
            excluded,
            actionable_lookup,
            excluded_lookup,
        }
    }

    /// Defaults, with either list optionally replaced
    pub fn with_overrides(actionable: Option<Vec<String>>, excluded: Option<Vec<String>>) -> Self {
        let actionable = actionable
            .unwrap_or_else(|| DEFAULT_ACTIONABLE_COMMANDS.iter().map(|s| s.to_string()).collect());
        let excluded = excluded
            .unwrap_or_else(|| DEFAULT_EXCLUDED_COMMANDS.iter().map(|s| s.to_string()).collect());
        Self::new(actionable, excluded)
    }

    pub fn is_actionable(&self, command: &str) -> bool {
        self.actionable_lookup.contains(command)
    }

    pub fn is_excluded(&self, command: &str) -> bool {
        self.excluded_lookup.contains(command)
    }

    /// Actionable names in configuration order
    pub fn actionable(&self) -> &[String] {
        &self.actionable
    }

    /// Excluded names in configuration order
    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    /// Names present in both sets. Not an error, but worth surfacing.
    pub fn overlap(&self) -> Vec<&str> {
        self.actionable
            .iter()
            .filter(|c| self.excluded_lookup.contains(c.as_str()))
            .map(String::as_str)
            .collect()
    }
}

impl Default for CommandSets {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIONABLE_COMMANDS, DEFAULT_EXCLUDED_COMMANDS)
    }
}

fn normalize<I>(names: I) -> (Vec<String>, HashSet<String>)
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut ordered = Vec::new();
    let mut seen = HashSet::new();
    for name in names {
        let name = name.as_ref().trim();
        if name.is_empty() {
            continue;
        }
        if seen.insert(name.to_string()) {
            ordered.push(name.to_string());
        }
    }
    (ordered, seen)
}

/// Split a comma-separated command list (`"visit, click,type"`)
pub fn parse_command_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
