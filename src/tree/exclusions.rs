use std::collections::BTreeSet;

pub const NODE_MODULES: &str = "node_modules";
pub const GIT_DIR: &str = ".git";

/// Directory names that the tree builder never descends into.
///
/// `node_modules` and `.git` are always part of the set; configuration can
/// only add to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusions {
    names: BTreeSet<String>,
}

impl Default for Exclusions {
    fn default() -> Self {
        Self {
            names: [NODE_MODULES, GIT_DIR].into_iter().map(String::from).collect(),
        }
    }
}

impl Exclusions {
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut exclusions = Self::default();
        exclusions.names.extend(extra.into_iter().map(Into::into));
        exclusions
    }

    pub fn is_excluded(&self, directory_name: &str) -> bool {
        self.names.contains(directory_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_exclude_node_modules_and_git() {
        let exclusions = Exclusions::default();
        assert!(exclusions.is_excluded("node_modules"));
        assert!(exclusions.is_excluded(".git"));
        assert!(!exclusions.is_excluded("src"));
        assert!(!exclusions.is_excluded("node_modules_backup"));
    }

    #[test]
    fn extra_names_never_drop_the_defaults() {
        let exclusions = Exclusions::with_extra(["dist", "target"]);
        let names = exclusions.iter().collect::<Vec<_>>();
        assert_eq!(names, vec![".git", "dist", "node_modules", "target"]);
    }
}
