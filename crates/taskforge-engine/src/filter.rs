//! Catalog selection by environment and tag criteria.

use crate::config::OrchestratorConfig;
use crate::spec::TaskSpec;

/// Select the subset of the catalog matching the configured criteria.
///
/// A task is kept iff its environment matches one of the requested
/// environments (the `any` wildcard matches always), at least one of its
/// tags is requested when a tag filter is set, and none of its tags is
/// excluded. Pure; an empty result is a valid run that does nothing.
#[must_use]
pub fn filter_tasks(catalog: &[TaskSpec], config: &OrchestratorConfig) -> Vec<TaskSpec> {
    catalog
        .iter()
        .filter(|task| {
            task.environment.matches(&config.environments)
                && matches_tags(task, &config.tags)
                && !excluded(task, &config.exclude_tags)
        })
        .cloned()
        .collect()
}

fn matches_tags(task: &TaskSpec, requested: &[String]) -> bool {
    requested.is_empty() || task.tags.iter().any(|tag| requested.contains(tag))
}

fn excluded(task: &TaskSpec, exclude: &[String]) -> bool {
    task.tags.iter().any(|tag| exclude.contains(tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Environment;

    fn config() -> OrchestratorConfig {
        OrchestratorConfig {
            environments: vec![Environment::Local],
            ..OrchestratorConfig::default()
        }
    }

    #[test]
    fn keeps_matching_environment_and_wildcard() {
        let catalog = vec![
            TaskSpec::shell("local", "true"),
            TaskSpec::shell("vm", "true").with_environment(Environment::Vm),
            TaskSpec::shell("any", "true").with_environment(Environment::Any),
        ];
        let ids: Vec<_> = filter_tasks(&catalog, &config())
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["local", "any"]);
    }

    #[test]
    fn tag_filter_requires_an_intersection() {
        let catalog = vec![
            TaskSpec::shell("smoke", "true").with_tags(["smoke"]),
            TaskSpec::shell("slow", "true").with_tags(["nightly"]),
            TaskSpec::shell("untagged", "true"),
        ];
        let mut cfg = config();
        cfg.tags = vec!["smoke".into()];
        let ids: Vec<_> = filter_tasks(&catalog, &cfg).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["smoke"]);
    }

    #[test]
    fn exclude_tags_win_over_matches() {
        let catalog = vec![
            TaskSpec::shell("kept", "true").with_tags(["smoke"]),
            TaskSpec::shell("dropped", "true").with_tags(["smoke", "flaky"]),
        ];
        let mut cfg = config();
        cfg.exclude_tags = vec!["flaky".into()];
        let ids: Vec<_> = filter_tasks(&catalog, &cfg).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["kept"]);
    }

    #[test]
    fn empty_catalog_yields_empty_result() {
        assert!(filter_tasks(&[], &config()).is_empty());
    }
}
