// Topic filter - Selects the repositories a group lists
use crate::domain::repository::{OrgRepository, Repository};
use crate::domain::settings::Group;

/// Repositories selected for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicSelection {
    /// Selected entities, in listing order, with empty deployment maps.
    pub repositories: Vec<Repository>,
    /// Names of the selected repositories, sorted and unique.
    pub membership: Vec<String>,
}

/// Select the non-archived repositories carrying every topic the group requires.
pub fn filter_by_topics(group: &Group, listing: &[OrgRepository]) -> TopicSelection {
    let repositories: Vec<Repository> = listing
        .iter()
        .filter(|repo| !repo.archived && repo.has_topics(&group.topics))
        .map(|repo| Repository::from_listing(repo, &group.environments))
        .collect();

    let mut membership: Vec<String> = repositories.iter().map(|repo| repo.name.clone()).collect();
    membership.sort();
    membership.dedup();

    TopicSelection {
        repositories,
        membership,
    }
}
