//! The in-memory command collection and its invariants.
//!
//! [`Repository`] is the only writer to its [`Store`]. Every mutating
//! operation validates first, mutates, then saves the full collection as its
//! last step, so a failed validation never leaves a partial change behind.
//!
//! Invariants kept after every mutation:
//!
//! - ids are unique; a new id is one more than the largest id present, or 1
//!   for an empty collection. A deleted id below the largest never comes
//!   back, but deleting the newest command frees its id for the next add
//! - the trimmed command text is unique; adding it again merges into the
//!   existing command
//! - an alias is unique, does not start with `-` and is not a reserved word

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{Local, NaiveDateTime};
use log::debug;

use crate::command_definitions::{AddOutcome, CommandDefinition, ListSort, Stats};
use crate::error::{Error, Result};
use crate::file_handling::Store;

/// Number of entries reported in [`Stats::most_used`].
pub const MOST_USED_LIMIT: usize = 5;

/// Checks an alias against the alias rules.
///
/// `excluding` is the id allowed to already own the alias, used when a
/// command keeps or re-sets its own alias.
///
/// # Errors
///
/// Returns the alias error describing the first rule that is violated.
pub fn validate_alias(
    alias: &str,
    excluding: Option<u32>,
    commands: &[CommandDefinition],
    reserved: &HashSet<String>,
) -> Result<()> {
    if alias.is_empty() {
        return Err(Error::EmptyAlias);
    }

    if alias.starts_with('-') {
        return Err(Error::AliasStartsWithDash(alias.to_string()));
    }

    if reserved.contains(alias) {
        return Err(Error::ReservedAlias(alias.to_string()));
    }

    let owner = commands
        .iter()
        .find(|cmd| cmd.alias.as_deref() == Some(alias));

    match owner {
        Some(owner) if Some(owner.id) != excluding => Err(Error::AliasInUse {
            alias: alias.to_string(),
            owner: owner.id,
        }),
        _ => Ok(()),
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub struct Repository<S: Store> {
    store: S,
    commands: Vec<CommandDefinition>,
    reserved: HashSet<String>,
}

impl<S: Store> Repository<S> {
    /// Loads the collection once from `store`.
    pub fn load(store: S, reserved: HashSet<String>) -> Self {
        let commands = store.load();
        Self {
            store,
            commands,
            reserved,
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// All commands in stored order.
    #[must_use]
    pub fn commands(&self) -> &[CommandDefinition] {
        &self.commands
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn persist(&self) -> Result<()> {
        self.store.save(&self.commands)
    }

    fn next_id(&self) -> Result<u32> {
        match self.commands.iter().map(|cmd| cmd.id).max() {
            None => Ok(1),
            Some(max_id) => max_id.checked_add(1).ok_or(Error::IdsExhausted(max_id)),
        }
    }

    fn position(&self, id: u32) -> Option<usize> {
        self.commands.iter().position(|cmd| cmd.id == id)
    }

    fn position_by_command(&self, command: &str) -> Option<usize> {
        self.commands
            .iter()
            .position(|cmd| cmd.command.trim() == command)
    }

    /// Adds a command, or merges into the existing command with the same
    /// trimmed text.
    ///
    /// On a merge the tags are unioned, a differing alias replaces the old
    /// one, and the description is left as it was.
    ///
    /// # Errors
    ///
    /// Returns an alias error if `alias` is invalid, in which case nothing is
    /// changed, or a store error if saving fails.
    pub fn add(
        &mut self,
        command: &str,
        description: &str,
        tags: &[String],
        alias: Option<&str>,
    ) -> Result<AddOutcome> {
        let command = command.trim();

        if let Some(index) = self.position_by_command(command) {
            return self.merge_into(index, tags, alias);
        }

        let id = self.next_id()?;
        if let Some(alias) = alias {
            self.validate_alias(alias, None)?;
        }

        let new_command = CommandDefinition {
            id,
            command: command.to_string(),
            description: description.to_string(),
            tags: tags.iter().cloned().collect(),
            alias: alias.map(ToString::to_string),
            created_at: now(),
            last_used_at: None,
            used_count: 0,
        };

        debug!("Adding command {id}: `{command}`");
        self.commands.push(new_command.clone());
        self.persist()?;

        Ok(AddOutcome {
            command: new_command,
            created: true,
            updated: false,
            merged_tags: false,
        })
    }

    fn merge_into(
        &mut self,
        index: usize,
        tags: &[String],
        alias: Option<&str>,
    ) -> Result<AddOutcome> {
        let existing = &self.commands[index];

        let new_alias = match alias {
            Some(alias) if existing.alias.as_deref() != Some(alias) => {
                self.validate_alias(alias, Some(existing.id))?;
                Some(alias.to_string())
            }
            _ => None,
        };

        let merged: BTreeSet<String> = existing.tags.iter().chain(tags).cloned().collect();
        let merged_tags = merged.len() > existing.tags.len();

        let updated = merged_tags || new_alias.is_some();
        let existing = &mut self.commands[index];

        if merged_tags {
            existing.tags = merged;
        }
        if new_alias.is_some() {
            existing.alias = new_alias;
        }

        let command = existing.clone();
        if updated {
            debug!("Merged into existing command {}", command.id);
            self.persist()?;
        }

        Ok(AddOutcome {
            command,
            created: false,
            updated,
            merged_tags,
        })
    }

    /// Checks `alias` against the reserved words and current owners.
    ///
    /// # Errors
    ///
    /// Returns the alias error describing the violated rule.
    pub fn validate_alias(&self, alias: &str, excluding: Option<u32>) -> Result<()> {
        validate_alias(alias, excluding, &self.commands, &self.reserved)
    }

    #[must_use]
    pub fn get_by_alias(&self, alias: &str) -> Option<&CommandDefinition> {
        if alias.is_empty() {
            return None;
        }
        self.commands
            .iter()
            .find(|cmd| cmd.alias.as_deref() == Some(alias))
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<&CommandDefinition> {
        self.commands.iter().find(|cmd| cmd.id == id)
    }

    /// Edits a command. Given fields replace the current values wholesale;
    /// tags are not merged. Returns `None` for an unknown id.
    ///
    /// # Errors
    ///
    /// Returns an alias error if the new alias is invalid, in which case
    /// nothing is changed, or a store error if saving fails.
    pub fn edit(
        &mut self,
        id: u32,
        description: Option<&str>,
        tags: Option<&[String]>,
        alias: Option<&str>,
    ) -> Result<Option<CommandDefinition>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };

        let current = &self.commands[index];

        let new_alias = match alias {
            Some(alias) if current.alias.as_deref() != Some(alias) => {
                self.validate_alias(alias, Some(id))?;
                Some(alias.to_string())
            }
            _ => None,
        };
        let new_tags: Option<BTreeSet<String>> = tags
            .map(|tags| tags.iter().cloned().collect())
            .filter(|tags| *tags != current.tags);
        let new_description = description
            .filter(|description| *description != current.description)
            .map(ToString::to_string);

        let changed = new_alias.is_some() || new_tags.is_some() || new_description.is_some();
        let command = &mut self.commands[index];

        if let Some(description) = new_description {
            command.description = description;
        }
        if let Some(tags) = new_tags {
            command.tags = tags;
        }
        if new_alias.is_some() {
            command.alias = new_alias;
        }

        let command = command.clone();
        if changed {
            self.persist()?;
        }

        Ok(Some(command))
    }

    /// Deletes one command. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns a store error if saving fails.
    pub fn delete(&mut self, id: u32) -> Result<bool> {
        Ok(self.delete_multiple(&[id])? > 0)
    }

    /// Deletes every command whose id is in `ids` and returns how many were
    /// removed. Saves once, and only if something was removed.
    ///
    /// # Errors
    ///
    /// Returns a store error if saving fails.
    pub fn delete_multiple(&mut self, ids: &[u32]) -> Result<usize> {
        let targets: HashSet<u32> = ids.iter().copied().collect();
        let original_length = self.commands.len();

        self.commands.retain(|cmd| !targets.contains(&cmd.id));

        let deleted_count = original_length - self.commands.len();
        if deleted_count > 0 {
            debug!("Deleted {deleted_count} commands");
            self.persist()?;
        }

        Ok(deleted_count)
    }

    /// Filters commands in stored order.
    ///
    /// With `tags`, keeps commands carrying any of them (case-insensitive).
    /// With `query`, keeps commands whose text or description contains it
    /// (case-insensitive). Both filters apply when both are given.
    #[must_use]
    pub fn search(&self, query: Option<&str>, tags: &[String]) -> Vec<&CommandDefinition> {
        let lowercase_query = query
            .filter(|query| !query.is_empty())
            .map(str::to_lowercase);

        self.commands
            .iter()
            .filter(|cmd| tags.is_empty() || cmd.has_any_tag(tags))
            .filter(|cmd| {
                lowercase_query
                    .as_deref()
                    .map_or(true, |query| cmd.matches_query(query))
            })
            .collect()
    }

    /// Commands carrying any of `tags` (all when empty), in `sort` order.
    #[must_use]
    pub fn list(&self, tags: &[String], sort: ListSort) -> Vec<&CommandDefinition> {
        let mut commands = self.search(None, tags);

        match sort {
            ListSort::Created => commands.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ListSort::Recent => commands.sort_by(|a, b| b.last_used_at.cmp(&a.last_used_at)),
            ListSort::Used => commands.sort_by(|a, b| b.used_count.cmp(&a.used_count)),
        }

        commands
    }

    /// All commands, most recently used first. Never-used commands keep their
    /// stored order at the end.
    #[must_use]
    pub fn recent_first(&self) -> Vec<&CommandDefinition> {
        self.list(&[], ListSort::Recent)
    }

    /// Records one use of a command. Returns false for an unknown id.
    ///
    /// # Errors
    ///
    /// Returns a store error if saving fails.
    pub fn increment_usage(&mut self, id: u32) -> Result<bool> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };

        let command = &mut self.commands[index];
        command.used_count += 1;
        command.last_used_at = Some(now());

        self.persist()?;
        Ok(true)
    }

    #[must_use]
    pub fn stats(&self) -> Stats {
        let tags = self
            .commands
            .iter()
            .flat_map(|cmd| cmd.tags.iter().cloned())
            .collect();

        let most_used = self
            .list(&[], ListSort::Used)
            .into_iter()
            .filter(|cmd| cmd.used_count > 0)
            .take(MOST_USED_LIMIT)
            .cloned()
            .collect();

        Stats {
            total: self.commands.len(),
            tags,
            most_used,
        }
    }

    /// Number of commands carrying each tag.
    #[must_use]
    pub fn tag_counts(&self) -> BTreeMap<String, usize> {
        let mut tag_counts = BTreeMap::new();
        for tag in self.commands.iter().flat_map(|cmd| &cmd.tags) {
            *tag_counts.entry(tag.clone()).or_insert(0) += 1;
        }
        tag_counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_handling::MemoryStore;

    fn reserved() -> HashSet<String> {
        ["run", "list", "cd", "sudo"]
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn empty_repository() -> Repository<MemoryStore> {
        Repository::load(MemoryStore::default(), reserved())
    }

    #[test]
    fn test_add_assigns_sequential_ids() {
        let mut repository = empty_repository();

        let first = repository.add("ls -lah", "List files", &tags(&["files"]), None).unwrap();
        let second = repository.add("df -h", "Disk usage", &[], None).unwrap();

        assert_eq!(first.command.id, 1);
        assert_eq!(second.command.id, 2);
        assert!(first.created);
        assert!(!first.updated);
        assert_eq!(first.command.used_count, 0);
        assert_eq!(repository.store().saves(), 2);
    }

    #[test]
    fn test_add_trims_command() {
        let mut repository = empty_repository();
        let outcome = repository.add("  git status  ", "", &[], None).unwrap();
        assert_eq!(outcome.command.command, "git status");
    }

    #[test]
    fn test_add_same_command_merges_tags() {
        let mut repository = empty_repository();
        repository.add("docker ps", "List containers", &tags(&["a", "b"]), None).unwrap();

        let outcome = repository
            .add(" docker ps ", "Different description", &tags(&["c"]), None)
            .unwrap();

        assert!(!outcome.created);
        assert!(outcome.updated);
        assert!(outcome.merged_tags);
        assert_eq!(outcome.command.id, 1);
        assert_eq!(outcome.command.description, "List containers");
        let expected: BTreeSet<String> = tags(&["a", "b", "c"]).into_iter().collect();
        assert_eq!(outcome.command.tags, expected);
        assert_eq!(repository.len(), 1);
    }

    #[test]
    fn test_add_same_command_without_changes_does_not_save() {
        let mut repository = empty_repository();
        repository.add("docker ps", "", &tags(&["a", "b"]), None).unwrap();

        let outcome = repository.add("docker ps", "", &tags(&["b"]), None).unwrap();

        assert!(!outcome.created);
        assert!(!outcome.updated);
        assert!(!outcome.merged_tags);
        assert_eq!(repository.store().saves(), 1);
    }

    #[test]
    fn test_add_is_case_sensitive_on_command() {
        let mut repository = empty_repository();
        repository.add("echo Hi", "", &[], None).unwrap();
        let outcome = repository.add("echo hi", "", &[], None).unwrap();
        assert!(outcome.created);
        assert_eq!(repository.len(), 2);
    }

    #[test]
    fn test_add_merge_sets_new_alias() {
        let mut repository = empty_repository();
        repository.add("kubectl get pods", "", &[], Some("pods")).unwrap();

        let outcome = repository.add("kubectl get pods", "", &[], Some("kp")).unwrap();

        assert!(outcome.updated);
        assert!(!outcome.merged_tags);
        assert_eq!(outcome.command.alias.as_deref(), Some("kp"));
        assert!(repository.get_by_alias("pods").is_none());
    }

    #[test]
    fn test_add_with_invalid_alias_persists_nothing() {
        let mut repository = empty_repository();

        let result = repository.add("ls -lah", "", &[], Some("cd"));

        assert!(matches!(result, Err(Error::ReservedAlias(_))));
        assert!(repository.is_empty());
        assert_eq!(repository.store().saves(), 0);
    }

    #[test]
    fn test_next_id_is_one_past_largest() {
        let mut repository = empty_repository();
        for command in ["a", "b", "c"] {
            repository.add(command, "", &[], None).unwrap();
        }

        // A deleted id below the largest never comes back
        assert!(repository.delete(2).unwrap());
        let outcome = repository.add("d", "", &[], None).unwrap();
        assert_eq!(outcome.command.id, 4);

        // Deleting the newest command frees its id
        assert!(repository.delete(4).unwrap());
        let outcome = repository.add("e", "", &[], None).unwrap();
        assert_eq!(outcome.command.id, 4);

        repository.delete_multiple(&[1, 3, 4]).unwrap();
        assert!(repository.is_empty());
        let outcome = repository.add("f", "", &[], None).unwrap();
        assert_eq!(outcome.command.id, 1);
    }

    #[test]
    fn test_add_fails_when_ids_are_exhausted() {
        let stored = CommandDefinition {
            id: u32::MAX,
            command: "uptime".to_string(),
            description: String::new(),
            tags: BTreeSet::new(),
            alias: None,
            created_at: now(),
            last_used_at: None,
            used_count: 0,
        };
        let mut repository = Repository::load(MemoryStore::new(vec![stored]), reserved());

        assert!(matches!(
            repository.add("hostname", "", &[], None),
            Err(Error::IdsExhausted(u32::MAX))
        ));
        assert_eq!(repository.len(), 1);
        assert_eq!(repository.store().saves(), 0);

        // Merging into the existing command needs no new id
        assert!(repository.add("uptime", "", &["sys".to_string()], None).is_ok());
    }

    #[test]
    fn test_validate_alias_rules() {
        let mut repository = empty_repository();
        repository.add("make build", "", &[], Some("mb")).unwrap();

        assert!(matches!(
            repository.validate_alias("", None),
            Err(Error::EmptyAlias)
        ));
        assert!(matches!(
            repository.validate_alias("-x", None),
            Err(Error::AliasStartsWithDash(_))
        ));
        assert!(matches!(
            repository.validate_alias("sudo", None),
            Err(Error::ReservedAlias(_))
        ));
        assert!(matches!(
            repository.validate_alias("mb", None),
            Err(Error::AliasInUse { owner: 1, .. })
        ));
        assert!(repository.validate_alias("mb", Some(1)).is_ok());
        assert!(repository.validate_alias("fresh", None).is_ok());
    }

    #[test]
    fn test_alias_collision_leaves_both_unchanged() {
        let mut repository = empty_repository();
        repository.add("make build", "", &[], Some("mb")).unwrap();
        repository.add("make test", "", &[], Some("mt")).unwrap();
        let before = repository.commands().to_vec();

        let result = repository.edit(2, Some("Run tests"), None, Some("mb"));

        assert!(matches!(result, Err(Error::AliasInUse { owner: 1, .. })));
        assert_eq!(repository.commands(), before.as_slice());
        assert_eq!(repository.store().saves(), 2);
    }

    #[test]
    fn test_edit_replaces_tags_and_description() {
        let mut repository = empty_repository();
        repository.add("ls", "List", &tags(&["a", "b"]), None).unwrap();

        let edited = repository
            .edit(1, Some("List directory"), Some(&tags(&["c"])), None)
            .unwrap()
            .unwrap();

        assert_eq!(edited.description, "List directory");
        assert_eq!(edited.tags, tags(&["c"]).into_iter().collect::<BTreeSet<_>>());
        assert_eq!(repository.get(1).unwrap(), &edited);
        assert_eq!(repository.store().saves(), 2);
    }

    #[test]
    fn test_edit_keeping_own_alias_is_allowed() {
        let mut repository = empty_repository();
        repository.add("ls", "", &[], Some("l1")).unwrap();

        let edited = repository.edit(1, None, None, Some("l1")).unwrap().unwrap();

        assert_eq!(edited.alias.as_deref(), Some("l1"));
        // Nothing changed, so nothing was saved
        assert_eq!(repository.store().saves(), 1);
    }

    #[test]
    fn test_edit_unknown_id() {
        let mut repository = empty_repository();
        assert_eq!(repository.edit(9, Some("x"), None, None).unwrap(), None);
        assert_eq!(repository.store().saves(), 0);
    }

    #[test]
    fn test_delete_multiple() {
        let mut repository = empty_repository();
        for command in ["a", "b", "c", "d"] {
            repository.add(command, "", &[], None).unwrap();
        }

        assert_eq!(repository.delete_multiple(&[1, 3, 42]).unwrap(), 2);
        let remaining: Vec<u32> = repository.commands().iter().map(|cmd| cmd.id).collect();
        assert_eq!(remaining, vec![2, 4]);
        assert_eq!(repository.store().saves(), 5);

        assert_eq!(repository.delete_multiple(&[42]).unwrap(), 0);
        assert!(!repository.delete(1).unwrap());
        assert_eq!(repository.store().saves(), 5);
    }

    #[test]
    fn test_search_by_tag_is_case_insensitive() {
        let mut repository = empty_repository();
        repository.add("docker ps", "", &tags(&["Docker"]), None).unwrap();
        repository.add("git status", "", &tags(&["git"]), None).unwrap();

        let results = repository.search(None, &tags(&["docker"]));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].command, "docker ps");

        let results = repository.search(None, &tags(&["GIT", "docker"]));
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_search_by_query_matches_command_or_description() {
        let mut repository = empty_repository();
        repository.add("docker ps", "List containers", &tags(&["docker"]), None).unwrap();
        repository.add("podman ps", "Containers via podman", &[], None).unwrap();
        repository.add("git status", "", &tags(&["git"]), None).unwrap();

        let results = repository.search(Some("CONTAINERS"), &[]);
        assert_eq!(results.len(), 2);

        let results = repository.search(Some("ps"), &tags(&["docker"]));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 1);

        assert_eq!(repository.search(None, &[]).len(), 3);
        assert_eq!(repository.search(Some(""), &[]).len(), 3);
    }

    #[test]
    fn test_increment_usage() {
        let mut repository = empty_repository();
        repository.add("ls", "", &[], None).unwrap();

        assert!(repository.increment_usage(1).unwrap());
        assert!(repository.increment_usage(1).unwrap());
        assert!(!repository.increment_usage(5).unwrap());

        let command = repository.get(1).unwrap();
        assert_eq!(command.used_count, 2);
        assert!(command.last_used_at.is_some());
        assert_eq!(repository.store().saves(), 3);
    }

    #[test]
    fn test_stats_most_used() {
        let mut repository = empty_repository();
        for (i, command) in ["a", "b", "c", "d", "e", "f", "g"].iter().enumerate() {
            repository.add(command, "", &tags(&[*command]), None).unwrap();
            for _ in 0..(i % 3) {
                repository.increment_usage(u32::try_from(i + 1).unwrap()).unwrap();
            }
        }

        let stats = repository.stats();
        assert_eq!(stats.total, 7);
        assert_eq!(stats.tags.len(), 7);

        let most_used: Vec<(u32, u64)> = stats
            .most_used
            .iter()
            .map(|cmd| (cmd.id, cmd.used_count))
            .collect();
        // Ties keep stored order; unused commands are dropped
        assert_eq!(most_used, vec![(3, 2), (6, 2), (2, 1), (5, 1)]);
    }

    #[test]
    fn test_tag_counts() {
        let mut repository = empty_repository();
        repository.add("a", "", &tags(&["x", "y"]), None).unwrap();
        repository.add("b", "", &tags(&["x"]), None).unwrap();

        let counts = repository.tag_counts();
        assert_eq!(counts.get("x"), Some(&2));
        assert_eq!(counts.get("y"), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_recent_first_puts_unused_last() {
        let mut repository = empty_repository();
        for command in ["a", "b", "c"] {
            repository.add(command, "", &[], None).unwrap();
        }
        repository.increment_usage(2).unwrap();

        let order: Vec<u32> = repository.recent_first().iter().map(|cmd| cmd.id).collect();
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn test_load_uses_store_contents() {
        let mut seeded = empty_repository();
        seeded.add("uptime", "", &[], Some("up")).unwrap();
        let saved = seeded.store().saved();

        let repository = Repository::load(MemoryStore::new(saved), reserved());
        assert_eq!(repository.get_by_alias("up").map(|cmd| cmd.id), Some(1));
        assert!(repository.get_by_alias("").is_none());
    }
}
