//! Variant grouping.
//!
//! Partitions a flat artifact listing into [`Bundle`]s: every record sharing
//! the same product flavour, module and split set (compared as a set). A
//! bundle is the unit that becomes one installable deliverable.
//!
//! Ordering is first-occurrence throughout: flavours in the order they first
//! appear, then modules within a flavour, then split sets within a module.

use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use crate::artifact::{base_name, ArtifactRecord};
use crate::error::SettingsError;

/// Distinct module values observed, including the empty module.
pub fn module_values<'a, I>(records: I) -> BTreeSet<&'a str>
where
    I: IntoIterator<Item = &'a ArtifactRecord>,
{
    records.into_iter().map(|r| r.module()).collect()
}

/// Fails with [`SettingsError::ModuleAmbiguous`] when the records span more
/// than one module and `supplied_module` is empty.
pub fn require_module_if_ambiguous<'a, I>(
    records: I,
    supplied_module: &str,
) -> Result<(), SettingsError>
where
    I: IntoIterator<Item = &'a ArtifactRecord>,
{
    if supplied_module.is_empty() && module_values(records).len() > 1 {
        return Err(SettingsError::ModuleAmbiguous);
    }
    Ok(())
}

/// Distinct product flavours in first-occurrence order.
pub fn flavours<'a, I>(records: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a ArtifactRecord>,
{
    let mut seen = BTreeSet::new();
    let mut ordered = Vec::new();
    for record in records {
        let flavour = record.product_flavour();
        if seen.insert(flavour) {
            ordered.push(flavour);
        }
    }
    ordered
}

/// All records of one (flavour, module) pair.
#[derive(Debug, Clone)]
pub struct VariantGroup<'a> {
    pub flavour: &'a str,
    pub module: &'a str,
    pub records: Vec<&'a ArtifactRecord>,
}

/// Group records by (flavour, module).
///
/// Groups are ordered by the first occurrence of their flavour, and within a
/// flavour by the first occurrence of their module.
pub fn group_by_flavour_and_module<'a, I>(records: I) -> Vec<VariantGroup<'a>>
where
    I: IntoIterator<Item = &'a ArtifactRecord>,
{
    let mut flavour_rank: HashMap<&'a str, usize> = HashMap::new();
    let mut index: HashMap<(&'a str, &'a str), usize> = HashMap::new();
    let mut groups: Vec<(usize, VariantGroup<'a>)> = Vec::new();

    for record in records {
        let flavour = record.product_flavour();
        let module = record.module();
        let next_rank = flavour_rank.len();
        let rank = *flavour_rank.entry(flavour).or_insert(next_rank);

        let slot = *index.entry((flavour, module)).or_insert_with(|| {
            groups.push((
                rank,
                VariantGroup {
                    flavour,
                    module,
                    records: Vec::new(),
                },
            ));
            groups.len() - 1
        });
        groups[slot].1.records.push(record);
    }

    // Stable: modules keep their first-occurrence order inside a flavour.
    groups.sort_by_key(|(rank, _)| *rank);
    groups.into_iter().map(|(_, group)| group).collect()
}

/// How a bundle member takes part in the deliverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRole {
    /// The single file a device installs: the AAB, the universal APK, or a
    /// standalone APK.
    InstallTarget,
    /// One part of a split APK set.
    SplitPart,
}

/// Records that jointly form one deliverable for a (flavour, module, split
/// set) combination.
#[derive(Debug, Clone)]
pub struct Bundle<'a> {
    pub flavour: &'a str,
    pub module: &'a str,
    /// Split titles as listed by the first member; empty for non-split builds.
    pub split_titles: Vec<&'a str>,
    pub members: Vec<&'a ArtifactRecord>,
    aab_path: &'a str,
    universal_path: &'a str,
}

impl<'a> Bundle<'a> {
    fn new(
        flavour: &'a str,
        module: &'a str,
        split_titles: Vec<&'a str>,
        members: Vec<&'a ArtifactRecord>,
    ) -> Self {
        let aab_path = shared_pointer(&members, "aab", |r| &r.meta().aab_path);
        let universal_path = shared_pointer(&members, "universal", |r| &r.meta().universal_path);
        Self {
            flavour,
            module,
            split_titles,
            members,
            aab_path,
            universal_path,
        }
    }

    /// App Bundle path shared by the members, if one was produced.
    pub fn aab_path(&self) -> Option<&'a str> {
        Some(self.aab_path).filter(|p| !p.is_empty())
    }

    /// Universal APK path shared by the members, if one was produced.
    pub fn universal_path(&self) -> Option<&'a str> {
        Some(self.universal_path).filter(|p| !p.is_empty())
    }

    pub fn is_split(&self) -> bool {
        !self.split_titles.is_empty()
    }

    /// Role of `record` in this bundle's deliverable, or `None` when the
    /// record is superseded or not part of it.
    ///
    /// Precedence: AAB, then universal APK plus splits, then splits alone,
    /// then a standalone APK.
    pub fn role_of(&self, record: &ArtifactRecord) -> Option<MemberRole> {
        let title = record.title.as_str();
        if let Some(aab) = self.aab_path() {
            return (title == base_name(aab)).then_some(MemberRole::InstallTarget);
        }
        if let Some(universal) = self.universal_path() {
            if title == base_name(universal) {
                return Some(MemberRole::InstallTarget);
            }
            return self.is_split_part(title).then_some(MemberRole::SplitPart);
        }
        if self.is_split() {
            return self.is_split_part(title).then_some(MemberRole::SplitPart);
        }
        (!record.meta().apk_path.is_empty()).then_some(MemberRole::InstallTarget)
    }

    fn is_split_part(&self, title: &str) -> bool {
        self.split_titles.contains(&title)
    }

    /// Members that make up the deliverable, in listing order.
    pub fn deliverables(&self) -> impl Iterator<Item = &'a ArtifactRecord> + '_ {
        self.members
            .iter()
            .copied()
            .filter(|r| self.role_of(r).is_some())
    }

    /// Members a device can install on their own, in listing order.
    pub fn install_targets(&self) -> impl Iterator<Item = &'a ArtifactRecord> + '_ {
        self.members
            .iter()
            .copied()
            .filter(|r| self.role_of(r) == Some(MemberRole::InstallTarget))
    }
}

/// First non-empty pointer among `members`. The CI step stamps the same value
/// on every sibling; a disagreement is logged and the first value wins.
fn shared_pointer<'a>(
    members: &[&'a ArtifactRecord],
    field: &str,
    get: impl Fn(&'a ArtifactRecord) -> &'a String,
) -> &'a str {
    let mut pointers = members
        .iter()
        .copied()
        .map(|r| get(r).as_str())
        .filter(|p| !p.is_empty());
    let Some(first) = pointers.next() else {
        return "";
    };
    if let Some(other) = pointers.find(|p| *p != first) {
        warn!(field, first, other, "bundle members disagree on pointer");
    }
    first
}

/// Partition records into bundles.
pub fn group_into_bundles<'a, I>(records: I) -> Vec<Bundle<'a>>
where
    I: IntoIterator<Item = &'a ArtifactRecord>,
{
    let mut bundles = Vec::new();
    for group in group_by_flavour_and_module(records) {
        let mut partitions: Vec<(BTreeSet<&'a str>, Vec<&'a ArtifactRecord>)> = Vec::new();
        for record in group.records {
            let key: BTreeSet<&'a str> = record
                .meta()
                .split_titles
                .iter()
                .map(String::as_str)
                .collect();
            match partitions.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(record),
                None => partitions.push((key, vec![record])),
            }
        }

        for (_, members) in partitions {
            let split_titles = members[0]
                .meta()
                .split_titles
                .iter()
                .map(String::as_str)
                .collect();
            bundles.push(Bundle::new(group.flavour, group.module, split_titles, members));
        }
    }
    bundles
}
