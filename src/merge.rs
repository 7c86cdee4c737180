use crate::{
    config::AliasMergeSpec,
    constants::{MERGED_NAME_SEPARATOR, NAME_SEPARATORS},
    types::{SpeakerTable, SpeakerTotals},
};
use indexmap::IndexSet;
use log::debug;
use smallvec::SmallVec;
use std::iter::once;

type MergeUnit = SmallVec<[String; 4]>;

/// Folds aliases of the same character into one entry of a speaker table.
pub struct MergeResolver<'a> {
    spec: &'a AliasMergeSpec,
}

impl<'a> MergeResolver<'a> {
    #[must_use]
    pub fn new(spec: &'a AliasMergeSpec) -> Self {
        Self { spec }
    }

    /// Rewrites `counter` in place.
    ///
    /// Merged entries are keyed by their member names sorted by UTF-8 byte
    /// length and joined with `/`. Merging an already merged table changes
    /// nothing.
    pub fn merge(&self, counter: &mut SpeakerTable) {
        Self::split_composites(counter);

        let prefixes: IndexSet<&str> = once("")
            .chain(self.spec.prefixes.iter().map(String::as_str))
            .collect();
        let suffixes: IndexSet<&str> = once("")
            .chain(self.spec.suffixes.iter().map(String::as_str))
            .collect();

        let variants = |name: &str| -> Vec<String> {
            let mut variants = Vec::with_capacity(prefixes.len() * suffixes.len());

            for prefix in &prefixes {
                for suffix in &suffixes {
                    variants.push(format!("{prefix}{name}{suffix}"));
                }
            }

            variants
        };

        let mut remaining: IndexSet<String> = counter.keys().cloned().collect();
        let mut units: Vec<MergeUnit> = Vec::new();

        let mut take_unit = |names: IndexSet<String>, remaining: &mut IndexSet<String>| {
            if names.len() < 2 {
                return;
            }

            for name in &names {
                remaining.shift_remove(name);
            }

            units.push(names.into_iter().collect());
        };

        for group in &self.spec.groups {
            let names: IndexSet<String> = group
                .iter()
                .flat_map(|fragment| variants(fragment.as_str()))
                .filter(|candidate| remaining.contains(candidate))
                .collect();

            take_unit(names, &mut remaining);
        }

        let snapshot: Vec<String> = remaining.iter().cloned().collect();

        for name in snapshot {
            if !remaining.contains(&name) {
                continue;
            }

            let names: IndexSet<String> = variants(&name)
                .into_iter()
                .filter(|candidate| remaining.contains(candidate))
                .collect();

            take_unit(names, &mut remaining);
        }

        units.retain_mut(|unit| {
            unit.retain(|name| !self.spec.excluded.contains(name));
            unit.len() > 1
        });

        for mut unit in units {
            unit.sort_by_key(String::len);

            let canonical = unit.join(MERGED_NAME_SEPARATOR);
            let mut totals = SpeakerTotals {
                merged: true,
                ..Default::default()
            };

            for name in &unit {
                if let Some(member) = counter.shift_remove(name) {
                    totals += &member;
                }
            }

            debug!("Merged names into {canonical}");

            if totals.total() == 0 {
                continue;
            }

            if let Some(existing) = counter.get_mut(&canonical) {
                *existing += &totals;
            } else {
                counter.insert(canonical, totals);
            }
        }
    }

    /// Counts `A&B` for both `A` and `B`, removing `A&B`.
    fn split_composites(counter: &mut SpeakerTable) {
        let composites: Vec<String> = counter
            .iter()
            .filter(|(name, totals)| !totals.merged && name.contains(NAME_SEPARATORS))
            .map(|(name, _)| name.clone())
            .collect();

        for composite in composites {
            let Some(totals) = counter.shift_remove(&composite) else {
                continue;
            };

            for part in composite.split(NAME_SEPARATORS).filter(|p| !p.is_empty()) {
                if let Some(existing) = counter.get_mut(part) {
                    *existing += &totals;
                } else {
                    counter.insert(part.to_owned(), totals.clone());
                }
            }
        }
    }
}
