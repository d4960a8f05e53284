//! Ordered contributor roster
//!
//! The first entry is the anchor. It joins at tick 0 and can never be
//! removed; every other entry may be added, edited or removed freely
//! between runs. A run works on its own copy of the roster.

use crate::errors::{ConfigError, RosterError, SimError};
use crate::types::{Contributor, ContributorId, TimeTick};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    contributors: Vec<Contributor>,
}

impl Roster {
    /// Start a roster with its anchor
    pub fn new(anchor: Contributor) -> Self {
        Self {
            contributors: vec![anchor],
        }
    }

    /// Wrap an ordered list; the first element becomes the anchor.
    /// Use [`Roster::validate`] before running.
    pub fn from_contributors(contributors: Vec<Contributor>) -> Self {
        Self { contributors }
    }

    /// The founder team used as the default scenario
    pub fn sample() -> Self {
        Self::from_contributors(vec![
            Contributor::new("founder", 0, None).with_name("Founder"),
            Contributor::new("a", 3, None).with_name("A"),
            Contributor::new("b", 6, Some(24)).with_name("B"),
            Contributor::new("c", 12, None).with_name("C"),
            Contributor::new("d", 24, None).with_name("D"),
        ])
    }

    pub fn anchor(&self) -> Option<&Contributor> {
        self.contributors.first()
    }

    pub fn is_anchor(&self, id: &ContributorId) -> bool {
        self.anchor().is_some_and(|a| &a.id == id)
    }

    pub fn contributors(&self) -> &[Contributor] {
        &self.contributors
    }

    pub fn get(&self, id: &ContributorId) -> Option<&Contributor> {
        self.contributors.iter().find(|c| &c.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &ContributorId> {
        self.contributors.iter().map(|c| &c.id)
    }

    pub fn len(&self) -> usize {
        self.contributors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contributors.is_empty()
    }

    /// Append a contributor after checking its id and window
    pub fn push(&mut self, contributor: Contributor) -> Result<(), SimError> {
        if self.get(&contributor.id).is_some() {
            return Err(ConfigError::DuplicateContributor(contributor.id).into());
        }
        check_window(&contributor)?;
        self.contributors.push(contributor);
        Ok(())
    }

    /// Remove a non-anchor contributor
    pub fn remove(&mut self, id: &ContributorId) -> Result<Contributor, RosterError> {
        if self.is_anchor(id) {
            return Err(RosterError::AnchorRemoval(id.clone()));
        }
        let index = self
            .contributors
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| RosterError::UnknownContributor(id.clone()))?;
        Ok(self.contributors.remove(index))
    }

    /// Change a contributor's join and exit ticks. The anchor's join tick is fixed.
    pub fn update(
        &mut self,
        id: &ContributorId,
        join_period: TimeTick,
        exit_period: Option<TimeTick>,
    ) -> Result<(), SimError> {
        let is_anchor = self.is_anchor(id);
        let contributor = self
            .contributors
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| RosterError::UnknownContributor(id.clone()))?;

        if is_anchor && join_period != 0 {
            return Err(ConfigError::AnchorJoinNotZero {
                id: id.clone(),
                join_period,
            }
            .into());
        }

        let candidate = Contributor {
            join_period,
            exit_period,
            ..contributor.clone()
        };
        check_window(&candidate)?;
        *contributor = candidate;
        Ok(())
    }

    /// Check every roster-level rule the engine relies on
    pub fn validate(&self) -> Result<(), SimError> {
        let anchor = self.anchor().ok_or(ConfigError::EmptyRoster)?;
        if anchor.join_period != 0 {
            return Err(ConfigError::AnchorJoinNotZero {
                id: anchor.id.clone(),
                join_period: anchor.join_period,
            }
            .into());
        }

        let mut seen = HashSet::with_capacity(self.contributors.len());
        for contributor in &self.contributors {
            if !seen.insert(&contributor.id) {
                return Err(ConfigError::DuplicateContributor(contributor.id.clone()).into());
            }
            check_window(contributor)?;
        }
        Ok(())
    }
}

fn check_window(contributor: &Contributor) -> Result<(), RosterError> {
    match contributor.exit_period {
        Some(exit) if exit < contributor.join_period => Err(RosterError::ExitBeforeJoin {
            id: contributor.id.clone(),
            join_period: contributor.join_period,
            exit_period: exit,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_roster_is_valid() {
        let roster = Roster::sample();
        assert!(roster.validate().is_ok());
        assert_eq!(roster.len(), 5);
        assert_eq!(roster.anchor().unwrap().id, ContributorId::new("founder"));
    }

    #[test]
    fn test_empty_roster_rejected() {
        let roster = Roster::from_contributors(vec![]);
        assert_eq!(
            roster.validate(),
            Err(SimError::Configuration(ConfigError::EmptyRoster))
        );
    }

    #[test]
    fn test_anchor_must_join_at_zero() {
        let roster = Roster::new(Contributor::new("founder", 2, None));
        assert!(matches!(
            roster.validate(),
            Err(SimError::Configuration(ConfigError::AnchorJoinNotZero { join_period: 2, .. }))
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let roster = Roster::from_contributors(vec![
            Contributor::new("founder", 0, None),
            Contributor::new("founder", 4, None),
        ]);
        assert_eq!(
            roster.validate(),
            Err(SimError::Configuration(ConfigError::DuplicateContributor(
                ContributorId::new("founder")
            )))
        );

        let mut roster = Roster::new(Contributor::new("founder", 0, None));
        assert!(roster.push(Contributor::new("founder", 1, None)).is_err());
    }

    #[test]
    fn test_exit_before_join_rejected() {
        let roster = Roster::from_contributors(vec![
            Contributor::new("founder", 0, None),
            Contributor::new("late", 10, Some(4)),
        ]);
        assert!(matches!(
            roster.validate(),
            Err(SimError::Roster(RosterError::ExitBeforeJoin { exit_period: 4, .. }))
        ));
    }

    #[test]
    fn test_anchor_cannot_be_removed() {
        let mut roster = Roster::sample();
        let founder = ContributorId::new("founder");
        assert_eq!(roster.remove(&founder), Err(RosterError::AnchorRemoval(founder)));

        let removed = roster.remove(&ContributorId::new("b")).unwrap();
        assert_eq!(removed.exit_period, Some(24));
        assert_eq!(roster.len(), 4);

        let ghost = ContributorId::new("ghost");
        assert_eq!(roster.remove(&ghost), Err(RosterError::UnknownContributor(ghost)));
    }

    #[test]
    fn test_update_keeps_anchor_join_fixed() {
        let mut roster = Roster::sample();
        let founder = ContributorId::new("founder");
        assert!(roster.update(&founder, 3, None).is_err());
        assert!(roster.update(&founder, 0, Some(30)).is_ok());

        let a = ContributorId::new("a");
        roster.update(&a, 5, Some(20)).unwrap();
        let updated = roster.get(&a).unwrap();
        assert_eq!((updated.join_period, updated.exit_period), (5, Some(20)));

        assert!(roster.update(&a, 9, Some(2)).is_err());
        // rejected edits leave the entry untouched
        assert_eq!(roster.get(&a).unwrap().join_period, 5);
    }
}
