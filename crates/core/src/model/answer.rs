use std::collections::BTreeMap;

use crate::model::SkillId;

/// Mapping of skill id to the user's yes/no answer.
///
/// Answers are unique per skill id: recording an answer for a skill that was
/// already answered replaces the prior value (last write wins). A missing
/// entry means "not yet answered", which aggregation treats as "not
/// acquired" rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerLedger {
    answers: BTreeMap<SkillId, bool>,
}

impl AnswerLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert an answer for the given skill.
    pub fn record(&mut self, skill_id: SkillId, has_skill: bool) {
        self.answers.insert(skill_id, has_skill);
    }

    /// Returns the recorded answer, if any.
    #[must_use]
    pub fn get(&self, skill_id: SkillId) -> Option<bool> {
        self.answers.get(&skill_id).copied()
    }

    /// True when the skill was answered with "yes". Unanswered skills count
    /// as not acquired.
    #[must_use]
    pub fn is_acquired(&self, skill_id: SkillId) -> bool {
        self.get(skill_id).unwrap_or(false)
    }

    /// Number of answered skills.
    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }

    /// Iterate answers in skill-id order.
    pub fn iter(&self) -> impl Iterator<Item = (SkillId, bool)> + '_ {
        self.answers.iter().map(|(id, has)| (*id, *has))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_replaces_prior_answer() {
        let mut ledger = AnswerLedger::new();
        ledger.record(SkillId::new(1), true);
        ledger.record(SkillId::new(1), false);

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(SkillId::new(1)), Some(false));
    }

    #[test]
    fn unanswered_is_not_acquired() {
        let ledger = AnswerLedger::new();
        assert!(!ledger.is_acquired(SkillId::new(7)));
        assert_eq!(ledger.get(SkillId::new(7)), None);
    }

    #[test]
    fn iterates_in_id_order() {
        let mut ledger = AnswerLedger::new();
        ledger.record(SkillId::new(3), true);
        ledger.record(SkillId::new(1), false);
        ledger.record(SkillId::new(2), true);

        let ids: Vec<u64> = ledger.iter().map(|(id, _)| id.value()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
