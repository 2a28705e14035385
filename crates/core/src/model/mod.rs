mod answer;
mod history;
mod skill;
mod summary;

pub use answer::AnswerLedger;
pub use history::{
    AssessmentRun, HistoryError, ProgressComparison, RunId, compare_runs,
};
pub use skill::{Skill, SkillEntry, SkillId, SkillLevel};
pub use summary::{LevelCounts, LevelTally, SkillSummary, level_totals, summarize};
