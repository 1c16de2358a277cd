use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    SpreadsheetRow,
    NotifyDispatch,
    EmailSchedule,
}

/// Result of a side effect that did not abort the invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EffectOutcome {
    Completed,
    SoftFailed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectReport {
    pub effect: SideEffect,
    #[serde(flatten)]
    pub outcome: EffectOutcome,
}

/// Summary of one intake invocation, returned in the success body.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeReport {
    pub key: String,
    pub public_url: String,
    pub schedule_id: String,
    pub effects: Vec<EffectReport>,
}

impl IntakeReport {
    #[cfg(test)]
    pub fn outcome_of(&self, effect: SideEffect) -> Option<&EffectOutcome> {
        self.effects
            .iter()
            .find(|r| r.effect == effect)
            .map(|r| &r.outcome)
    }

    pub fn soft_failures(&self) -> usize {
        self.effects
            .iter()
            .filter(|r| matches!(r.outcome, EffectOutcome::SoftFailed { .. }))
            .count()
    }
}
