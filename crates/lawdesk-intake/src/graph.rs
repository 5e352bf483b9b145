//! Declarative step graph
//!
//! Every move the wizard can make is an edge `(from, transition, guard) -> to`.
//! Edges are matched in declaration order; the first whose guard holds wins.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::form::{ConsultationType, IntakeForm};
use crate::steps::WizardStep;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Next,
    Prev,
    Submit,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Transition::Next => "next",
            Transition::Prev => "prev",
            Transition::Submit => "submit",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Guard {
    Always,
    Consultation(ConsultationType),
}

impl Guard {
    fn holds(self, form: &IntakeForm) -> bool {
        match self {
            Guard::Always => true,
            Guard::Consultation(kind) => form.consultation_type == Some(kind),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub from: WizardStep,
    pub transition: Transition,
    pub guard: Guard,
    pub to: WizardStep,
}

#[derive(Debug, Clone)]
pub struct StepGraph {
    edges: Vec<Edge>,
}

impl Default for StepGraph {
    fn default() -> Self {
        Self::standard()
    }
}

impl StepGraph {
    pub fn new(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    /// The intake flow. Free consultations skip the add-ons step in both
    /// directions.
    pub fn standard() -> Self {
        use Transition::{Next, Prev, Submit};
        use WizardStep as S;

        let edge = |from, transition, guard, to| Edge {
            from,
            transition,
            guard,
            to,
        };
        let free = Guard::Consultation(ConsultationType::Free);
        let paid = Guard::Consultation(ConsultationType::Paid);
        let always = Guard::Always;

        Self::new(vec![
            edge(S::ContactInfo, Next, always, S::ReferralSource),
            edge(S::ReferralSource, Next, always, S::ServiceType),
            edge(S::ServiceType, Next, always, S::CaseDetails),
            edge(S::CaseDetails, Next, always, S::ConsultationType),
            edge(S::ConsultationType, Next, free, S::Scheduling),
            edge(S::ConsultationType, Next, paid, S::AddOns),
            edge(S::AddOns, Next, always, S::Scheduling),
            edge(S::Scheduling, Next, always, S::Disclaimer),
            edge(S::Disclaimer, Submit, always, S::Success),
            edge(S::ReferralSource, Prev, always, S::ContactInfo),
            edge(S::ServiceType, Prev, always, S::ReferralSource),
            edge(S::CaseDetails, Prev, always, S::ServiceType),
            edge(S::ConsultationType, Prev, always, S::CaseDetails),
            edge(S::AddOns, Prev, always, S::ConsultationType),
            edge(S::Scheduling, Prev, paid, S::AddOns),
            edge(S::Scheduling, Prev, always, S::ConsultationType),
            edge(S::Disclaimer, Prev, always, S::Scheduling),
        ])
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Target of `transition` from `from`, or `None` if no edge applies.
    pub fn resolve(
        &self,
        from: WizardStep,
        transition: Transition,
        form: &IntakeForm,
    ) -> Option<WizardStep> {
        self.edges
            .iter()
            .find(|e| e.from == from && e.transition == transition && e.guard.holds(form))
            .map(|e| e.to)
    }
}
