use serde::Serialize;

use super::domain::PriorAuthorityApplication;
use super::forms::{
    additional_costs_complete, primary_quote_complete, step_path, CaseContactForm,
    ClientDetailForm, ReasonWhyForm, UfnForm,
};
use crate::workflows::steps::forms::StepForm;
use crate::workflows::steps::tasks::{StepTask, TaskView};
use crate::workflows::steps::values::YesNo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriorAuthorityTask {
    Ufn,
    CaseContact,
    ClientDetail,
    PrimaryQuote,
    AdditionalCosts,
    ReasonWhy,
    CheckAnswers,
}

impl PriorAuthorityTask {
    pub const ALL: [Self; 7] = [
        Self::Ufn,
        Self::CaseContact,
        Self::ClientDetail,
        Self::PrimaryQuote,
        Self::AdditionalCosts,
        Self::ReasonWhy,
        Self::CheckAnswers,
    ];
}

impl StepTask<PriorAuthorityApplication> for PriorAuthorityTask {
    fn name(self) -> &'static str {
        match self {
            Self::Ufn => "ufn",
            Self::CaseContact => "case_contact",
            Self::ClientDetail => "client_detail",
            Self::PrimaryQuote => "primary_quote",
            Self::AdditionalCosts => "additional_costs",
            Self::ReasonWhy => "reason_why",
            Self::CheckAnswers => "check_answers",
        }
    }

    fn path(self, application: &PriorAuthorityApplication) -> String {
        step_path(application, self.name(), None)
    }

    fn previous(self) -> &'static [Self] {
        match self {
            Self::Ufn => &[],
            Self::CaseContact => &[Self::Ufn],
            Self::ClientDetail => &[Self::CaseContact],
            Self::PrimaryQuote => &[Self::ClientDetail],
            Self::AdditionalCosts => &[Self::PrimaryQuote],
            Self::ReasonWhy => &[Self::AdditionalCosts],
            Self::CheckAnswers => &[
                Self::Ufn,
                Self::CaseContact,
                Self::ClientDetail,
                Self::PrimaryQuote,
                Self::AdditionalCosts,
                Self::ReasonWhy,
            ],
        }
    }

    /// Additional costs span the yes/no page and every detail page.
    fn in_progress(self, application: &PriorAuthorityApplication) -> bool {
        match self {
            Self::AdditionalCosts => application
                .navigation
                .any_starts_with(&step_path(application, "additional_cost", None)),
            _ => application.navigation.contains(&self.path(application)),
        }
    }

    fn completed(self, application: &PriorAuthorityApplication) -> bool {
        match self {
            Self::Ufn => UfnForm::from_application(application).is_valid(application),
            Self::CaseContact => CaseContactForm::from_application(application).is_valid(application),
            Self::ClientDetail => {
                ClientDetailForm::from_application(application).is_valid(application)
            }
            Self::PrimaryQuote => primary_quote_complete(application),
            Self::AdditionalCosts => {
                application.additional_costs_still_to_add == Some(YesNo::No)
                    && additional_costs_complete(application)
            }
            Self::ReasonWhy => ReasonWhyForm::from_application(application).is_valid(application),
            Self::CheckAnswers => application.status.is_submitted(),
        }
    }
}

/// Every task before check-answers is settled.
pub fn ready_to_submit(application: &PriorAuthorityApplication) -> bool {
    PriorAuthorityTask::CheckAnswers.can_start(application)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSection {
    pub title: &'static str,
    pub tasks: Vec<TaskView>,
}

const SECTIONS: [(&str, &[PriorAuthorityTask]); 3] = [
    (
        "About the case",
        &[
            PriorAuthorityTask::Ufn,
            PriorAuthorityTask::CaseContact,
            PriorAuthorityTask::ClientDetail,
        ],
    ),
    (
        "About the request",
        &[
            PriorAuthorityTask::PrimaryQuote,
            PriorAuthorityTask::AdditionalCosts,
            PriorAuthorityTask::ReasonWhy,
        ],
    ),
    ("Submit the application", &[PriorAuthorityTask::CheckAnswers]),
];

pub fn task_list(application: &PriorAuthorityApplication) -> Vec<TaskSection> {
    SECTIONS
        .iter()
        .map(|&(title, tasks)| TaskSection {
            title,
            tasks: tasks.iter().map(|task| task.view(application)).collect(),
        })
        .collect()
}
