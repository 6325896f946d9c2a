use serde::{Deserialize, Serialize};

use super::navigation::HasNavigation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotApplicable,
    Unreachable,
    NotStarted,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotApplicable => "Not Applicable",
            Self::Unreachable => "Cannot Start Yet",
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    /// Satisfies a later task's prerequisite.
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Completed | Self::NotApplicable)
    }
}

/// A task-list entry backed by one or more step forms.
///
/// Implementors are registry enums; `previous` names the tasks that must be
/// settled before this one can be started.
pub trait StepTask<A: HasNavigation>: Sized + Copy + 'static {
    fn name(self) -> &'static str;

    fn path(self, application: &A) -> String;

    fn previous(self) -> &'static [Self];

    fn completed(self, application: &A) -> bool;

    fn not_applicable(self, _application: &A) -> bool {
        false
    }

    fn in_progress(self, application: &A) -> bool {
        application.navigation().contains(&self.path(application))
    }

    fn can_start(self, application: &A) -> bool {
        self.previous()
            .iter()
            .all(|task| task.status(application).is_settled())
    }

    fn status(self, application: &A) -> TaskStatus {
        if self.not_applicable(application) {
            return TaskStatus::NotApplicable;
        }

        let entered = self.in_progress(application);
        if !entered && !self.can_start(application) {
            return TaskStatus::Unreachable;
        }
        if !entered {
            return TaskStatus::NotStarted;
        }
        if self.completed(application) {
            TaskStatus::Completed
        } else {
            TaskStatus::InProgress
        }
    }

    fn view(self, application: &A) -> TaskView {
        let status = self.status(application);
        TaskView {
            name: self.name(),
            path: self.path(application),
            status,
            status_label: status.label(),
        }
    }
}

/// Serializable task-list row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub name: &'static str,
    pub path: String,
    pub status: TaskStatus,
    pub status_label: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::steps::navigation::NavigationStack;

    #[derive(Default)]
    struct Draft {
        navigation: NavigationStack,
        first_done: bool,
        second_done: bool,
        second_skipped: bool,
    }

    impl HasNavigation for Draft {
        fn navigation(&self) -> &NavigationStack {
            &self.navigation
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Sample {
        First,
        Second,
        Third,
    }

    impl StepTask<Draft> for Sample {
        fn name(self) -> &'static str {
            match self {
                Sample::First => "first",
                Sample::Second => "second",
                Sample::Third => "third",
            }
        }

        fn path(self, _application: &Draft) -> String {
            format!("/steps/{}", self.name())
        }

        fn previous(self) -> &'static [Self] {
            match self {
                Sample::First => &[],
                Sample::Second => &[Sample::First],
                Sample::Third => &[Sample::Second],
            }
        }

        fn completed(self, application: &Draft) -> bool {
            match self {
                Sample::First => application.first_done,
                Sample::Second => application.second_done,
                Sample::Third => false,
            }
        }

        fn not_applicable(self, application: &Draft) -> bool {
            self == Sample::Second && application.second_skipped
        }
    }

    #[test]
    fn unmet_prerequisites_make_a_task_unreachable() {
        let draft = Draft::default();
        assert_eq!(Sample::Second.status(&draft), TaskStatus::Unreachable);
    }

    #[test]
    fn a_task_without_prerequisites_is_not_started() {
        let draft = Draft::default();
        assert_eq!(Sample::First.status(&draft), TaskStatus::NotStarted);
    }

    #[test]
    fn entered_tasks_report_progress_then_completion() {
        let mut draft = Draft::default();
        draft.navigation.visit("/steps/first");
        assert_eq!(Sample::First.status(&draft), TaskStatus::InProgress);

        draft.first_done = true;
        assert_eq!(Sample::First.status(&draft), TaskStatus::Completed);
        assert_eq!(Sample::Second.status(&draft), TaskStatus::NotStarted);
    }

    #[test]
    fn not_applicable_tasks_satisfy_successors() {
        let mut draft = Draft::default();
        draft.second_skipped = true;
        assert_eq!(Sample::Second.status(&draft), TaskStatus::NotApplicable);
        assert_eq!(Sample::Third.status(&draft), TaskStatus::NotStarted);
    }

    #[test]
    fn entering_a_task_bypasses_the_reachability_check() {
        let mut draft = Draft::default();
        draft.navigation.visit("/steps/third");
        assert_eq!(Sample::Third.status(&draft), TaskStatus::InProgress);
    }
}
