use std::collections::BTreeMap;

use serde::Serialize;

use super::forms::{FormParams, RecordRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Edit,
    Show,
    Index,
}

impl Action {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Show => "show",
            Self::Index => "index",
        }
    }
}

/// Where the provider goes after a successful step submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Destination {
    pub controller: String,
    pub action: Action,
    pub params: BTreeMap<String, String>,
}

impl Destination {
    pub fn edit(controller: &str) -> Self {
        Self::new(controller, Action::Edit)
    }

    pub fn show(controller: &str) -> Self {
        Self::new(controller, Action::Show)
    }

    pub fn index(controller: &str) -> Self {
        Self::new(controller, Action::Index)
    }

    fn new(controller: &str, action: Action) -> Self {
        Self {
            controller: controller.to_string(),
            action,
            params: BTreeMap::new(),
        }
    }

    pub fn with_record(mut self, record_id: impl Into<String>) -> Self {
        self.params.insert("record_id".to_string(), record_id.into());
        self
    }

    pub fn new_record(self) -> Self {
        self.with_record("new")
    }

    pub fn record_id(&self) -> Option<&str> {
        self.params.get("record_id").map(String::as_str)
    }

    pub fn is(&self, controller: &str, action: Action) -> bool {
        self.controller == controller && self.action == action
    }

    /// Resolve to a concrete path under a workflow's application prefix.
    pub fn path(&self, prefix: &str, application_id: &str) -> String {
        match self.action {
            Action::Index => prefix.to_string(),
            Action::Edit | Action::Show => {
                let mut path = format!("{prefix}/{application_id}/steps/{}", self.controller);
                if let Some(record_id) = self.record_id() {
                    path.push('/');
                    path.push_str(record_id);
                }
                path
            }
        }
    }
}

/// Everything a decision tree may inspect once a step has persisted.
pub struct DecisionInput<'a, A> {
    pub application: &'a A,
    pub params: &'a FormParams,
    pub record: &'a RecordRef,
}

pub trait DecisionTree<A> {
    fn destination(&self, step_name: &str, input: &DecisionInput<'_, A>) -> Destination;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_include_the_record_segment() {
        let destination = Destination::edit("work_item").with_record("wi-3");
        assert_eq!(
            destination.path("/non-standard-magistrates/applications", "claim-1"),
            "/non-standard-magistrates/applications/claim-1/steps/work_item/wi-3"
        );
    }

    #[test]
    fn index_destinations_resolve_to_the_prefix() {
        let destination = Destination::index("claims");
        assert_eq!(destination.path("/apps", "claim-1"), "/apps");
        assert!(destination.is("claims", Action::Index));
    }
}
