use serde::{Deserialize, Serialize};

/// Ordered record of the step pages a provider has opened for one application.
///
/// Revisiting a page already on the stack discards everything recorded after
/// it, so the stack always describes a single path through the workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavigationStack(Vec<String>);

impl NavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visit(&mut self, path: &str) {
        match self.0.iter().position(|entry| entry == path) {
            Some(index) => self.0.truncate(index + 1),
            None => self.0.push(path.to_string()),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.iter().any(|entry| entry == path)
    }

    pub fn any_starts_with(&self, prefix: &str) -> bool {
        self.0.iter().any(|entry| entry.starts_with(prefix))
    }

    pub fn entries(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for NavigationStack {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Applications that carry a navigation stack.
pub trait HasNavigation {
    fn navigation(&self) -> &NavigationStack;
}
