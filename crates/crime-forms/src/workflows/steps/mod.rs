//! Building blocks shared by every multi-step workflow: form parameter
//! handling and validation, navigation history, task status derivation,
//! decision tree destinations, coded values, money helpers and the ports
//! the services talk to.

pub mod decisions;
pub mod forms;
pub mod money;
pub mod navigation;
pub mod ports;
pub mod responses;
pub mod tasks;
pub mod values;

pub use decisions::{Action, DecisionInput, DecisionTree, Destination};
pub use forms::{
    run_step, Checker, ErrorKind, FormErrors, FormParams, RecordMissing, RecordRef, StepForm,
};
pub use navigation::{HasNavigation, NavigationStack};
pub use ports::{
    ErrorReporter, Provider, QueueError, RepositoryError, SubmissionJob, SubmissionQueue,
};
pub use tasks::{StepTask, TaskStatus, TaskView};
pub use values::{Coded, CodedField, Translated, YesNo};
