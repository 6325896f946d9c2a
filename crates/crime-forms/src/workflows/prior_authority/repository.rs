use super::domain::{ApplicationId, PriorAuthorityApplication};
use crate::workflows::steps::ports::RepositoryError;

pub trait PriorAuthorityRepository: Send + Sync {
    fn insert(
        &self,
        application: PriorAuthorityApplication,
    ) -> Result<PriorAuthorityApplication, RepositoryError>;
    fn update(&self, application: PriorAuthorityApplication) -> Result<(), RepositoryError>;
    fn fetch(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<PriorAuthorityApplication>, RepositoryError>;
    fn all(&self) -> Result<Vec<PriorAuthorityApplication>, RepositoryError>;
    fn delete(&self, id: &ApplicationId) -> Result<(), RepositoryError>;
}
