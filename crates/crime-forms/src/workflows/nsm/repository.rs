use super::domain::{Claim, ClaimId};
use crate::workflows::steps::ports::RepositoryError;

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ClaimRepository: Send + Sync {
    fn insert(&self, claim: Claim) -> Result<Claim, RepositoryError>;
    fn update(&self, claim: Claim) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ClaimId) -> Result<Option<Claim>, RepositoryError>;
    fn all(&self) -> Result<Vec<Claim>, RepositoryError>;
}
