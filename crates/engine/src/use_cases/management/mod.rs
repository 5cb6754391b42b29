//! Management use cases for CRUD-style operations.
//!
//! These keep HTTP handlers thin: input validation, existence checks and
//! timestamps happen here, storage goes through the port traits.

use everdice_domain::DomainError;

use crate::infrastructure::ports::RepoError;
use crate::use_cases::trace::TraceError;

mod campaign;
mod character;

pub use campaign::{CampaignCrud, CreateCampaignInput, UpdateCampaignInput};
pub use character::{CharacterCrud, CreateCharacterInput, UpdateCharacterInput};

/// Shared error type for management use cases.
#[derive(Debug, thiserror::Error)]
pub enum ManagementError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),
}

impl ManagementError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }
}

/// Container for management use cases.
pub struct ManagementUseCases {
    pub character: CharacterCrud,
    pub campaign: CampaignCrud,
}

impl ManagementUseCases {
    pub fn new(character: CharacterCrud, campaign: CampaignCrud) -> Self {
        Self {
            character,
            campaign,
        }
    }
}

/// Trim an optional text field, treating blank input as absent.
pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
