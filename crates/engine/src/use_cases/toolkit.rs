//! DM toolkit CRUD, generic over the record type.
//!
//! All seven kinds share one repository; [`ToolkitCrud<T>`] converts between
//! the typed [`ToolkitRecord<T>`] and the stored JSON payload.

use std::marker::PhantomData;
use std::sync::Arc;

use everdice_domain::{CampaignId, ToolkitEntry, ToolkitId, ToolkitRecord};
use serde::Deserialize;

use crate::infrastructure::ports::{
    CampaignRepo, ClockPort, RepoError, StoredToolkitRecord, ToolkitRepo,
};
use crate::use_cases::management::ManagementError;

/// Request body for creating a toolkit record: the owning campaign plus the
/// record's own fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound = "T: ToolkitEntry")]
pub struct NewToolkitRecord<T> {
    pub campaign_id: CampaignId,
    #[serde(flatten)]
    pub data: T,
}

/// Hands out typed CRUD handles over the shared toolkit storage.
pub struct ToolkitUseCases {
    toolkit: Arc<dyn ToolkitRepo>,
    campaign: Arc<dyn CampaignRepo>,
    clock: Arc<dyn ClockPort>,
}

impl ToolkitUseCases {
    pub fn new(
        toolkit: Arc<dyn ToolkitRepo>,
        campaign: Arc<dyn CampaignRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            toolkit,
            campaign,
            clock,
        }
    }

    pub fn crud<T: ToolkitEntry>(&self) -> ToolkitCrud<T> {
        ToolkitCrud {
            toolkit: self.toolkit.clone(),
            campaign: self.campaign.clone(),
            clock: self.clock.clone(),
            _kind: PhantomData,
        }
    }
}

pub struct ToolkitCrud<T> {
    toolkit: Arc<dyn ToolkitRepo>,
    campaign: Arc<dyn CampaignRepo>,
    clock: Arc<dyn ClockPort>,
    _kind: PhantomData<fn() -> T>,
}

impl<T: ToolkitEntry> ToolkitCrud<T> {
    pub async fn list(
        &self,
        campaign_id: Option<CampaignId>,
    ) -> Result<Vec<ToolkitRecord<T>>, ManagementError> {
        let stored = self.toolkit.list(T::KIND, campaign_id).await?;
        Ok(stored
            .into_iter()
            .map(decode)
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub async fn get(&self, id: ToolkitId) -> Result<Option<ToolkitRecord<T>>, ManagementError> {
        match self.toolkit.get(T::KIND, id).await? {
            Some(stored) => Ok(Some(decode(stored)?)),
            None => Ok(None),
        }
    }

    pub async fn create(
        &self,
        input: NewToolkitRecord<T>,
    ) -> Result<ToolkitRecord<T>, ManagementError> {
        input.data.validate()?;
        if self.campaign.get(input.campaign_id).await?.is_none() {
            return Err(ManagementError::not_found("Campaign", input.campaign_id));
        }

        let record = ToolkitRecord::new(input.campaign_id, input.data, self.clock.now());
        self.toolkit.save(&encode(&record)?).await?;

        tracing::info!(
            kind = %T::KIND,
            id = %record.id,
            campaign_id = %record.campaign_id,
            "Toolkit record created"
        );
        Ok(record)
    }

    /// Replace the record's fields; ownership and creation time are kept.
    pub async fn update(&self, id: ToolkitId, data: T) -> Result<ToolkitRecord<T>, ManagementError> {
        data.validate()?;
        let mut record = self
            .get(id)
            .await?
            .ok_or_else(|| ManagementError::not_found(T::KIND.as_str(), id))?;

        record.data = data;
        record.updated_at = self.clock.now();
        self.toolkit.save(&encode(&record)?).await?;
        Ok(record)
    }

    pub async fn delete(&self, id: ToolkitId) -> Result<(), ManagementError> {
        self.toolkit.delete(T::KIND, id).await?;
        Ok(())
    }
}

fn encode<T: ToolkitEntry>(record: &ToolkitRecord<T>) -> Result<StoredToolkitRecord, RepoError> {
    Ok(StoredToolkitRecord {
        id: record.id,
        kind: T::KIND,
        campaign_id: record.campaign_id,
        name: record.data.display_name().trim().to_string(),
        data: serde_json::to_value(&record.data).map_err(RepoError::serialization)?,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

fn decode<T: ToolkitEntry>(stored: StoredToolkitRecord) -> Result<ToolkitRecord<T>, RepoError> {
    Ok(ToolkitRecord {
        id: stored.id,
        campaign_id: stored.campaign_id,
        data: serde_json::from_value(stored.data).map_err(RepoError::serialization)?,
        created_at: stored.created_at,
        updated_at: stored.updated_at,
    })
}
