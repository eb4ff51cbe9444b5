//! Required-field checks run before a mutation is sent.

use crate::error::ValidationError;
use crate::types::{
    AssignToCampaign, CampaignDraft, GenerateMessageRequest, ScrapeLeadsRequest, SendCampaign,
    UploadLeads,
};

/// Implemented by every request body that has client-side rules.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn require(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

impl Validate for CampaignDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.name, "Campaign name")?;
        require(&self.subject, "Subject")?;
        require(&self.body, "Body")
    }
}

impl Validate for UploadLeads {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.csv_data, "CSV data")?;
        if self.csv_data.lines().filter(|l| !l.trim().is_empty()).count() < 2 {
            return Err(ValidationError::invalid(
                "CSV data",
                "expected a header row and at least one lead",
            ));
        }
        Ok(())
    }
}

impl Validate for AssignToCampaign {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.lead_ids.is_empty() {
            return Err(ValidationError::required("Lead selection"));
        }
        Ok(())
    }
}

impl Validate for SendCampaign {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.lead_ids.is_empty() {
            return Err(ValidationError::required("Recipients"));
        }
        Ok(())
    }
}

impl Validate for ScrapeLeadsRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let any = [
            &self.keywords,
            &self.industry,
            &self.location,
            &self.current_company,
            &self.job_title,
        ]
        .iter()
        .any(|v| !v.trim().is_empty());
        if !any {
            return Err(ValidationError::invalid(
                "Search filters",
                "at least one filter must be set",
            ));
        }
        Ok(())
    }
}

impl Validate for GenerateMessageRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.lead_info, "Lead information")?;
        require(&self.tone, "Tone")
    }
}
