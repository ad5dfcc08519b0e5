use serde::{Deserialize, Serialize};

/// The minimal company record cached as the current selection.
///
/// Descriptive fields are presentation-only and may be stale when the record
/// was hydrated from storage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headquarters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl CompanySummary {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    pub fn with_headquarters(mut self, headquarters: impl Into<String>) -> Self {
        self.headquarters = Some(headquarters.into());
        self
    }

    pub fn with_logo_url(mut self, logo_url: impl Into<String>) -> Self {
        self.logo_url = Some(logo_url.into());
        self
    }

    /// First character of the name, used as a placeholder avatar.
    pub fn initial(&self) -> char {
        self.name.chars().next().unwrap_or('?')
    }
}

/// Snapshot of the store handed to readers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub company: Option<CompanySummary>,
    /// True until startup hydration has resolved.
    pub loading: bool,
}

impl Selection {
    pub fn company_id(&self) -> Option<&str> {
        self.company.as_ref().map(|c| c.id.as_str())
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            company: None,
            loading: true,
        }
    }
}
