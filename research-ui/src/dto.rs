use company_store::CompanySummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Company record as returned by the list, search and detail endpoints.
/// The list serializer omits some fields, so everything but id/name is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub headquarters: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub ai_score: Option<i32>,
}

impl From<CompanyDto> for CompanySummary {
    fn from(dto: CompanyDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            industry: dto.industry,
            stage: dto.stage,
            headquarters: dto.headquarters,
            logo_url: dto.logo_url,
        }
    }
}

/// List endpoints answer either a paginated envelope or a bare array.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page { results: Vec<T> },
    Bare(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Page { results } => results,
            Listing::Bare(items) => items,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// `GET /companies/{id}/full_analysis/`. Lists missing from the payload are empty.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct FullAnalysisDto {
    #[serde(default)]
    pub metrics_summary: MetricsSummaryDto,
    #[serde(default)]
    pub high_level_analyses: Vec<AnalysisDto>,
    #[serde(default)]
    pub perception_analyses: Vec<AnalysisDto>,
    #[serde(default)]
    pub market_analyses: Vec<AnalysisDto>,
    #[serde(default)]
    pub key_individuals_analyses: Vec<AnalysisDto>,
    #[serde(default)]
    pub competitive_analyses: Vec<AnalysisDto>,
}

/// Fields shared by every analysis kind; kind-specific blocks are ignored.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct AnalysisDto {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub overall_score: Option<i32>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct DashboardStatsDto {
    #[serde(default)]
    pub active_prospects: u32,
    /// Decimal, see [`MetricsSummaryDto::total_investment`].
    #[serde(default)]
    pub investment_pipeline: serde_json::Value,
    #[serde(default)]
    pub analysis_completed: u32,
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub new_companies_this_week: u32,
    #[serde(default)]
    pub avg_match_score: f64,
    #[serde(default)]
    pub hot_leads: u32,
}

impl DashboardStatsDto {
    /// `$2.5M` style.
    pub fn pipeline_label(&self) -> String {
        format!("${:.1}M", decimal(&self.investment_pipeline) / 1_000_000.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RecentAnalysisDto {
    pub id: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub analysis_type: Option<String>,
    pub title: String,
    #[serde(default)]
    pub overall_score: Option<i32>,
    #[serde(default)]
    pub analyst_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UpcomingTaskDto {
    /// Lead id on the backend.
    pub id: String,
    pub task: String,
    pub priority: String,
    pub due_date: String,
    #[serde(rename = "type")]
    pub kind: String,
}

fn decimal(value: &serde_json::Value) -> f64 {
    match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MetricsSummaryDto {
    #[serde(default)]
    pub total_analyses: u32,
    #[serde(default)]
    pub avg_score: f64,
    #[serde(default)]
    pub avg_confidence: f64,
    /// Decimal on the backend; arrives as a number or a string.
    #[serde(default)]
    pub total_investment: serde_json::Value,
    #[serde(default)]
    pub lead_status_breakdown: BTreeMap<String, u32>,
}

impl MetricsSummaryDto {
    pub fn total_investment_label(&self) -> String {
        match &self.total_investment {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => "0".to_string(),
        }
    }
}
