use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Pillar {
    Access,
    Usage,
    Affordability,
    Gender,
}

impl Pillar {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ACCESS" => Some(Self::Access),
            "USAGE" => Some(Self::Usage),
            "AFFORDABILITY" => Some(Self::Affordability),
            "GENDER" => Some(Self::Gender),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Access => "ACCESS",
            Self::Usage => "USAGE",
            Self::Affordability => "AFFORDABILITY",
            Self::Gender => "GENDER",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Policy,
    Infrastructure,
    ProductLaunch,
    MarketEntry,
    Milestone,
    Partnership,
    Pricing,
}

impl EventCategory {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "policy" => Some(Self::Policy),
            "infrastructure" => Some(Self::Infrastructure),
            "product_launch" => Some(Self::ProductLaunch),
            "market_entry" => Some(Self::MarketEntry),
            "milestone" => Some(Self::Milestone),
            "partnership" => Some(Self::Partnership),
            "pricing" => Some(Self::Pricing),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Policy => "policy",
            Self::Infrastructure => "infrastructure",
            Self::ProductLaunch => "product_launch",
            Self::MarketEntry => "market_entry",
            Self::Milestone => "milestone",
            Self::Partnership => "partnership",
            Self::Pricing => "pricing",
        }
    }

    /// Pricing shocks are modeled as transient: the effect peaks and then
    /// decays instead of holding as a permanent step-change.
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Pricing)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increase,
    Decrease,
}

impl Direction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "increase" => Some(Self::Increase),
            "decrease" => Some(Self::Decrease),
            _ => None,
        }
    }

    pub fn sign(self) -> f64 {
        match self {
            Self::Increase => 1.0,
            Self::Decrease => -1.0,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MagnitudeClass {
    Low,
    Medium,
    High,
}

impl MagnitudeClass {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Observation {
    pub indicator_code: String,
    pub pillar: Pillar,
    pub value: f64,
    pub date: NaiveDate,
    pub unit: String,
    pub confidence: Confidence,
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: String,
    pub date: NaiveDate,
    pub category: EventCategory,
    pub description: String,
    pub source: String,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpactLink {
    pub id: String,
    pub event_id: String,
    pub target_indicator: String,
    pub direction: Direction,
    pub magnitude: MagnitudeClass,
    pub lag_months: u32,
    pub evidence_basis: String,
    pub comparable_country: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Target {
    pub indicator_code: String,
    pub value: f64,
    pub date: NaiveDate,
}

/// Valid value range for an indicator; forecast estimates and bounds are
/// clamped into it after band computation.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const PERCENT: ValueRange = ValueRange {
        min: 0.0,
        max: 100.0,
    };

    pub const NON_NEGATIVE: ValueRange = ValueRange {
        min: 0.0,
        max: f64::INFINITY,
    };

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Base,
    Optimistic,
    Pessimistic,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Self::Base, Self::Optimistic, Self::Pessimistic];
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    BaselineOnly,
    EventAdjusted,
}

/// One projected point on the forecast horizon. The whole horizon is
/// regenerated as a unit on every run so bounds stay internally consistent.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastPoint {
    pub indicator_code: String,
    pub date: NaiveDate,
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
    pub scenario: Scenario,
    pub provenance: Provenance,
    pub contributing_links: Vec<String>,
}
