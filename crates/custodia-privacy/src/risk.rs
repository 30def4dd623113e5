//! DPIA (RIPD) risk classification.
//!
//! [`classify`] is a pure function over one [`ProcessingActivity`]. Rules run
//! in a fixed order and accumulate: every matching rule adds a factor, and
//! the level only ever moves up.

use crate::activity::{ProcessingActivity, ProcessingPurpose};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Overall risk of a processing activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Display, EnumIter, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Baixo",
            Self::Medium => "Médio",
            Self::High => "Alto",
        }
    }
}

/// A reason contributing to the risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    FlaggedHighRisk,
    InternationalTransfer,
    SensitiveData,
    BiometricData,
    BehavioralProfiling,
    Minors,
}

impl RiskFactor {
    /// Human readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::FlaggedHighRisk => "classified as high risk",
            Self::InternationalTransfer => "international data transfer",
            Self::SensitiveData => "processes sensitive data categories",
            Self::BiometricData => "biometric data",
            Self::BehavioralProfiling => "behavioral analysis / profiling",
            Self::Minors => "data belonging to minors",
        }
    }

    /// Level this factor raises the assessment to, at least.
    pub fn floor(&self) -> RiskLevel {
        match self {
            Self::InternationalTransfer | Self::BehavioralProfiling => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }
}

impl std::fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

pub const RECOMMEND_DPIA: &str =
    "Elaborar Relatório de Impacto à Proteção de Dados (RIPD) antes de continuar o tratamento.";
pub const RECOMMEND_MONITORING: &str =
    "Manter monitoramento contínuo do tratamento e reavaliar periodicamente.";
pub const RECOMMEND_MAINTAIN: &str = "Manter as boas práticas atuais de proteção de dados.";

/// Result of evaluating one activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DpiaAssessment {
    pub requires_impact_assessment: bool,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<RiskFactor>,
    pub recommendation: String,
}

impl DpiaAssessment {
    /// Factor descriptions in rule order.
    pub fn factor_descriptions(&self) -> Vec<&'static str> {
        self.risk_factors.iter().map(RiskFactor::description).collect()
    }

    pub fn has_factor(&self, factor: RiskFactor) -> bool {
        self.risk_factors.contains(&factor)
    }
}

/// Classify an activity.
pub fn classify(activity: &ProcessingActivity) -> DpiaAssessment {
    let rules = [
        (activity.is_high_risk, RiskFactor::FlaggedHighRisk),
        (activity.has_international_transfer, RiskFactor::InternationalTransfer),
        (activity.has_category("sensitive"), RiskFactor::SensitiveData),
        (activity.has_category("biometric"), RiskFactor::BiometricData),
        (
            activity.purpose == ProcessingPurpose::BehavioralAnalysis,
            RiskFactor::BehavioralProfiling,
        ),
        (activity.has_subject("children"), RiskFactor::Minors),
    ];

    let mut risk_level = RiskLevel::Low;
    let mut risk_factors = Vec::new();
    for (fired, factor) in rules {
        if fired {
            risk_factors.push(factor);
            risk_level = risk_level.max(factor.floor());
        }
    }

    let requires_impact_assessment = risk_level == RiskLevel::High || risk_factors.len() >= 2;
    let recommendation = if requires_impact_assessment {
        RECOMMEND_DPIA
    } else if risk_level == RiskLevel::Medium {
        RECOMMEND_MONITORING
    } else {
        RECOMMEND_MAINTAIN
    };

    DpiaAssessment {
        requires_impact_assessment,
        risk_level,
        risk_factors,
        recommendation: recommendation.to_string(),
    }
}
