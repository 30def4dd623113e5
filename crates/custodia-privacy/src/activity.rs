//! Processing activity records.

use custodia_common_core::{ActivityId, TenantId, Timestamp, UserId};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Business purpose of a processing activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Display, EnumIter, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProcessingPurpose {
    Marketing,
    Payroll,
    AccessControl,
    BehavioralAnalysis,
    CustomerService,
    Recruitment,
    EmployeeManagement,
    Billing,
    FraudPrevention,
    LegalCompliance,
    SecurityMonitoring,
    Research,
    ProductImprovement,
    VendorManagement,
    HealthSafety,
}

impl ProcessingPurpose {
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// pt-BR label used in documents.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Marketing => "Marketing",
            Self::Payroll => "Folha de pagamento",
            Self::AccessControl => "Controle de acesso",
            Self::BehavioralAnalysis => "Análise comportamental",
            Self::CustomerService => "Atendimento ao cliente",
            Self::Recruitment => "Recrutamento",
            Self::EmployeeManagement => "Gestão de colaboradores",
            Self::Billing => "Faturamento",
            Self::FraudPrevention => "Prevenção a fraudes",
            Self::LegalCompliance => "Cumprimento legal",
            Self::SecurityMonitoring => "Monitoramento de segurança",
            Self::Research => "Pesquisa",
            Self::ProductImprovement => "Melhoria de produtos",
            Self::VendorManagement => "Gestão de fornecedores",
            Self::HealthSafety => "Saúde e segurança",
        }
    }
}

/// Legal bases for processing under LGPD Art. 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Display, EnumIter, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LegalBasis {
    /// Art. 7, I.
    Consent,
    /// Art. 7, II.
    LegalObligation,
    /// Art. 7, III.
    PublicPolicy,
    /// Art. 7, IV.
    Research,
    /// Art. 7, V.
    Contract,
    /// Art. 7, VI.
    JudicialProcess,
    /// Art. 7, VII.
    VitalInterest,
    /// Art. 7, VIII.
    HealthProtection,
    /// Art. 7, IX.
    LegitimateInterest,
    /// Art. 7, X.
    CreditProtection,
}

impl LegalBasis {
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Consent => "Consentimento",
            Self::LegalObligation => "Obrigação legal",
            Self::PublicPolicy => "Políticas públicas",
            Self::Research => "Estudos por órgão de pesquisa",
            Self::Contract => "Execução de contrato",
            Self::JudicialProcess => "Exercício regular de direitos",
            Self::VitalInterest => "Proteção da vida",
            Self::HealthProtection => "Tutela da saúde",
            Self::LegitimateInterest => "Legítimo interesse",
            Self::CreditProtection => "Proteção do crédito",
        }
    }
}

/// Lifecycle status of an activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Display, EnumIter, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityStatus {
    Active,
    Suspended,
    #[default]
    UnderReview,
}

impl ActivityStatus {
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Ativa",
            Self::Suspended => "Suspensa",
            Self::UnderReview => "Em revisão",
        }
    }
}

/// Outcome of the last review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Null sets and null elements both read as absent.
fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Option<String>>>::deserialize(deserializer)?;
    Ok(items.into_iter().flatten().flatten().collect())
}

fn null_as_default<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: Default + Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// One declared purpose for which a tenant processes personal data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingActivity {
    pub id: ActivityId,
    pub tenant_id: TenantId,

    pub name: String,
    pub description: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub controller_name: Option<String>,
    #[serde(default)]
    pub processor_name: Option<String>,

    pub purpose: ProcessingPurpose,
    #[serde(default)]
    pub legal_basis: Option<LegalBasis>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data_categories: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data_subjects: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_high_risk: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_international_transfer: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ActivityStatus,
    #[serde(default)]
    pub suspension_reason: Option<String>,
    #[serde(default)]
    pub suspended_at: Option<Timestamp>,

    #[serde(default)]
    pub is_compliant: Option<bool>,
    #[serde(default)]
    pub validated_by: Option<UserId>,
    #[serde(default)]
    pub validated_at: Option<Timestamp>,
    #[serde(default)]
    pub validation_notes: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub review_status: ReviewStatus,
    #[serde(default)]
    pub review_notes: Option<String>,
    #[serde(default)]
    pub reviewed_by: Option<UserId>,
    #[serde(default)]
    pub reviewed_at: Option<Timestamp>,
    #[serde(default)]
    pub next_review_date: Option<Timestamp>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub created_by: Option<UserId>,
    #[serde(default)]
    pub updated_by: Option<UserId>,
}

impl ProcessingActivity {
    /// A fresh record awaiting review.
    pub fn new(
        tenant_id: TenantId,
        name: impl Into<String>,
        description: impl Into<String>,
        purpose: ProcessingPurpose,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: ActivityId::new(),
            tenant_id,
            name: name.into(),
            description: description.into(),
            department: None,
            controller_name: None,
            processor_name: None,
            purpose,
            legal_basis: None,
            data_categories: BTreeSet::new(),
            data_subjects: BTreeSet::new(),
            is_high_risk: false,
            has_international_transfer: false,
            status: ActivityStatus::UnderReview,
            suspension_reason: None,
            suspended_at: None,
            is_compliant: None,
            validated_by: None,
            validated_at: None,
            validation_notes: None,
            review_status: ReviewStatus::Pending,
            review_notes: None,
            reviewed_by: None,
            reviewed_at: None,
            next_review_date: None,
            created_at: now,
            updated_at: now,
            created_by: None,
            updated_by: None,
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.status == ActivityStatus::Suspended
    }

    /// Whether a category is present, ignoring case and surrounding space.
    pub fn has_category(&self, category: &str) -> bool {
        contains_normalized(&self.data_categories, category)
    }

    /// Whether a data subject is present, ignoring case and surrounding space.
    pub fn has_subject(&self, subject: &str) -> bool {
        contains_normalized(&self.data_subjects, subject)
    }
}

fn contains_normalized(set: &BTreeSet<String>, needle: &str) -> bool {
    set.iter().any(|v| v.trim().eq_ignore_ascii_case(needle))
}

/// Input for registering a new activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActivity {
    pub name: String,
    pub description: String,
    pub purpose: ProcessingPurpose,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub controller_name: Option<String>,
    #[serde(default)]
    pub processor_name: Option<String>,
    #[serde(default)]
    pub legal_basis: Option<LegalBasis>,
    #[serde(default)]
    pub data_categories: BTreeSet<String>,
    #[serde(default)]
    pub data_subjects: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_high_risk: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_international_transfer: bool,
}

impl NewActivity {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        purpose: ProcessingPurpose,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            purpose,
            department: None,
            controller_name: None,
            processor_name: None,
            legal_basis: None,
            data_categories: BTreeSet::new(),
            data_subjects: BTreeSet::new(),
            is_high_risk: false,
            has_international_transfer: false,
        }
    }

    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn legal_basis(mut self, basis: LegalBasis) -> Self {
        self.legal_basis = Some(basis);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.data_categories.insert(category.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.data_subjects.insert(subject.into());
        self
    }

    pub fn high_risk(mut self, value: bool) -> Self {
        self.is_high_risk = value;
        self
    }

    pub fn international_transfer(mut self, value: bool) -> Self {
        self.has_international_transfer = value;
        self
    }
}

/// Partial update of descriptive and classification fields.
///
/// Status and review fields are only changed through lifecycle operations.
/// `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub department: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub controller_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub processor_name: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<ProcessingPurpose>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub legal_basis: Option<Option<LegalBasis>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_categories: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_subjects: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_high_risk: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_international_transfer: Option<bool>,
}

impl ActivityPatch {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
