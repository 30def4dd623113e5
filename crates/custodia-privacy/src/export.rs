//! Export layouts for the register.

use crate::activity::ProcessingActivity;
use crate::report::RatEntry;
use custodia_common_core::Timestamp;
use custodia_export::{Cell, ExportRecord};
use std::collections::BTreeSet;

fn join(values: &BTreeSet<String>) -> Cell {
    if values.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(values.iter().cloned().collect::<Vec<_>>().join(", "))
    }
}

fn date(at: Option<Timestamp>) -> Cell {
    Cell::Date(at.map(|t| t.as_datetime()))
}

impl ExportRecord for ProcessingActivity {
    fn columns() -> &'static [&'static str] {
        &[
            "Nome",
            "Descrição",
            "Departamento",
            "Controlador",
            "Operador",
            "Finalidade",
            "Base legal",
            "Categorias de dados",
            "Titulares",
            "Alto risco",
            "Transferência internacional",
            "Status",
            "Criado em",
            "Próxima revisão",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.name.as_str().into(),
            self.description.as_str().into(),
            self.department.clone().into(),
            self.controller_name.clone().into(),
            self.processor_name.clone().into(),
            self.purpose.label().into(),
            self.legal_basis.map(|b| b.label()).unwrap_or_default().into(),
            join(&self.data_categories),
            join(&self.data_subjects),
            self.is_high_risk.into(),
            self.has_international_transfer.into(),
            self.status.label().into(),
            date(Some(self.created_at)),
            date(self.next_review_date),
        ]
    }
}

impl ExportRecord for RatEntry {
    fn columns() -> &'static [&'static str] {
        &[
            "Nome",
            "Departamento",
            "Finalidade",
            "Base legal",
            "Categorias de dados",
            "Titulares",
            "Transferência internacional",
            "Nível de risco",
            "Requer RIPD",
            "Fatores de risco",
            "Recomendação",
            "Status",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        let activity = &self.activity;
        vec![
            activity.name.as_str().into(),
            activity.department.clone().into(),
            activity.purpose.label().into(),
            activity.legal_basis.map(|b| b.label()).unwrap_or_default().into(),
            join(&activity.data_categories),
            join(&activity.data_subjects),
            activity.has_international_transfer.into(),
            self.assessment.risk_level.label().into(),
            self.assessment.requires_impact_assessment.into(),
            self.assessment.factor_descriptions().join("; ").into(),
            self.assessment.recommendation.as_str().into(),
            activity.status.label().into(),
        ]
    }
}
