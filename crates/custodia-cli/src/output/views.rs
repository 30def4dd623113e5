//! Text renderings of register values.

use std::fmt::Write as FmtWrite;

use custodia_common_core::timestamp::BR_DATE_FORMAT;
use custodia_common_core::{ActivityId, Timestamp};
use custodia_privacy::{
    ActivityStats, DpiaAssessment, ProcessingActivity, RatReport, StatsSnapshot,
};
use serde::Serialize;

use super::table::{Alignment, Column, Table};
use super::{terminal_width, FormattedOutput};

fn date(at: Option<Timestamp>) -> String {
    at.map(|t| t.format_date(BR_DATE_FORMAT)).unwrap_or_else(|| "-".to_string())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Sim"
    } else {
        "Não"
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

/// Outcome of a mutation.
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ActivityId>,
}

impl StatusOutput {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: ActivityId) -> Self {
        self.id = Some(id);
        self
    }
}

impl FormattedOutput for StatusOutput {
    fn format_text(&self) -> String {
        match self.id {
            Some(id) => format!("✓ {} ({id})", self.message),
            None => format!("✓ {}", self.message),
        }
    }
}

/// One page of activities.
#[derive(Debug, Serialize)]
pub struct ActivityList {
    pub total: u64,
    pub activities: Vec<ProcessingActivity>,
}

impl FormattedOutput for ActivityList {
    fn format_text(&self) -> String {
        if self.activities.is_empty() {
            return "Nenhuma atividade encontrada.".to_string();
        }

        let mut table = Table::new(vec![
            Column::new("ID").max_width(40),
            Column::new("Nome").max_width(40),
            Column::new("Departamento").max_width(20),
            Column::new("Finalidade").max_width(28),
            Column::new("Status"),
            Column::new("Alto risco"),
            Column::new("Criado em").align(Alignment::Right),
        ]);
        for a in &self.activities {
            table.add_row(vec![
                a.id.to_string(),
                a.name.clone(),
                or_dash(a.department.as_deref()).to_string(),
                a.purpose.label().to_string(),
                a.status.label().to_string(),
                yes_no(a.is_high_risk).to_string(),
                date(Some(a.created_at)),
            ]);
        }

        let mut out = table.render(terminal_width());
        let _ = write!(out, "\n{} de {} atividade(s)", self.activities.len(), self.total);
        out
    }
}

impl FormattedOutput for ProcessingActivity {
    fn format_text(&self) -> String {
        let mut out = String::new();
        let list = |values: &std::collections::BTreeSet<String>| {
            if values.is_empty() {
                "-".to_string()
            } else {
                values.iter().cloned().collect::<Vec<_>>().join(", ")
            }
        };

        let _ = writeln!(out, "{} ({})", self.name, self.id);
        let _ = writeln!(out, "  Descrição:        {}", self.description);
        let _ = writeln!(out, "  Departamento:     {}", or_dash(self.department.as_deref()));
        let _ = writeln!(out, "  Controlador:      {}", or_dash(self.controller_name.as_deref()));
        let _ = writeln!(out, "  Operador:         {}", or_dash(self.processor_name.as_deref()));
        let _ = writeln!(out, "  Finalidade:       {}", self.purpose.label());
        let _ = writeln!(
            out,
            "  Base legal:       {}",
            self.legal_basis.map(|b| b.label()).unwrap_or("-")
        );
        let _ = writeln!(out, "  Categorias:       {}", list(&self.data_categories));
        let _ = writeln!(out, "  Titulares:        {}", list(&self.data_subjects));
        let _ = writeln!(out, "  Alto risco:       {}", yes_no(self.is_high_risk));
        let _ = writeln!(
            out,
            "  Transf. internac.: {}",
            yes_no(self.has_international_transfer)
        );
        let _ = writeln!(out, "  Status:           {}", self.status.label());
        if let Some(reason) = &self.suspension_reason {
            let _ = writeln!(out, "  Motivo suspensão: {reason} ({})", date(self.suspended_at));
        }
        let _ = writeln!(out, "  Revisão:          {}", self.review_status);
        let _ = writeln!(out, "  Próxima revisão:  {}", date(self.next_review_date));
        if let Some(compliant) = self.is_compliant {
            let _ = writeln!(
                out,
                "  Conforme:         {} ({})",
                yes_no(compliant),
                date(self.validated_at)
            );
        }
        let _ = write!(out, "  Criado em:        {}", date(Some(self.created_at)));
        out
    }
}

/// Assessment of one activity.
#[derive(Debug, Serialize)]
pub struct AssessmentView {
    pub activity_id: ActivityId,
    #[serde(flatten)]
    pub assessment: DpiaAssessment,
}

impl FormattedOutput for AssessmentView {
    fn format_text(&self) -> String {
        let a = &self.assessment;
        let mut out = String::new();
        let _ = writeln!(out, "Atividade:      {}", self.activity_id);
        let _ = writeln!(out, "Nível de risco: {}", a.risk_level.label());
        let _ = writeln!(out, "Requer RIPD:    {}", yes_no(a.requires_impact_assessment));
        if a.risk_factors.is_empty() {
            let _ = writeln!(out, "Fatores:        nenhum");
        } else {
            let _ = writeln!(out, "Fatores:");
            for factor in a.factor_descriptions() {
                let _ = writeln!(out, "  - {factor}");
            }
        }
        let _ = write!(out, "Recomendação:   {}", a.recommendation);
        out
    }
}

fn stats_text(stats: &ActivityStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total de atividades:         {}", stats.total);
    for (status, count) in &stats.by_status {
        let _ = writeln!(out, "  {:<26} {count}", status.label());
    }
    let _ = writeln!(out, "Alto risco:                  {}", stats.high_risk);
    let _ = writeln!(out, "Transferência internacional: {}", stats.international_transfer);
    let _ = writeln!(out, "Criadas neste mês:           {}", stats.created_this_month);

    let _ = writeln!(out, "\nPor departamento:");
    for (department, count) in &stats.by_department {
        let _ = writeln!(out, "  {department:<26} {count}");
    }
    let _ = writeln!(out, "  {:<26} {}", "(sem departamento)", stats.without_department);

    let _ = writeln!(out, "\nPor finalidade:");
    for (purpose, count) in stats.by_purpose.iter().filter(|(_, c)| **c > 0) {
        let _ = writeln!(out, "  {:<26} {count}", purpose.label());
    }

    let _ = writeln!(out, "\nPor base legal:");
    for (basis, count) in stats.by_legal_basis.iter().filter(|(_, c)| **c > 0) {
        let _ = writeln!(out, "  {:<26} {count}", basis.label());
    }
    let _ = write!(out, "  {:<26} {}", "(sem base legal)", stats.without_legal_basis);
    out
}

impl FormattedOutput for StatsSnapshot {
    fn format_text(&self) -> String {
        match self {
            StatsSnapshot::Available(stats) => stats_text(stats),
            StatsSnapshot::Unavailable { reason } => {
                format!("Estatísticas indisponíveis: {reason}")
            }
        }
    }
}

impl FormattedOutput for RatReport {
    fn format_text(&self) -> String {
        let mut table = Table::new(vec![
            Column::new("Nome").max_width(40),
            Column::new("Departamento").max_width(20),
            Column::new("Finalidade").max_width(28),
            Column::new("Risco"),
            Column::new("RIPD"),
        ]);
        for entry in &self.entries {
            table.add_row(vec![
                entry.activity.name.clone(),
                or_dash(entry.activity.department.as_deref()).to_string(),
                entry.activity.purpose.label().to_string(),
                entry.assessment.risk_level.label().to_string(),
                yes_no(entry.assessment.requires_impact_assessment).to_string(),
            ]);
        }

        let mut out = format!(
            "Registro de Atividades de Tratamento - gerado em {}\n\n",
            self.generated_at.format_date(BR_DATE_FORMAT)
        );
        if table.is_empty() {
            out.push_str("Nenhuma atividade no escopo do relatório.\n");
        } else {
            out.push_str(&table.render(terminal_width()));
        }

        let s = &self.summary;
        let _ = write!(out, "\nAtividades: {}   Requerem RIPD: {}", s.total, s.requiring_dpia);
        for (level, count) in &s.by_risk_level {
            let _ = write!(out, "   {}: {count}", level.label());
        }
        out
    }
}
