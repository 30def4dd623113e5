//! End-to-end tests of the `custodia` binary against a temporary SQLite register.

mod common;

use common::{json, OutputAssertions, TestContext, OTHER_TENANT, TENANT};
use predicates::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn test_help_lists_commands() {
    let ctx = TestContext::new();
    ctx.command()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("activity"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("report"));
}

#[test]
fn test_missing_session_is_config_error() {
    let ctx = TestContext::new();
    let output = ctx
        .command()
        .env_remove("CUSTODIA_USER_ID")
        .args(["activity", "list"])
        .output()
        .unwrap();

    output.assert_exit_code(2);
    output.assert_stderr_contains("error[E001]: No session configured");
    output.assert_stderr_contains("hint:");
}

#[test]
fn test_activity_lifecycle() {
    let ctx = TestContext::new();
    let id = ctx.create_activity("Folha de pagamento", &["--department", "RH"]);

    let listed = ctx.json(&["activity", "list"]);
    json::assert_success(&listed);
    assert_eq!(listed["data"]["total"], 1);
    assert_eq!(listed["data"]["activities"][0]["status"], "under_review");

    let approved = ctx.json(&["activity", "review", "approve", &id]);
    json::assert_success(&approved);

    let shown = ctx.json(&["activity", "show", &id]);
    assert_eq!(shown["data"]["status"], "active");
    assert_eq!(shown["data"]["review_status"], "approved");
    assert!(shown["data"]["next_review_date"].is_string());

    ctx.command()
        .args(["activity", "suspend", &id, "--reason", "Base legal em revisão"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Atividade suspensa"));

    let suspended = ctx.json(&["activity", "show", &id]);
    assert_eq!(suspended["data"]["status"], "suspended");
    assert_eq!(suspended["data"]["suspension_reason"], "Base legal em revisão");

    ctx.command()
        .args(["activity", "reactivate", &id])
        .assert()
        .success();

    let again = ctx
        .command()
        .args(["activity", "reactivate", &id])
        .output()
        .unwrap();
    again.assert_exit_code(7);
    again.assert_stderr_contains("error[E006]");
}

#[test]
fn test_reject_suspends_activity() {
    let ctx = TestContext::new();
    let id = ctx.create_activity("Campanha", &["--purpose", "marketing"]);

    ctx.command()
        .args(["activity", "review", "reject", &id, "--notes", "Sem base legal"])
        .assert()
        .success();

    let shown = ctx.json(&["activity", "show", &id]);
    assert_eq!(shown["data"]["status"], "suspended");
    assert_eq!(shown["data"]["suspension_reason"], "Sem base legal");
    assert_eq!(shown["data"]["review_status"], "rejected");
}

#[test]
fn test_create_rejects_blank_name() {
    let ctx = TestContext::new();
    let output = ctx
        .command()
        .args([
            "activity",
            "create",
            "--name",
            "   ",
            "--description",
            "x",
            "--purpose",
            "payroll",
        ])
        .output()
        .unwrap();

    output.assert_exit_code(5);
    output.assert_stderr_contains("name is required");
}

#[test]
fn test_unknown_activity_is_not_found() {
    let ctx = TestContext::new();
    let missing = "act_9e8d7c6b-5a49-4382-b1c0-d9e8f7a6b5c4";

    let output = ctx
        .command()
        .args(["activity", "show", missing])
        .output()
        .unwrap();
    output.assert_exit_code(6);

    let value = ctx.json(&["activity", "show", missing]);
    json::assert_error(&value, "E005");
}

#[test]
fn test_dpia_evaluation() {
    let ctx = TestContext::new();
    let id = ctx.create_activity(
        "Reconhecimento facial",
        &[
            "--purpose",
            "access-control",
            "--categories",
            "biometric,name",
            "--international-transfer",
        ],
    );

    let value = ctx.json(&["activity", "dpia", &id]);
    json::assert_success(&value);
    assert_eq!(value["data"]["risk_level"], "high");
    assert_eq!(value["data"]["requires_impact_assessment"], true);
    assert_eq!(
        value["data"]["risk_factors"],
        serde_json::json!(["international_transfer", "biometric_data"])
    );
}

#[test]
fn test_list_filters() {
    let ctx = TestContext::new();
    ctx.create_activity("Folha de pagamento", &["--department", "RH"]);
    ctx.create_activity(
        "Segmentação de clientes",
        &["--purpose", "behavioral-analysis", "--department", "Marketing"],
    );

    let value = ctx.json(&["activity", "list", "--purpose", "behavioral_analysis"]);
    assert_eq!(value["data"]["total"], 1);

    let value = ctx.json(&["activity", "list", "--search", "FOLHA"]);
    assert_eq!(value["data"]["total"], 1);
    assert_eq!(value["data"]["activities"][0]["department"], "RH");

    let value = ctx.json(&["activity", "list", "--limit", "1"]);
    assert_eq!(value["data"]["total"], 2);
    assert_eq!(value["data"]["activities"].as_array().unwrap().len(), 1);
}

#[test]
fn test_tenants_do_not_see_each_other() {
    let ctx = TestContext::new();
    ctx.create_activity("Folha de pagamento", &[]);

    let other = TestContext {
        db_path: ctx.db_path.clone(),
        ..TestContext::new()
    }
    .with_tenant(OTHER_TENANT);
    let value = other.json(&["activity", "list"]);
    assert_eq!(value["data"]["total"], 0);

    let value = ctx.json(&["activity", "list"]);
    assert_eq!(value["data"]["total"], 1);
    assert_eq!(value["data"]["activities"][0]["tenant_id"], TENANT.trim_start_matches("tnt_"));
}

#[test]
fn test_stats() {
    let ctx = TestContext::new();
    let id = ctx.create_activity("Folha de pagamento", &["--department", "RH"]);
    ctx.create_activity("Portaria", &["--purpose", "access-control"]);
    ctx.command()
        .args(["activity", "review", "approve", &id])
        .assert()
        .success();

    let value = ctx.json(&["stats"]);
    json::assert_success(&value);
    assert_eq!(value["data"]["state"], "available");
    assert_eq!(value["data"]["total"], 2);
    assert_eq!(value["data"]["without_department"], 1);

    ctx.command()
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total de atividades:         2"));
}

#[test]
fn test_report_excludes_suspended() {
    let ctx = TestContext::new();
    ctx.create_activity("Folha de pagamento", &[]);
    let rejected = ctx.create_activity("Campanha", &["--purpose", "marketing"]);
    ctx.command()
        .args(["activity", "review", "reject", &rejected, "--notes", "Sem base"])
        .assert()
        .success();

    let value = ctx.json(&["report"]);
    assert_eq!(value["data"]["summary"]["total"], 1);

    let value = ctx.json(&["report", "--active-only"]);
    assert_eq!(value["data"]["summary"]["total"], 0);
}

#[test]
fn test_export_rat_csv_file() {
    let ctx = TestContext::new();
    ctx.create_activity(
        "Folha, benefícios",
        &["--department", "RH", "--legal-basis", "legal_obligation"],
    );

    let target = ctx.path().join("rat.csv");
    ctx.command()
        .args(["export", "rat", "--output"])
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 registro(s) exportado(s)"));

    let csv = std::fs::read_to_string(&target).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some(
            "Nome,Departamento,Finalidade,Base legal,Categorias de dados,Titulares,\
             Transferência internacional,Nível de risco,Requer RIPD,Fatores de risco,\
             Recomendação,Status"
        )
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with("Folha; benefícios,RH,Folha de pagamento,Obrigação legal,"));
    assert!(row.ends_with(",Em revisão"));
    assert_eq!(lines.next(), None);
}

#[test]
fn test_export_activities_html_to_stdout() {
    let ctx = TestContext::new();
    ctx.create_activity("Portaria <recepção>", &[]);

    ctx.command()
        .args(["export", "activities", "--export-format", "html"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<!DOCTYPE html>"))
        .stdout(predicate::str::contains("window.print()"))
        .stdout(predicate::str::contains("Portaria &lt;recepção&gt;"));
}

#[test]
fn test_config_init() {
    let ctx = TestContext::new();
    ctx.command().args(["config", "init"]).assert().success();
    assert!(ctx.path().join(".custodia/config.yaml").exists());

    let output = ctx.command().args(["config", "init"]).output().unwrap();
    output.assert_exit_code(1);
    output.assert_stderr_contains("--force");

    ctx.command()
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_show_applies_environment() {
    let ctx = TestContext::new();
    let value = ctx.json(&["config", "show"]);
    json::assert_success(&value);
    assert_eq!(value["data"]["config"]["session"]["tenant_id"], TENANT);
    assert_eq!(value["data"]["config"]["backend"]["kind"], "sqlite");
}

#[test]
fn test_quiet_suppresses_output() {
    let ctx = TestContext::new();
    let output = ctx
        .command()
        .args([
            "-q",
            "activity",
            "create",
            "--name",
            "Portaria",
            "--description",
            "Controle de visitantes",
            "--purpose",
            "access_control",
        ])
        .output()
        .unwrap();

    output.assert_success();
    assert!(output.stdout.is_empty());
}
