//! End-to-end tests of the cluster-validation binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TRUTH_TSV: &str = "\
# truth galaxies
galaxy_id\thalo_id\tra\tdec\tredshift\thalo_mass\tis_central
1\t100\t10.0\t10.0\t0.30\t3e14\tTrue
2\t100\t10.002\t10.001\t0.30\t3e14\tFalse
3\t200\t40.0\t-10.0\t0.60\t6e14\tTrue
4\t300\t80.0\t5.0\t0.45\t2e14\tTrue
5\t400\t120.0\t0.0\t0.50\t5e13\tTrue
";

const CLUSTERS_CSV: &str = "\
cluster_id,ra_cen_0,dec_cen_0,redshift,richness
1,10.001,10.001,0.302,40.0
2,40.0,-10.002,0.598,80.0
3,200.0,30.0,0.40,35.0
4,10.003,10.0,0.305,10.0
";

const MEMBERS_CSV: &str = "\
cluster_id_member,id_member,p_member
1,1,0.9
1,2,0.8
2,3,0.95
";

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

struct Fixture {
    dir: TempDir,
    truth: PathBuf,
    clusters: PathBuf,
    members: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let truth = write(dir.path(), "truth.tsv", TRUTH_TSV);
    let clusters = write(dir.path(), "clusters.csv", CLUSTERS_CSV);
    let members = write(dir.path(), "members.csv", MEMBERS_CSV);
    Fixture {
        dir,
        truth,
        clusters,
        members,
    }
}

fn cli() -> Command {
    Command::cargo_bin("cluster-validation").unwrap()
}

#[test]
fn test_help_lists_commands() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("cosmology"));
}

#[test]
fn test_version_names_the_tool() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("cluster-validation "));
}

#[test]
fn test_validate_text_report() {
    let f = fixture();
    cli()
        .arg("validate")
        .arg("--truth")
        .arg(&f.truth)
        .arg("--clusters")
        .arg(&f.clusters)
        .args(["--delta-zmax", "0.01", "--theta-max", "0.01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cluster validation (proximity method)"))
        .stdout(predicate::str::contains("Bijective associations: 2"))
        .stdout(predicate::str::contains("Completeness: 2/3"))
        .stdout(predicate::str::contains("Purity: 2/3"));
}

#[test]
fn test_validate_json_report() {
    let f = fixture();
    let output = cli()
        .arg("validate")
        .arg("--truth")
        .arg(&f.truth)
        .arg("--clusters")
        .arg(&f.clusters)
        .args(["--delta-zmax", "0.01", "--theta-max", "0.01", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let report = &json["report"];
    assert_eq!(report["method"], "proximity");
    assert_eq!(report["num_halos"], 3);
    assert_eq!(report["num_clusters"], 3);
    assert_eq!(report["associations"], 2);
    assert_eq!(report["completeness"]["count"], 2);
    assert_eq!(report["purity"]["total"], 3);
    assert!(json["generated_at"].is_string());
    assert_eq!(report["signature"].as_str().unwrap().len(), 32);
}

#[test]
fn test_validate_tsv_report() {
    let f = fixture();
    cli()
        .arg("validate")
        .arg("--truth")
        .arg(&f.truth)
        .arg("--clusters")
        .arg(&f.clusters)
        .args(["--delta-zmax", "0.01", "--theta-max", "0.01", "-f", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("method\thalos\tclusters"))
        .stdout(predicate::str::contains("proximity\t3\t3\t"));
}

#[test]
fn test_validate_without_candidates_still_reports() {
    let f = fixture();
    let windows = ["--delta-zmax", "0.0001", "--theta-max", "0.00001"];
    cli()
        .arg("validate")
        .arg("--truth")
        .arg(&f.truth)
        .arg("--clusters")
        .arg(&f.clusters)
        .args(windows)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 candidate pairs"))
        .stdout(predicate::str::contains("Bijective associations: 0"))
        .stdout(predicate::str::contains("Fragmentation (candidates): undefined"))
        .stdout(predicate::str::contains("Overmerging (candidates): undefined"))
        .stdout(predicate::str::contains("Completeness: 0/3"))
        .stdout(predicate::str::contains("Purity: 0/3"));

    let output = cli()
        .arg("validate")
        .arg("--truth")
        .arg(&f.truth)
        .arg("--clusters")
        .arg(&f.clusters)
        .args(windows)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let report = &json["report"];
    assert!(report["fragmentation"].is_null());
    assert!(report["overmerging"].is_null());
    assert_eq!(report["completeness"]["count"], 0);
    assert_eq!(report["undefined"].as_array().unwrap().len(), 2);

    cli()
        .arg("validate")
        .arg("--truth")
        .arg(&f.truth)
        .arg("--clusters")
        .arg(&f.clusters)
        .args(windows)
        .args(["--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("candidates\t-\t-\t0.0000\t0.0000\t"));
}

#[test]
fn test_validate_membership_with_export() {
    let f = fixture();
    let export = f.dir.path().join("matches.json");
    cli()
        .arg("validate")
        .arg("--truth")
        .arg(&f.truth)
        .arg("--clusters")
        .arg(&f.clusters)
        .arg("--members")
        .arg(&f.members)
        .arg("--export")
        .arg(&export)
        .args(["--method", "membership", "--delta-zmax", "0.01", "--theta-max", "0.01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("membership method"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&export).unwrap()).unwrap();
    assert_eq!(json["halos"].as_array().unwrap().len(), 3);
    assert_eq!(json["clusters"].as_array().unwrap().len(), 3);
    assert_eq!(json["outcome"]["assignment"].as_array().unwrap().len(), 2);
    assert_eq!(json["outcome"]["match_1w"].as_array().unwrap().len(), 3);
    assert_eq!(json["report"]["method"], "membership");
}

#[test]
fn test_membership_without_members_fails() {
    let f = fixture();
    cli()
        .arg("validate")
        .arg("--truth")
        .arg(&f.truth)
        .arg("--clusters")
        .arg(&f.clusters)
        .args(["--method", "membership"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--members is required"));
}

#[test]
fn test_config_file_with_flag_override() {
    let f = fixture();
    let config = write(
        f.dir.path(),
        "analysis.json",
        r#"{"matching": {"delta_zmax": 0.01, "theta_max": 0.01}, "cluster_selection": {"min_richness": 50}}"#,
    );
    cli()
        .arg("validate")
        .arg("--truth")
        .arg(&f.truth)
        .arg("--clusters")
        .arg(&f.clusters)
        .arg("--config")
        .arg(&config)
        .args(["--min-richness", "5", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"num_clusters\": 4"));
}

#[test]
fn test_invalid_threshold_fails() {
    let f = fixture();
    cli()
        .arg("validate")
        .arg("--truth")
        .arg(&f.truth)
        .arg("--clusters")
        .arg(&f.clusters)
        .arg("--delta-zmax=-0.5")
        .assert()
        .failure();
}

#[test]
fn test_missing_column_fails() {
    let f = fixture();
    let clusters = write(
        f.dir.path(),
        "bad.csv",
        "cluster_id,ra,dec,redshift,richness\n1,10.0,10.0,0.3,40\n",
    );
    cli()
        .arg("validate")
        .arg("--truth")
        .arg(&f.truth)
        .arg("--clusters")
        .arg(&clusters)
        .assert()
        .failure()
        .stderr(predicate::str::contains("ra_cen_0"));
}

#[test]
fn test_inspect_with_filter() {
    let f = fixture();
    cli()
        .arg("inspect")
        .arg(&f.clusters)
        .args(["--filter", "richness > 20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rows: 4"))
        .stdout(predicate::str::contains("Rows passing 'richness > 20': 3"))
        .stdout(predicate::str::contains("ra_cen_0"));
}

#[test]
fn test_inspect_tsv() {
    let f = fixture();
    cli()
        .arg("inspect")
        .arg(&f.truth)
        .args(["--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is_central\tbool"))
        .stdout(predicate::str::contains("galaxy_id\tint\t1\t5"));
}

#[test]
fn test_cosmology_lists_presets() {
    cli()
        .arg("cosmology")
        .assert()
        .success()
        .stdout(predicate::str::contains("cosmodc2"))
        .stdout(predicate::str::contains("planck18"));
}

#[test]
fn test_cosmology_distances() {
    let output = cli()
        .args(["cosmology", "--preset", "concordance", "1.0", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let d_m = json["distances"][0]["comoving_transverse_mpc"].as_f64().unwrap();
    assert!((d_m - 3303.8).abs() < 1.0);
}

#[test]
fn test_unknown_cosmology_preset_fails() {
    cli()
        .args(["cosmology", "--preset", "no-such-universe", "0.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-such-universe"));
}
