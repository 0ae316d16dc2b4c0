mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{data_dir, synthetic_lead};
use std::{error::Error, fs, path::Path};

fn assert_png(path: &Path) -> Result<(), Box<dyn Error>> {
    let len = fs::metadata(path)?.len();
    assert!(len > 0, "{} is empty", path.display());
    Ok(())
}

#[test]
fn overview_draws_record_with_fewer_than_twelve_leads() -> Result<(), Box<dyn Error>> {
    let dir = data_dir();
    let out = dir.path().join("overview.png");
    let mut cmd = cargo_bin_cmd!("ecgview");
    cmd.args([
        "overview",
        "--data-dir",
        dir.path().to_str().expect("utf8 path"),
        "--record",
        "JS00042",
        "--out",
        out.to_str().expect("utf8 path"),
    ]);
    cmd.assert().success();
    assert_png(&out)
}

#[test]
fn lead_draws_flat_lead_on_minimum_span() -> Result<(), Box<dyn Error>> {
    let dir = data_dir();
    let out = dir.path().join("lead_i.png");
    let mut cmd = cargo_bin_cmd!("ecgview");
    cmd.args([
        "lead",
        "--data-dir",
        dir.path().to_str().expect("utf8 path"),
        "--record",
        "JS00042",
        "--lead",
        "I",
        "--out",
        out.to_str().expect("utf8 path"),
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    assert!(String::from_utf8(output)?.contains("fewer than two beats"));
    assert_png(&out)
}

#[test]
fn lead_draws_detected_beats() -> Result<(), Box<dyn Error>> {
    let dir = data_dir();
    let out = dir.path().join("lead_ii.png");
    let mut cmd = cargo_bin_cmd!("ecgview");
    cmd.args([
        "lead",
        "--data-dir",
        dir.path().to_str().expect("utf8 path"),
        "--record",
        "JS00042",
        "--lead",
        "II",
        "--out",
        out.to_str().expect("utf8 path"),
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    assert!(String::from_utf8(output)?.contains("normal heart rate"));
    assert_png(&out)
}

#[test]
fn rr_histogram_draws_distribution() -> Result<(), Box<dyn Error>> {
    let dir = data_dir();
    let out = dir.path().join("rr.png");
    let mut cmd = cargo_bin_cmd!("ecgview");
    cmd.args([
        "rr-histogram",
        "--data-dir",
        dir.path().to_str().expect("utf8 path"),
        "--record",
        "JS00042",
        "--out",
        out.to_str().expect("utf8 path"),
    ]);
    cmd.assert().success();
    assert_png(&out)
}

#[test]
fn analyze_samples_draws_strip() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("lead.txt");
    let samples: Vec<String> = synthetic_lead(0.8, 10.0)
        .iter()
        .map(|mv| format!("{mv:.4}"))
        .collect();
    fs::write(&input, samples.join("\n"))?;
    let out = dir.path().join("strip.png");

    let mut cmd = cargo_bin_cmd!("ecgview");
    cmd.args([
        "analyze-samples",
        "--fs",
        "250",
        "--input",
        input.to_str().expect("utf8 path"),
        "--out",
        out.to_str().expect("utf8 path"),
    ]);
    cmd.assert().success();
    assert_png(&out)
}
