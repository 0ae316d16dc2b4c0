#![allow(dead_code)]

use std::{fs, path::Path};

pub const FS: u32 = 250;
const GAIN: f64 = 200.0;

/// Gaussian R waves every `rr` seconds, in millivolts.
pub fn synthetic_lead(rr: f64, seconds: f64) -> Vec<f64> {
    let n = (seconds * FS as f64) as usize;
    let mut beats = Vec::new();
    let mut t = 0.5;
    while t < seconds {
        beats.push(t);
        t += rr;
    }
    (0..n)
        .map(|i| {
            let time = i as f64 / FS as f64;
            beats
                .iter()
                .map(|bt| 1.2 * (-0.5 * ((time - bt) / 0.02).powi(2)).exp())
                .sum()
        })
        .collect()
}

/// Two-lead format-212 record.
pub fn write_record(dir: &Path, name: &str, lead_ii: &[f64]) {
    let mut dat = Vec::new();
    for &mv in lead_ii {
        let a = 0u16;
        let b = ((mv * GAIN).round() as i16 as u16) & 0x0FFF;
        dat.push((a & 0xFF) as u8);
        dat.push((((a >> 8) & 0x0F) | (((b >> 8) & 0x0F) << 4)) as u8);
        dat.push((b & 0xFF) as u8);
    }
    fs::write(dir.join(format!("{name}.dat")), dat).unwrap();
    let header = format!(
        "{name} 2 {FS} {n}\n\
         {name}.dat 212 200 11 0 0 0 0 I\n\
         {name}.dat 212 200 11 0 0 0 0 II\n\
         # Dx: 426177001\n",
        n = lead_ii.len()
    );
    fs::write(dir.join(format!("{name}.hea")), header).unwrap();
}

pub fn data_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_record(dir.path(), "JS00042", &synthetic_lead(0.8, 12.0));
    fs::write(dir.path().join("JS00043.hea"), "JS00043 twelve 500\n").unwrap();
    dir
}
