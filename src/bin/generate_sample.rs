//! Writes synthetic cleaned CSVs (`benin_clean.csv`, `sierra_leone_clean.csv`,
//! `togo_clean.csv`) so the dashboard can be tried without real station data.
//!
//! Usage: `generate_sample [output_dir]` (default `data/`).

use std::f64::consts::PI;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Timelike};
use log::info;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + std_dev * z
    }
}

/// Climate knobs per country.
struct Site {
    file: &'static str,
    peak_ghi: f64,
    mean_tamb: f64,
    mean_rh: f64,
    mean_bp: f64,
    /// Chance that a given day has a panel cleaning at noon.
    cleaning_rate: f64,
}

const SITES: [Site; 3] = [
    Site { file: "benin_clean.csv", peak_ghi: 950.0, mean_tamb: 28.0, mean_rh: 55.0, mean_bp: 994.0, cleaning_rate: 0.10 },
    Site { file: "sierra_leone_clean.csv", peak_ghi: 820.0, mean_tamb: 26.5, mean_rh: 78.0, mean_bp: 1002.0, cleaning_rate: 0.05 },
    Site { file: "togo_clean.csv", peak_ghi: 900.0, mean_tamb: 27.5, mean_rh: 62.0, mean_bp: 975.0, cleaning_rate: 0.08 },
];

const DAYS: i64 = 30;
const STEP_MINUTES: i64 = 10;

fn write_site(dir: &std::path::Path, site: &Site, rng: &mut SimpleRng) -> Result<usize> {
    let path = dir.join(site.file);
    let mut writer = csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["Timestamp", "GHI", "DNI", "DHI", "ModA", "ModB", "Tamb", "RH", "WS", "BP", "Cleaning"])?;

    let start = NaiveDate::from_ymd_opt(2021, 8, 9)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid start date")?;
    let steps = DAYS * 24 * 60 / STEP_MINUTES;
    let mut soiling = 1.0_f64;
    let mut rows = 0;

    for i in 0..steps {
        let ts = start + Duration::minutes(i * STEP_MINUTES);
        let hour = ts.hour() as f64 + ts.minute() as f64 / 60.0;

        // Daylight between 06:00 and 18:00, peaking at noon.
        let sun = ((hour - 6.0) / 12.0 * PI).sin().max(0.0);
        let clouds = rng.next_f64().mul_add(0.3, 0.7);
        let ghi = (site.peak_ghi * sun * clouds + rng.gauss(0.0, 5.0)).max(0.0);
        let dni = (ghi * 0.75 + rng.gauss(0.0, 10.0)).max(0.0);
        let dhi = (ghi - dni * sun).max(0.0);

        let cleaned = ts.hour() == 12 && ts.minute() == 0 && rng.next_f64() < site.cleaning_rate;
        if cleaned {
            soiling = 1.0;
        } else {
            soiling = (soiling - 0.0001).max(0.85);
        }
        let mod_a = (ghi * 0.95 * soiling + rng.gauss(0.0, 3.0)).max(0.0);
        let mod_b = (ghi * 0.93 * soiling + rng.gauss(0.0, 3.0)).max(0.0);

        let tamb = site.mean_tamb + 4.0 * sun + rng.gauss(0.0, 0.8);
        let rh = (site.mean_rh - 15.0 * sun + rng.gauss(0.0, 3.0)).clamp(0.0, 100.0);
        let ws = rng.gauss(2.5, 1.0).max(0.0);
        let bp = site.mean_bp + rng.gauss(0.0, 1.0);

        writer.write_record([
            ts.format("%Y-%m-%d %H:%M").to_string(),
            format!("{ghi:.1}"),
            format!("{dni:.1}"),
            format!("{dhi:.1}"),
            format!("{mod_a:.1}"),
            format!("{mod_b:.1}"),
            format!("{tamb:.1}"),
            format!("{rh:.1}"),
            format!("{ws:.1}"),
            format!("{bp:.0}"),
            u8::from(cleaned).to_string(),
        ])?;
        rows += 1;
    }

    writer.flush()?;
    info!("Wrote {rows} rows to {}", path.display());
    Ok(rows)
}

fn main() -> Result<()> {
    env_logger::init();

    let dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let mut total = 0;
    for site in &SITES {
        total += write_site(&dir, site, &mut rng)?;
    }

    println!("Wrote {total} rows for {} countries to {}", SITES.len(), dir.display());
    Ok(())
}
