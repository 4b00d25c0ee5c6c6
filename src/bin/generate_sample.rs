use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use ndarray::Array1;
use ndarray_npy::write_npy;
use serde_json::json;

/// Write synthetic result arrays so every built-in figure can be rendered.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Results directory to populate
    #[arg(long, default_value = "./Learning Curves")]
    results_dir: PathBuf,

    /// Where to write a sample figure-table config (adds figure 6)
    #[arg(long, default_value = "sample_figures.json")]
    config: PathBuf,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

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
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn save(dir: &Path, name: &str, values: Vec<f64>) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(name);
    write_npy(&path, &Array1::from(values))
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// Sum rate against transmit power: `a * log2(1 + g * 10^(P/10))`.
fn sum_rate_power(dir: &Path, rng: &mut SimpleRng) -> Result<()> {
    let powers_db: Vec<f64> = (0..11).map(|i| -20.0 + 5.0 * i as f64).collect();
    for (size, scale, gain) in [(8, 2.5, 0.1), (32, 4.0, 0.3)] {
        let rate = powers_db
            .iter()
            .map(|&p| {
                let snr = gain * 10f64.powf(p / 10.0);
                (scale * (1.0 + snr).log2() + rng.gauss(0.0, 0.1)).max(0.0)
            })
            .collect();
        save(dir, &format!("{size}.npy"), rate)?;
    }
    Ok(())
}

/// Sum rate against RIS size, saturating as elements are added.
fn sum_rate_ris(dir: &Path, rng: &mut SimpleRng) -> Result<()> {
    let rate = (1..=20)
        .map(|i| {
            let n = 10.0 * i as f64;
            14.0 + 17.0 * (1.0 - (-n / 80.0).exp()) + rng.gauss(0.0, 0.15)
        })
        .collect();
    save(dir, "result.npy", rate)
}

/// Noisy per-step rewards that converge towards `target`.
fn learning_rewards(target: f64, steps: usize, rng: &mut SimpleRng) -> Vec<f64> {
    (0..steps)
        .map(|t| target * (1.0 - (-(t as f64) / 1500.0).exp()) + rng.gauss(0.0, 0.2 * target))
        .collect()
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    sum_rate_power(&args.results_dir.join("sum_rate_power"), &mut rng)?;
    sum_rate_ris(&args.results_dir.join("sum_rate_ris"), &mut rng)?;

    let learning_dir = args.results_dir.join("learning_power");
    for pt in [5, 20] {
        let rewards = learning_rewards(pt as f64 / 2.0, 10_000, &mut rng);
        save(&learning_dir, &format!("pt_{pt}.npy"), rewards)?;
    }

    let config = json!({
        "figures": {
            "6": {
                "dir": "learning_power",
                "legend_loc": "lower right",
                "series": [
                    { "file": "pt_5.npy", "label": "P_t = 5 dB", "color": "#2ca02c" },
                    { "file": "pt_20.npy", "label": "P_t = 20 dB", "color": "#9467bd" }
                ]
            }
        }
    });
    let text = serde_json::to_string_pretty(&config)?;
    fs::write(&args.config, text)
        .with_context(|| format!("writing {}", args.config.display()))?;

    println!(
        "Wrote sample results to {} and figure 6 settings to {}",
        args.results_dir.display(),
        args.config.display()
    );
    Ok(())
}
