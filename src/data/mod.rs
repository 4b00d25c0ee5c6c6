/// Data layer: loading result arrays and reducing them to plottable curves.
///
/// Architecture:
/// ```text
///  .npy / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → NdValues → squeeze → Vec<f64>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  reduce   │  optional cumulative average (learning curves)
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod reduce;
