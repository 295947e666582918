/// Data layer: core types, loading, shuffling and filtering.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (target split off)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset  │  features (rows × cols), targets, names
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐      ┌──────────┐
///   │ shuffle  │ ───▶ │  filter  │  rows where column == value
///   └──────────┘      └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod shuffle;
