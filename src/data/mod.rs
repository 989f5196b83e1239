/// Data layer: loading, filtering, search and chart preparation.
///
/// Architecture:
/// ```text
///  .xlsx / .xls / .ods / .csv bytes
///        │
///        ▼
///   ┌──────────────────┐
///   │ cache ─▶ loader  │  parse first sheet → Dataset (skipped for a repeat upload)
///   └──────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset  │  typed columns, never mutated
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ filter / search  │  predicates / substring match → View (row indices)
///   └──────────────────┘
///        │
///        ├──▶ chart   summary, column classes, bar/line/scatter/pie data
///        └──▶ export  View → CSV bytes
/// ```

pub mod cache;
pub mod chart;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod notice;
pub mod search;
