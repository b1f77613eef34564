//! Record persistence.
//!
//! ## Directory Layout
//!
//! ```text
//! {output_dir}/
//! ├── bde_scraping_results_20250609_151849.csv   # raw scrape output
//! ├── bde_scraping_results_20250609_151849.json  # optional JSON copy
//! └── bde_clean_data_20250609_160210.csv         # cleaned output
//! ```

pub mod local;

pub use local::{RecordStore, read_records, write_clean_csv, write_json, write_raw_csv};
