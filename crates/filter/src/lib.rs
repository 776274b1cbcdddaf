//! sysfwd - Filter Engine
//!
//! Decides per record whether it is forwarded to the drain or dropped.
//!
//! # Rules
//!
//! | Match | Value | Matches when |
//! |-------|-------|--------------|
//! | `severity` | severity name | severity equals the value |
//! | `severity_at_or_below` | severity name | severity is the value or less severe |
//! | `contains` | string | message contains the value |
//! | `regex` | pattern | message matches the pattern |
//!
//! Each rule has an action: `drop` (drop matches, the default) or `keep`
//! (drop everything that does not match). A record is dropped when any rule
//! says so.
//!
//! # TOML Example
//!
//! ```toml
//! [[filter.rules]]
//! match = "severity"
//! value = "debug"
//! action = "drop"
//! ```
//!
//! # Rust Example
//!
//! ```
//! use sysfwd_filter::{FilterEngine, Verdict};
//! use sysfwd_record::{Record, Severity};
//!
//! let engine = FilterEngine::from_toml_str(
//!     "[[rules]]\nmatch = \"severity\"\nvalue = \"debug\"\n",
//! )
//! .unwrap();
//!
//! let debug = Record::builder("noisy").severity(Severity::Debug).build().unwrap();
//! assert_eq!(engine.evaluate(&debug), Verdict::Drop);
//! ```

mod engine;
mod error;
mod rule;

pub use engine::{FilterEngine, Verdict};
pub use error::{FilterError, FilterResult};
pub use rule::{FilterAction, FilterRule, Matcher};
pub use sysfwd_config::FilterRuleConfig;
