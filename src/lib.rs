//! # Fabrication Core
//!
//! Order pricing and payment reconciliation for a made-to-order signage and print
//! fabrication business.
//!
//! ## Features
//!
//! - **Catalog snapshots**: versioned materials and services; line items copy prices on entry
//! - **Pricing engine**: area, light-box, linear and per-unit formulas with waste, services
//!   and an order-level discount
//! - **Payment ledger**: advances and installments with a pending/approved/rejected workflow
//! - **Reconciliation**: remaining balances always re-derived from the full entry set
//! - **Storage abstraction**: database-agnostic design with trait-based storage
//!
//! ## Quick Start
//!
//! ```rust
//! use fabrication_core::{price, sample_catalog, LineItemRequest, OrderDraft};
//! use bigdecimal::BigDecimal;
//!
//! let catalog = sample_catalog().unwrap();
//! let mut draft = OrderDraft::new();
//! draft
//!     .add_line_item(&catalog, LineItemRequest::per_unit("badge", 10))
//!     .unwrap();
//!
//! let breakdown = price(draft.items(), &catalog, &BigDecimal::from(10)).unwrap();
//! assert_eq!(breakdown.final_cost, BigDecimal::from(315000));
//! ```

pub mod catalog;
pub mod config;
pub mod ledger;
pub mod pricing;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use catalog::*;
pub use config::*;
pub use ledger::*;
pub use pricing::*;
pub use reconciliation::*;
pub use traits::*;
pub use types::*;
