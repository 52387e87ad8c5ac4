//! Prelude module - common imports for sheetcalc users
//!
//! ```rust
//! use sheetcalc::prelude::*;
//! ```

pub use crate::{
    // Calculation types
    CalculationOptions,
    CalculationStats,
    // Addressing
    CellAddress,
    CellRange,
    // Cell types
    Cell,
    // Error types
    Error,
    FormulaError,
    // Main types
    Grid,
    // Extension traits
    GridCalculationExt,
    MalformedPolicy,
    RecalcOrder,
    Result,
    Spreadsheet,
};
