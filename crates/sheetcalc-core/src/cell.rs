//! Cell type

/// A single spreadsheet cell as seen by the formula engine.
///
/// `raw_input` is what the user typed; `computed_value` is what the host
/// displays. The computed value is always text, even for numeric results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    /// Raw input as typed (formulas start with `=`)
    pub raw_input: String,
    /// Display string produced by the last recalculation
    pub computed_value: String,
}

impl Cell {
    /// Create a cell whose raw and computed values are both `text`
    pub fn new<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        Self {
            computed_value: text.clone(),
            raw_input: text,
        }
    }

    /// Whether the raw input is a formula (non-empty and starting with `=`)
    pub fn is_formula(&self) -> bool {
        self.raw_input.starts_with('=')
    }

    /// The formula body with its leading `=` stripped
    pub fn formula_body(&self) -> Option<&str> {
        self.raw_input.strip_prefix('=')
    }

    /// Check if the cell has no raw input
    pub fn is_empty(&self) -> bool {
        self.raw_input.is_empty()
    }

    /// Set raw and computed value together, before any recalculation
    pub fn set_text<S: Into<String>>(&mut self, text: S) {
        let text = text.into();
        self.computed_value.clone_from(&text);
        self.raw_input = text;
    }
}
