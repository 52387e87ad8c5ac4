//! Dependency tracking for formula calculation

use crate::ast::FormulaExpr;
use ahash::{AHashMap, AHashSet};
use sheetcalc_core::{CellAddress, CellRange};

/// Unique key for a cell in a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub row: usize,
    pub col: usize,
}

impl CellKey {
    /// Create a new cell key
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<CellAddress> for CellKey {
    fn from(addr: CellAddress) -> Self {
        Self::new(addr.row, addr.col)
    }
}

/// Dependency graph for formula cells
///
/// Records the cells each formula reads so that every formula can be
/// evaluated after them.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Cell → Cells it depends on (precedents)
    precedents: AHashMap<CellKey, AHashSet<CellKey>>,
}

/// Evaluation order produced by [`DependencyGraph::calculation_order`]
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CalculationOrder {
    /// Cells to evaluate, every cell after all of its precedents
    pub order: Vec<CellKey>,
    /// Cells on a reference cycle or depending on one
    pub circular: AHashSet<CellKey>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dependency: dependent depends on precedent
    pub fn add_dependency(&mut self, precedent: CellKey, dependent: CellKey) {
        self.precedents
            .entry(dependent)
            .or_default()
            .insert(precedent);
    }

    /// Get cells that the given cell depends on
    pub fn get_precedents(&self, cell: CellKey) -> impl Iterator<Item = CellKey> + '_ {
        self.precedents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Order `cells` so that each one comes after everything it depends on.
    ///
    /// Precedents that are not in `cells` are treated as already computed.
    /// Cells that reach a cycle through their precedents are reported in
    /// [`CalculationOrder::circular`] and still appear in the order. The walk
    /// is iterative and visits `cells` in the order given, so the result is
    /// deterministic.
    pub fn calculation_order(&self, cells: &[CellKey]) -> CalculationOrder {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            InProgress,
            Done,
        }

        let wanted: AHashSet<CellKey> = cells.iter().copied().collect();
        let mut marks: AHashMap<CellKey, Mark> = AHashMap::with_capacity(cells.len());
        let mut result = CalculationOrder::default();

        for &root in cells {
            if marks.contains_key(&root) {
                continue;
            }

            // (cell, sorted precedents still to visit)
            let mut stack: Vec<(CellKey, Vec<CellKey>)> = Vec::new();
            marks.insert(root, Mark::InProgress);
            stack.push((root, self.sorted_precedents(root, &wanted)));

            while let Some((cell, pending)) = stack.last_mut() {
                let cell = *cell;
                match pending.pop() {
                    Some(next) => match marks.get(&next) {
                        Some(Mark::InProgress) => {
                            result.circular.insert(cell);
                        }
                        Some(Mark::Done) => {
                            if result.circular.contains(&next) {
                                result.circular.insert(cell);
                            }
                        }
                        None => {
                            marks.insert(next, Mark::InProgress);
                            let precedents = self.sorted_precedents(next, &wanted);
                            stack.push((next, precedents));
                        }
                    },
                    None => {
                        stack.pop();
                        marks.insert(cell, Mark::Done);
                        result.order.push(cell);
                        if let Some((parent, _)) = stack.last() {
                            if result.circular.contains(&cell) {
                                result.circular.insert(*parent);
                            }
                        }
                    }
                }
            }
        }

        result
    }

    /// Precedents of `cell` restricted to `wanted`, reverse-sorted so that
    /// popping yields them in row-major order
    fn sorted_precedents(&self, cell: CellKey, wanted: &AHashSet<CellKey>) -> Vec<CellKey> {
        let mut precedents: Vec<CellKey> = self
            .get_precedents(cell)
            .filter(|key| wanted.contains(key))
            .collect();
        precedents.sort_unstable_by(|a, b| b.cmp(a));
        precedents
    }
}

/// Cells a formula reads when evaluated on a `rows` x `cols` grid.
///
/// Mirrors the evaluator: only `SUM` over a range contributes from a function
/// call, malformed reference text contributes nothing, and ranges are
/// restricted to the grid.
pub fn extract_references(expr: &FormulaExpr, rows: usize, cols: usize) -> Vec<CellKey> {
    let mut refs = Vec::new();
    extract_references_recursive(expr, rows, cols, &mut refs);
    refs
}

fn extract_references_recursive(
    expr: &FormulaExpr,
    rows: usize,
    cols: usize,
    refs: &mut Vec<CellKey>,
) {
    match expr {
        FormulaExpr::CellRef(address) => {
            if let Ok(addr) = CellAddress::parse(address) {
                if addr.row < rows && addr.col < cols {
                    refs.push(addr.into());
                }
            }
        }
        FormulaExpr::Range { start, end } => push_range(start, end, rows, cols, refs),
        FormulaExpr::BinaryOp { left, right, .. } => {
            extract_references_recursive(left, rows, cols, refs);
            extract_references_recursive(right, rows, cols, refs);
        }
        FormulaExpr::Function { name, arg, .. } => {
            if let ("SUM", FormulaExpr::Range { start, end }) = (name.as_str(), arg.as_ref()) {
                push_range(start, end, rows, cols, refs);
            }
        }
        FormulaExpr::Number(_) => {}
    }
}

fn push_range(start: &str, end: &str, rows: usize, cols: usize, refs: &mut Vec<CellKey>) {
    let (Ok(start), Ok(end)) = (CellAddress::parse(start), CellAddress::parse(end)) else {
        return;
    };
    if let Some(range) = CellRange::new(start, end).clamp(rows, cols) {
        refs.extend(range.cells().map(CellKey::from));
    }
}
