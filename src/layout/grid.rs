//! Table-based grid layouts.
//!
//! [`SimpleGridLayout`] flows children into a fixed column count, row by row.
//! [`GridLayout`] places children at explicit cells and supports per-row and
//! per-column percentage sizing. Both render plain `<table>` markup and carry
//! no transport.

use std::collections::BTreeMap;

use crate::error::WidgetError;
use crate::widget::{Include, Render};

fn merge_includes(manifest: &mut Vec<Include>, extra: Vec<Include>) {
    for include in extra {
        if !manifest.contains(&include) {
            manifest.push(include);
        }
    }
}

// ---------------------------------------------------------------------------
// SimpleGridLayout
// ---------------------------------------------------------------------------

/// A row-major flowing grid with a fixed column count.
pub struct SimpleGridLayout {
    id: String,
    columns: usize,
    children: Vec<Box<dyn Render>>,
}

impl SimpleGridLayout {
    /// Create a flowing grid. `columns` must be nonzero.
    pub fn new(id: &str, columns: usize) -> Result<Self, WidgetError> {
        if columns == 0 {
            return Err(WidgetError::Validation(
                "grid layout needs at least one column".to_owned(),
            ));
        }
        Ok(Self {
            id: id.to_owned(),
            columns,
            children: Vec::new(),
        })
    }

    /// Append a child to the next free cell.
    pub fn add(&mut self, child: impl Render + 'static) -> &mut Self {
        self.children.push(Box::new(child));
        self
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the layout has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Render for SimpleGridLayout {
    fn render(&self) -> String {
        let mut out = format!(
            "<table id='{id}' name='{id}' style='width:100%;'>",
            id = self.id
        );
        for row in self.children.chunks(self.columns) {
            out.push_str("<tr>");
            for child in row {
                out.push_str("<td>");
                out.push_str(&child.render());
                out.push_str("</td>");
            }
            // Pad the final row so every row has the full column count.
            for _ in row.len()..self.columns {
                out.push_str("<td></td>");
            }
            out.push_str("</tr>");
        }
        out.push_str("</table>");
        out
    }

    fn includes(&self) -> Vec<Include> {
        let mut manifest = Vec::new();
        for child in &self.children {
            merge_includes(&mut manifest, child.includes());
        }
        manifest
    }
}

// ---------------------------------------------------------------------------
// GridLayout
// ---------------------------------------------------------------------------

/// A positional grid with explicit cell placement and percentage sizing.
pub struct GridLayout {
    id: String,
    rows: usize,
    columns: usize,
    row_ratios: Vec<u32>,
    column_ratios: Vec<u32>,
    cells: BTreeMap<(usize, usize), Box<dyn Render>>,
}

impl GridLayout {
    /// Create a positional grid with equal row and column sizing.
    pub fn new(id: &str, rows: usize, columns: usize) -> Result<Self, WidgetError> {
        if rows == 0 || columns == 0 {
            return Err(WidgetError::Validation(
                "grid layout needs at least one row and one column".to_owned(),
            ));
        }
        Ok(Self {
            id: id.to_owned(),
            rows,
            columns,
            row_ratios: vec![1; rows],
            column_ratios: vec![1; columns],
            cells: BTreeMap::new(),
        })
    }

    /// Set per-row size ratios; must have one entry per row.
    pub fn with_row_ratios(mut self, ratios: Vec<u32>) -> Result<Self, WidgetError> {
        if ratios.len() != self.rows || ratios.iter().sum::<u32>() == 0 {
            return Err(WidgetError::Validation(format!(
                "expected {} nonzero row ratios",
                self.rows
            )));
        }
        self.row_ratios = ratios;
        Ok(self)
    }

    /// Set per-column size ratios; must have one entry per column.
    pub fn with_column_ratios(mut self, ratios: Vec<u32>) -> Result<Self, WidgetError> {
        if ratios.len() != self.columns || ratios.iter().sum::<u32>() == 0 {
            return Err(WidgetError::Validation(format!(
                "expected {} nonzero column ratios",
                self.columns
            )));
        }
        self.column_ratios = ratios;
        Ok(self)
    }

    /// Place a child at `(row, column)`. Out-of-range cells and occupied
    /// cells are rejected.
    pub fn place(
        &mut self,
        row: usize,
        column: usize,
        child: impl Render + 'static,
    ) -> Result<(), WidgetError> {
        if row >= self.rows || column >= self.columns {
            return Err(WidgetError::Validation(format!(
                "cell ({row}, {column}) outside a {}x{} grid",
                self.rows, self.columns
            )));
        }
        if self.cells.contains_key(&(row, column)) {
            return Err(WidgetError::Validation(format!(
                "cell ({row}, {column}) is already occupied"
            )));
        }
        self.cells.insert((row, column), Box::new(child));
        Ok(())
    }

    fn percent(ratios: &[u32], index: usize) -> u32 {
        let total: u32 = ratios.iter().sum();
        ratios[index] * 100 / total
    }
}

impl Render for GridLayout {
    fn render(&self) -> String {
        let mut out = format!(
            "<table id='{id}' name='{id}' style='width:100%;height:100%;'>",
            id = self.id
        );
        for row in 0..self.rows {
            out.push_str(&format!(
                "<tr style='height:{}%;'>",
                Self::percent(&self.row_ratios, row)
            ));
            for column in 0..self.columns {
                out.push_str(&format!(
                    "<td style='width:{}%;'>",
                    Self::percent(&self.column_ratios, column)
                ));
                if let Some(child) = self.cells.get(&(row, column)) {
                    out.push_str(&child.render());
                }
                out.push_str("</td>");
            }
            out.push_str("</tr>");
        }
        out.push_str("</table>");
        out
    }

    fn includes(&self) -> Vec<Include> {
        let mut manifest = Vec::new();
        for child in self.cells.values() {
            merge_includes(&mut manifest, child.includes());
        }
        manifest
    }
}

// ===========================================================================
// Tests
// ===========================================================================
