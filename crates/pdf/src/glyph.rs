use serde::{Deserialize, Serialize};

/// Largest vertical distance, in page units, between glyphs of one row.
pub const ROW_TOLERANCE: f64 = 5.0;

/// Placed between glyph texts when a row is rendered.
pub const COLUMN_SEPARATOR: &str = "\t";

/// A positioned text fragment as produced by the PDF text layer.
///
/// `y` grows upward (PDF user space), so the top of a page has the largest `y`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub page: usize,
}

impl Glyph {
    pub fn new(text: impl Into<String>, x: f64, y: f64, page: usize) -> Self {
        Self { text: text.into(), x, y, page }
    }
}

/// Glyphs sharing a baseline on one page, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub page: usize,
    /// `y` of the glyph that opened the row.
    pub y: f64,
    pub glyphs: Vec<Glyph>,
}

impl Row {
    pub fn text(&self) -> String {
        self.glyphs
            .iter()
            .map(|g| g.text.trim())
            .collect::<Vec<_>>()
            .join(COLUMN_SEPARATOR)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.glyphs.iter().map(|g| g.text.trim())
    }
}

/// Group glyphs into rows: page ascending, top to bottom, then left to right.
pub fn reconstruct_rows(glyphs: &[Glyph]) -> Vec<Row> {
    let mut sorted: Vec<&Glyph> = glyphs.iter().filter(|g| !g.text.trim().is_empty()).collect();
    sorted.sort_by(|a, b| {
        a.page
            .cmp(&b.page)
            .then(b.y.total_cmp(&a.y))
            .then(a.x.total_cmp(&b.x))
    });

    let mut rows: Vec<Row> = Vec::new();
    for glyph in sorted {
        match rows.last_mut() {
            Some(row) if row.page == glyph.page && (glyph.y - row.y).abs() <= ROW_TOLERANCE => {
                row.glyphs.push(glyph.clone());
            }
            _ => rows.push(Row { page: glyph.page, y: glyph.y, glyphs: vec![glyph.clone()] }),
        }
    }

    for row in &mut rows {
        row.glyphs.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    rows
}

/// Rendered text of every row, in reading order.
pub fn reconstruct_lines(glyphs: &[Glyph]) -> Vec<String> {
    reconstruct_rows(glyphs).iter().map(Row::text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_by_baseline_and_orders_columns() {
        let glyphs = vec![
            Glyph::new("15,000.00", 400.0, 700.0, 1),
            Glyph::new("01/03/2024", 50.0, 700.0, 1),
            Glyph::new("Shell Kira Rd", 150.0, 702.5, 1),
            Glyph::new("02/03/2024", 50.0, 680.0, 1),
            Glyph::new("Salary", 150.0, 680.0, 1),
        ];
        let lines = reconstruct_lines(&glyphs);
        assert_eq!(lines, vec!["01/03/2024\tShell Kira Rd\t15,000.00", "02/03/2024\tSalary"]);
    }

    #[test]
    fn tolerance_is_inclusive() {
        let glyphs = vec![Glyph::new("a", 0.0, 100.0, 1), Glyph::new("b", 10.0, 95.0, 1)];
        assert_eq!(reconstruct_rows(&glyphs).len(), 1);
        let glyphs = vec![Glyph::new("a", 0.0, 100.0, 1), Glyph::new("b", 10.0, 94.9, 1)];
        assert_eq!(reconstruct_rows(&glyphs).len(), 2);
    }

    #[test]
    fn pages_never_share_a_row() {
        let glyphs = vec![Glyph::new("p2", 0.0, 500.0, 2), Glyph::new("p1", 0.0, 500.0, 1)];
        let rows = reconstruct_rows(&glyphs);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].page, 1);
        assert_eq!(rows[1].page, 2);
    }

    #[test]
    fn drift_is_measured_from_the_row_anchor() {
        // Each glyph is within tolerance of its neighbour but the third is not
        // within tolerance of the first.
        let glyphs = vec![
            Glyph::new("a", 0.0, 100.0, 1),
            Glyph::new("b", 10.0, 96.0, 1),
            Glyph::new("c", 20.0, 92.0, 1),
        ];
        let rows = reconstruct_rows(&glyphs);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text(), "a\tb");
    }

    #[test]
    fn blank_glyphs_are_dropped() {
        let glyphs = vec![Glyph::new("  ", 0.0, 100.0, 1), Glyph::new("x", 5.0, 100.0, 1)];
        assert_eq!(reconstruct_lines(&glyphs), vec!["x"]);
        assert!(reconstruct_rows(&[]).is_empty());
    }
}
