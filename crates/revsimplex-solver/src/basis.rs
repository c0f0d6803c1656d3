use ndarray::{Array2, ArrayView1};

/// Unit columns found for each constraint row.
///
/// Row `r` is covered when some column of A has a 1 at position `r` and
/// zeros everywhere else. Rows without such a column are problematic and
/// need an artificial variable before the engine can start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitBasis {
    columns: Vec<Option<usize>>,
}

impl UnitBasis {
    /// Scan `a` for the first clean unit column of every row
    pub fn detect(a: &Array2<f64>, tolerance: f64) -> Self {
        let unit_rows: Vec<Option<usize>> = a
            .columns()
            .into_iter()
            .map(|col| unit_position(col, tolerance))
            .collect();

        let columns = (0..a.nrows())
            .map(|row| unit_rows.iter().position(|&r| r == Some(row)))
            .collect();

        Self { columns }
    }

    /// Every row has a unit column
    pub fn is_complete(&self) -> bool {
        self.columns.iter().all(Option::is_some)
    }

    /// Rows lacking a unit column, in ascending order
    pub fn problematic_rows(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, col)| col.is_none())
            .map(|(row, _)| row)
            .collect()
    }

    /// Basic variable index per row, available only when complete
    pub fn indices(&self) -> Option<Vec<usize>> {
        self.columns.iter().copied().collect()
    }

    /// Chosen column for each row
    pub fn columns(&self) -> &[Option<usize>] {
        &self.columns
    }
}

/// Row at which `col` is a unit vector, if it is one
fn unit_position(col: ArrayView1<f64>, tolerance: f64) -> Option<usize> {
    let mut one_at = None;
    for (i, &v) in col.iter().enumerate() {
        if v.abs() <= tolerance {
            continue;
        }
        if (v - 1.0).abs() <= tolerance && one_at.is_none() {
            one_at = Some(i);
        } else {
            return None;
        }
    }
    one_at
}
