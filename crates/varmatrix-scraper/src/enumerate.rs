//! Cartesian product of option axes, one [`Selection`] per combination.

use varmatrix_core::{OptionAxis, Selection};

/// Number of selections the axes produce, ignoring empty axes.
///
/// Returns `None` on overflow and `Some(0)` when no axis has values.
#[must_use]
pub fn combination_count(axes: &[OptionAxis]) -> Option<usize> {
    let mut surviving = axes.iter().filter(|a| !a.values.is_empty()).peekable();
    if surviving.peek().is_none() {
        return Some(0);
    }
    surviving.try_fold(1usize, |acc, axis| acc.checked_mul(axis.values.len()))
}

/// Lazy odometer over the value lists of the non-empty axes.
///
/// The first axis varies slowest. Zero surviving axes yield nothing.
#[derive(Debug, Clone)]
pub struct Selections<'a> {
    axes: Vec<&'a OptionAxis>,
    cursor: Vec<usize>,
    done: bool,
}

impl<'a> Selections<'a> {
    #[must_use]
    pub fn new(axes: &'a [OptionAxis]) -> Self {
        let axes: Vec<&OptionAxis> = axes.iter().filter(|a| !a.values.is_empty()).collect();
        Self {
            cursor: vec![0; axes.len()],
            done: axes.is_empty(),
            axes,
        }
    }

    fn advance(&mut self) {
        for position in (0..self.axes.len()).rev() {
            self.cursor[position] += 1;
            if self.cursor[position] < self.axes[position].values.len() {
                return;
            }
            self.cursor[position] = 0;
        }
        self.done = true;
    }
}

impl Iterator for Selections<'_> {
    type Item = Selection;

    fn next(&mut self) -> Option<Selection> {
        if self.done {
            return None;
        }
        let mut selection = Selection::new();
        for (axis, &index) in self.axes.iter().zip(&self.cursor) {
            selection.insert(&axis.key, axis.values[index].clone());
        }
        self.advance();
        Some(selection)
    }
}

/// Enumerates every selection over `axes`.
#[must_use]
pub fn enumerate_selections(axes: &[OptionAxis]) -> Selections<'_> {
    Selections::new(axes)
}
