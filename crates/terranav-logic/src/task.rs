//! A single navigation assignment: drive from start to destination.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub start_row: usize,
    pub start_col: usize,
    pub des_row: usize,
    pub des_col: usize,
}

impl Task {
    pub fn new(start_row: usize, start_col: usize, des_row: usize, des_col: usize) -> Self {
        Self {
            start_row,
            start_col,
            des_row,
            des_col,
        }
    }

    pub fn start(&self) -> (i64, i64) {
        (self.start_row as i64, self.start_col as i64)
    }

    pub fn destination(&self) -> (i64, i64) {
        (self.des_row as i64, self.des_col as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let task = Task::new(1, 2, 3, 4);
        assert_eq!(task.start(), (1, 2));
        assert_eq!(task.destination(), (3, 4));
    }
}
