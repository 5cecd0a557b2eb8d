use crate::domain::model::RenderedPair;

/// A batch taken out of the accumulator, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBatch {
    pub body: String,
    /// Source row of each pair, in body order.
    pub rows: Vec<usize>,
    /// Pairs flushed before this batch.
    pub offset: usize,
}

impl PendingBatch {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_row(&self) -> Option<usize> {
        self.rows.first().copied()
    }

    pub fn last_row(&self) -> Option<usize> {
        self.rows.last().copied()
    }
}

/// Collects rendered pairs until `threshold` rows are buffered.
pub struct BatchAccumulator {
    threshold: usize,
    buffer: String,
    rows: Vec<usize>,
    flushed: usize,
}

impl BatchAccumulator {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold: threshold.max(1),
            buffer: String::new(),
            rows: Vec::new(),
            flushed: 0,
        }
    }

    pub fn append(&mut self, pair: &RenderedPair) {
        pair.write_to(&mut self.buffer);
        self.rows.push(pair.row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn should_flush(&self) -> bool {
        self.rows.len() >= self.threshold
    }

    /// Empties the buffer. An empty buffer gives `None` so no request is sent.
    pub fn take(&mut self) -> Option<PendingBatch> {
        if self.rows.is_empty() {
            return None;
        }
        let batch = PendingBatch {
            body: std::mem::take(&mut self.buffer),
            rows: std::mem::take(&mut self.rows),
            offset: self.flushed,
        };
        self.flushed += batch.len();
        Some(batch)
    }

    /// Pairs handed out by [`take`](Self::take) so far.
    pub fn flushed(&self) -> usize {
        self.flushed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(row: usize) -> RenderedPair {
        RenderedPair {
            row,
            action: r#"{"index":{"_index":"x"}}"#.to_string(),
            document: format!(r#"{{"row":{}}}"#, row),
        }
    }

    #[test]
    fn test_flushes_every_threshold_rows() {
        let mut acc = BatchAccumulator::new(3);
        let mut batches = Vec::new();

        for row in 2..9 {
            acc.append(&pair(row));
            if acc.should_flush() {
                batches.extend(acc.take());
            }
        }
        batches.extend(acc.take());

        // 7 rows, threshold 3 => ceil(7/3) batches
        assert_eq!(batches.len(), 3);
        assert_eq!(batches.iter().map(PendingBatch::len).collect::<Vec<_>>(), vec![3, 3, 1]);
        assert_eq!(batches.iter().map(|b| b.offset).collect::<Vec<_>>(), vec![0, 3, 6]);
        assert_eq!(batches[1].first_row(), Some(5));
        assert_eq!(acc.flushed(), 7);
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_request() {
        let mut acc = BatchAccumulator::new(2);
        let mut batches = Vec::new();
        for row in 2..6 {
            acc.append(&pair(row));
            if acc.should_flush() {
                batches.extend(acc.take());
            }
        }
        assert!(acc.take().is_none());
        assert_eq!(batches.len(), 2);
    }

    #[test]
    fn test_concatenated_bodies_preserve_row_order() {
        let mut acc = BatchAccumulator::new(2);
        let mut expected = String::new();
        let mut joined = String::new();

        for row in 2..7 {
            let p = pair(row);
            p.write_to(&mut expected);
            acc.append(&p);
            if acc.should_flush() {
                joined.push_str(&acc.take().unwrap().body);
            }
        }
        if let Some(rest) = acc.take() {
            joined.push_str(&rest.body);
        }

        assert_eq!(joined, expected);
        assert!(acc.is_empty());
    }
}
