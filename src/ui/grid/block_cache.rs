use std::collections::{BTreeMap, VecDeque};

use crate::domain::entities::record::Record;
use crate::usecase::services::windowed::BlockCompletion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
enum CachedBlock {
    Loading,
    Loaded(Vec<Record>),
    Failed,
}

/// Grid-side cache of row blocks for the scrolling view. Blocks are keyed by
/// start row; at most `max_blocks` loaded blocks are kept, oldest evicted.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockCache {
    block_size: u32,
    max_blocks: usize,
    blocks: BTreeMap<u64, CachedBlock>,
    load_order: VecDeque<u64>,
    row_count: Option<u64>,
}

impl BlockCache {
    pub fn new(block_size: u32, max_blocks: usize) -> Self {
        Self {
            block_size: block_size.max(1),
            max_blocks: max_blocks.max(1),
            blocks: BTreeMap::new(),
            load_order: VecDeque::new(),
            row_count: None,
        }
    }

    pub fn reset(&mut self) {
        self.blocks.clear();
        self.load_order.clear();
        self.row_count = None;
    }

    pub fn block_start(&self, row: u64) -> u64 {
        let size = u64::from(self.block_size);
        row / size * size
    }

    pub fn row_count(&self) -> Option<u64> {
        self.row_count
    }

    pub fn status(&self, start_row: u64) -> Option<BlockStatus> {
        self.blocks.get(&start_row).map(|block| match block {
            CachedBlock::Loading => BlockStatus::Loading,
            CachedBlock::Loaded(_) => BlockStatus::Loaded,
            CachedBlock::Failed => BlockStatus::Failed,
        })
    }

    pub fn is_loading(&self) -> bool {
        self.blocks
            .values()
            .any(|block| matches!(block, CachedBlock::Loading))
    }

    /// Marks the block containing `row` as loading. Returns the start row to
    /// fetch, or `None` when it is already loading or loaded. Failed blocks
    /// may be requested again.
    pub fn request(&mut self, row: u64) -> Option<u64> {
        let start = self.block_start(row);
        if let Some(total) = self.row_count {
            if start >= total && start > 0 {
                return None;
            }
        }
        match self.blocks.get(&start) {
            Some(CachedBlock::Loading) | Some(CachedBlock::Loaded(_)) => None,
            Some(CachedBlock::Failed) | None => {
                self.blocks.insert(start, CachedBlock::Loading);
                Some(start)
            }
        }
    }

    /// Block after the furthest loaded one, if the total says there is one.
    pub fn next_block(&self) -> Option<u64> {
        let size = u64::from(self.block_size);
        let start = self
            .blocks
            .iter()
            .rev()
            .find_map(|(start, block)| {
                matches!(block, CachedBlock::Loaded(_)).then_some(start + size)
            })
            .unwrap_or(0);
        match self.row_count {
            Some(total) if start >= total => None,
            _ => Some(start),
        }
    }

    /// Applies a completion for its own block coordinates. A failure only
    /// marks that block failed; other blocks and the row count stay as they
    /// were.
    pub fn apply(&mut self, completion: BlockCompletion) {
        let start = completion.key.start_row;
        match completion.outcome {
            Ok(block) => {
                self.row_count = Some(block.row_count);
                self.blocks.insert(start, CachedBlock::Loaded(block.rows));
                self.load_order.retain(|loaded| *loaded != start);
                self.load_order.push_back(start);
                self.evict();
            }
            Err(_) => {
                self.blocks.insert(start, CachedBlock::Failed);
            }
        }
    }

    fn evict(&mut self) {
        while self.load_order.len() > self.max_blocks {
            if let Some(oldest) = self.load_order.pop_front() {
                self.blocks.remove(&oldest);
            }
        }
    }

    /// Loaded rows in row order, with each row's absolute index.
    pub fn rows(&self) -> Vec<(u64, &Record)> {
        self.blocks
            .iter()
            .filter_map(|(start, block)| match block {
                CachedBlock::Loaded(rows) => Some((*start, rows)),
                _ => None,
            })
            .flat_map(|(start, rows)| {
                rows.iter()
                    .enumerate()
                    .map(move |(offset, row)| (start + offset as u64, row))
            })
            .collect()
    }

    pub fn loaded_records(&self) -> Vec<Record> {
        self.rows().into_iter().map(|(_, row)| row.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::query::QueryError;
    use crate::domain::entities::record::Value;
    use crate::usecase::services::windowed::{BlockKey, BlockRows};

    fn rows(count: usize, offset: usize) -> Vec<Record> {
        (0..count)
            .map(|idx| {
                let mut record = Record::new();
                record.insert("n".to_string(), Value::from((offset + idx) as i64));
                record
            })
            .collect()
    }

    fn loaded(start_row: u64, count: usize, row_count: u64) -> BlockCompletion {
        BlockCompletion {
            key: BlockKey {
                start_row,
                page: (start_row / 10) as u32 + 1,
            },
            outcome: Ok(BlockRows {
                rows: rows(count, start_row as usize),
                row_count,
            }),
        }
    }

    #[test]
    fn requests_are_deduplicated_per_block() {
        let mut cache = BlockCache::new(10, 4);

        assert_eq!(cache.request(3), Some(0));
        assert_eq!(cache.request(7), None);
        assert_eq!(cache.status(0), Some(BlockStatus::Loading));
        assert!(cache.is_loading());
    }

    #[test]
    fn failure_marks_only_its_block() {
        let mut cache = BlockCache::new(10, 4);
        cache.request(0);
        cache.apply(loaded(0, 10, 25));
        cache.request(10);

        cache.apply(BlockCompletion {
            key: BlockKey {
                start_row: 10,
                page: 2,
            },
            outcome: Err(QueryError::Transport("offline".to_string())),
        });

        assert_eq!(cache.status(10), Some(BlockStatus::Failed));
        assert_eq!(cache.rows().len(), 10);
        assert_eq!(cache.row_count(), Some(25));
        assert_eq!(cache.request(10), Some(10));
    }

    #[test]
    fn next_block_stops_at_row_count() {
        let mut cache = BlockCache::new(10, 4);
        assert_eq!(cache.next_block(), Some(0));

        cache.apply(loaded(0, 10, 15));
        assert_eq!(cache.next_block(), Some(10));

        cache.apply(loaded(10, 5, 15));
        assert_eq!(cache.next_block(), None);
        assert_eq!(cache.rows().last().map(|(idx, _)| *idx), Some(14));
    }

    #[test]
    fn oldest_loaded_block_is_evicted() {
        let mut cache = BlockCache::new(10, 2);
        cache.apply(loaded(0, 10, 100));
        cache.apply(loaded(10, 10, 100));
        cache.apply(loaded(20, 10, 100));

        assert_eq!(cache.status(0), None);
        assert_eq!(cache.status(10), Some(BlockStatus::Loaded));
        assert_eq!(cache.status(20), Some(BlockStatus::Loaded));
    }
}
