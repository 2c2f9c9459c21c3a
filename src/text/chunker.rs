//! 分块计划器
//!
//! 把段落贪心地打包进不超过词数上限的分块。
//! 刻意不做最优装箱：保持确定性和段落顺序比装得更满重要。

use crate::models::{Chunk, ContentUnit};

/// 分块计划器
#[derive(Debug, Clone)]
pub struct ChunkPlanner {
    word_limit: usize,
}

impl ChunkPlanner {
    /// 创建分块计划器
    ///
    /// # 参数
    /// - `word_limit`: 每个分块的词数上限
    pub fn new(word_limit: usize) -> Self {
        Self { word_limit }
    }

    /// 贪心打包
    ///
    /// 上限只在段落之间生效：单个超限段落不会被拆开，
    /// 它自己独占一个分块。
    pub fn plan(&self, units: &[ContentUnit]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current: Vec<ContentUnit> = Vec::new();
        let mut current_words = 0usize;

        for unit in units {
            if current_words + unit.word_count > self.word_limit && !current.is_empty() {
                chunks.push(Chunk::from_units(&current));
                current.clear();
                current_words = 0;
            }
            current_words += unit.word_count;
            current.push(unit.clone());
        }

        if !current.is_empty() {
            chunks.push(Chunk::from_units(&current));
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(index: usize, word_count: usize) -> ContentUnit {
        let text = (0..word_count)
            .map(|i| format!("w{}", i))
            .collect::<Vec<_>>()
            .join(" ");
        ContentUnit::new(index, text)
    }

    #[test]
    fn test_exact_limit_single_chunk() {
        // 词数之和恰好等于上限时只产出一个分块
        let units = vec![unit(0, 400), unit(1, 400), unit(2, 400)];
        let chunks = ChunkPlanner::new(1200).plan(&units);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].member_indices, vec![0, 1, 2]);
        assert_eq!(chunks[0].word_count, 1200);
    }

    #[test]
    fn test_one_more_word_forces_second_chunk() {
        let units = vec![unit(0, 400), unit(1, 400), unit(2, 401)];
        let chunks = ChunkPlanner::new(1200).plan(&units);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].member_indices, vec![0, 1]);
        assert_eq!(chunks[1].member_indices, vec![2]);
    }

    #[test]
    fn test_oversize_unit_gets_own_chunk() {
        // 单个超限段落不拆分，独占一个分块
        let units = vec![unit(0, 100), unit(1, 1500), unit(2, 100)];
        let chunks = ChunkPlanner::new(1200).plan(&units);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].member_indices, vec![1]);
        assert_eq!(chunks[1].word_count, 1500);
    }

    #[test]
    fn test_every_unit_in_exactly_one_chunk_in_order() {
        let units: Vec<_> = (0..10).map(|i| unit(i, 300)).collect();
        let chunks = ChunkPlanner::new(1000).plan(&units);

        let mut covered: Vec<usize> = Vec::new();
        for chunk in &chunks {
            // 上限只允许被单个超限段落突破，这里没有超限段落
            assert!(chunk.word_count <= 1000);
            covered.extend(&chunk.member_indices);
        }
        assert_eq!(covered, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_input() {
        let chunks = ChunkPlanner::new(1200).plan(&[]);
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_chunk_text_joined_with_blank_lines() {
        let units = vec![unit(0, 50), unit(1, 50)];
        let chunks = ChunkPlanner::new(1200).plan(&units);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.contains("\n\n"));
    }
}
