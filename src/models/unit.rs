//! 内容单元与分块
//!
//! 分段器产出 ContentUnit，分块计划器把它们打包成 Chunk。
//! 两者一旦创建就不再修改。

/// 一个达到最小词数的段落
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUnit {
    /// 在合格段落序列中的位置（0 起始）
    pub index: usize,
    /// 段落文本（组内各行已用单个空格连接）
    pub text: String,
    /// 词数（按空白切分）
    pub word_count: usize,
}

impl ContentUnit {
    pub fn new(index: usize, text: String) -> Self {
        let word_count = text.split_whitespace().count();
        Self {
            index,
            text,
            word_count,
        }
    }
}

/// 一个或多个段落打包成的分块
///
/// 不变量：段落不会被拆进两个分块；分块顺序保持段落顺序；
/// 每个段落恰好出现在一个分块中。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 成员段落用空行连接后的文本
    pub text: String,
    /// 成员段落的原始索引（升序）
    pub member_indices: Vec<usize>,
    /// 成员段落的词数之和
    pub word_count: usize,
}

impl Chunk {
    /// 从一组连续的段落构建分块
    pub fn from_units(units: &[ContentUnit]) -> Self {
        let text = units
            .iter()
            .map(|u| u.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let member_indices = units.iter().map(|u| u.index).collect();
        let word_count = units.iter().map(|u| u.word_count).sum();
        Self {
            text,
            member_indices,
            word_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_word_count() {
        let unit = ContentUnit::new(0, "one two  three".to_string());
        assert_eq!(unit.word_count, 3);
        assert_eq!(unit.index, 0);
    }

    #[test]
    fn test_chunk_from_units() {
        let a = ContentUnit::new(0, "first paragraph".to_string());
        let b = ContentUnit::new(1, "second paragraph".to_string());
        let chunk = Chunk::from_units(&[a, b]);
        assert_eq!(chunk.text, "first paragraph\n\nsecond paragraph");
        assert_eq!(chunk.member_indices, vec![0, 1]);
        assert_eq!(chunk.word_count, 4);
    }
}
