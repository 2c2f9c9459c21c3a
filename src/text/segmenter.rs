//! 分段器
//!
//! 把原始文本按空行切成段落，过滤标题和出处行，
//! 丢弃词数不足的段落。产出的序列是惰性的、有限的，
//! 重新调用 segment 即可从头再来。

use crate::models::ContentUnit;

/// 会被丢弃的出处元数据前缀
const METADATA_PREFIX: &str = "Response to";

/// 分段器
#[derive(Debug, Clone)]
pub struct Segmenter {
    min_words: usize,
}

impl Segmenter {
    /// 创建分段器
    ///
    /// # 参数
    /// - `min_words`: 段落的最小词数，低于它的段落被丢弃
    pub fn new(min_words: usize) -> Self {
        Self { min_words }
    }

    /// 惰性产出合格段落
    ///
    /// 索引是合格段落序列里的位置，相同输入两次调用产出完全相同的序列。
    pub fn segment<'a>(&self, text: &'a str) -> Paragraphs<'a> {
        Paragraphs {
            lines: text.trim().lines(),
            current: Vec::new(),
            min_words: self.min_words,
            next_index: 0,
        }
    }
}

/// 合格段落迭代器
pub struct Paragraphs<'a> {
    lines: std::str::Lines<'a>,
    current: Vec<&'a str>,
    min_words: usize,
    next_index: usize,
}

impl<'a> Paragraphs<'a> {
    /// 封存当前分组；词数不足时返回 None
    fn flush(&mut self) -> Option<ContentUnit> {
        if self.current.is_empty() {
            return None;
        }
        let text = self.current.join(" ");
        self.current.clear();
        if text.split_whitespace().count() < self.min_words {
            return None;
        }
        let unit = ContentUnit::new(self.next_index, text);
        self.next_index += 1;
        Some(unit)
    }
}

impl<'a> Iterator for Paragraphs<'a> {
    type Item = ContentUnit;

    fn next(&mut self) -> Option<ContentUnit> {
        loop {
            match self.lines.next() {
                Some(line) => {
                    let stripped = line.trim();
                    // 跳过标题行和出处元数据行
                    if stripped.starts_with('#') || stripped.starts_with(METADATA_PREFIX) {
                        continue;
                    }
                    if stripped.is_empty() {
                        if let Some(unit) = self.flush() {
                            return Some(unit);
                        }
                    } else {
                        self.current.push(stripped);
                    }
                }
                None => return self.flush(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 生成指定词数的段落
    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_blank_line_splitting() {
        let text = format!("{}\n\n{}", words(45), words(50));
        let units: Vec<_> = Segmenter::new(40).segment(&text).collect();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].index, 0);
        assert_eq!(units[0].word_count, 45);
        assert_eq!(units[1].index, 1);
        assert_eq!(units[1].word_count, 50);
    }

    #[test]
    fn test_short_paragraph_dropped() {
        // 20 词的段落低于 40 词下限，产出空序列
        let text = words(20);
        let units: Vec<_> = Segmenter::new(40).segment(&text).collect();
        assert!(units.is_empty());
    }

    #[test]
    fn test_header_and_metadata_lines_skipped() {
        let text = format!(
            "# A heading\nResponse to reviewer 2\n{}\n\n## Another heading\n{}",
            words(41),
            words(42)
        );
        let units: Vec<_> = Segmenter::new(40).segment(&text).collect();
        assert_eq!(units.len(), 2);
        assert!(!units[0].text.contains('#'));
        assert!(!units[0].text.contains("Response to"));
    }

    #[test]
    fn test_lines_joined_with_single_spaces() {
        // 组内换行被替换为单个空格
        let half = words(20);
        let text = format!("{}\n{}", half, half);
        let units: Vec<_> = Segmenter::new(40).segment(&text).collect();
        assert_eq!(units.len(), 1);
        assert!(!units[0].text.contains('\n'));
        assert_eq!(units[0].word_count, 40);
    }

    #[test]
    fn test_idempotent() {
        let text = format!("{}\n\n{}\n\n{}", words(45), words(10), words(60));
        let segmenter = Segmenter::new(40);
        let first: Vec<_> = segmenter.segment(&text).collect();
        let second: Vec<_> = segmenter.segment(&text).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_index_assigned_after_filtering() {
        // 中间的短段落被丢弃后，索引仍然连续
        let text = format!("{}\n\n{}\n\n{}", words(45), words(5), words(50));
        let units: Vec<_> = Segmenter::new(40).segment(&text).collect();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].index, 0);
        assert_eq!(units[1].index, 1);
    }

    #[test]
    fn test_empty_input() {
        let units: Vec<_> = Segmenter::new(40).segment("").collect();
        assert!(units.is_empty());
    }
}
