//! 短期记忆：最近对话行
//!
//! 保存 "role: text" 形式的行，超出容量时丢弃最旧的一行；只存在于进程内，不持久化。

use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 10;

/// 有界滚动缓冲区
#[derive(Clone, Debug)]
pub struct ShortTermMemory {
    lines: VecDeque<String>,
    capacity: usize,
}

impl ShortTermMemory {
    /// capacity 为 0 时按 1 处理
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn add(&mut self, text: &str, role: &str) {
        self.lines.push_back(format!("{role}: {text}"));
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }

    /// 最近 limit 行，按时间顺序（最新在最后）以换行拼接
    pub fn recent(&self, limit: usize) -> String {
        let skip = self.lines.len().saturating_sub(limit);
        self.lines
            .iter()
            .skip(skip)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for ShortTermMemory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
