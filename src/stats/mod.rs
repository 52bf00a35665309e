use std::fmt;

use serde::Serialize;

/// 单 server 索引引擎的计数快照（随 /status 返回）。
#[derive(Clone, Debug, Default, Serialize)]
pub struct IndexStats {
    pub server_id: u64,
    /// 活跃索引记录数（insert 加，delete 减）
    pub index_record_count: i64,
    pub insert_request_count: u64,
    pub delete_request_count: u64,
    pub search_request_count: u64,
    /// 各操作累计耗时（微秒）
    pub time_create_us: u64,
    pub time_delete_us: u64,
    pub time_search_us: u64,
    pub distinct_prefix_keys: usize,
    pub distinct_suffix_keys: usize,
}

impl fmt::Display for IndexStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tagdex server {} index stats", self.server_id)?;
        writeln!(f, "  records:        {}", self.index_record_count)?;
        writeln!(
            f,
            "  requests:       insert={} delete={} search={}",
            self.insert_request_count, self.delete_request_count, self.search_request_count
        )?;
        writeln!(
            f,
            "  cumulative us:  create={} delete={} search={}",
            self.time_create_us, self.time_delete_us, self.time_search_us
        )?;
        write!(
            f,
            "  distinct keys:  prefix={} suffix={}",
            self.distinct_prefix_keys, self.distinct_suffix_keys
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_contains_counters() {
        let s = IndexStats {
            server_id: 3,
            index_record_count: 7,
            ..Default::default()
        };
        let text = s.to_string();
        assert!(text.contains("server 3"));
        assert!(text.contains("7"));
    }
}
