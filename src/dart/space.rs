use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SuffixMode;

#[derive(Debug, Error)]
pub enum SpaceError {
    #[error("num_server must be > 0")]
    ZeroServers,
    #[error("alphabet_size must be >= 2")]
    BadAlphabet,
    #[error("replication_factor must be > 0")]
    ZeroReplication,
}

/// DART 虚拟节点空间。进程级只读配置 + 一个单调请求计数器。
///
/// 树高推导：`ceil(log_alphabet(物理节点数)) + 1 + extra`，
/// 虚拟节点总数 `num_vnode = alphabet_size ^ tree_height`。
/// 物理节点数取 `max_server_num_to_adapt`（预留扩容）或当前 `num_server`。
pub struct DartSpace {
    pub alphabet_size: u64,
    pub tree_height: u32,
    pub num_vnode: u64,
    pub num_server: u64,
    pub replication_factor: u32,
    pub suffix_mode: SuffixMode,
    /// 查询副本 round-robin 计数。Relaxed 自增：并发下可能偏斜，
    /// 只影响负载摊分，不影响正确性（见 DESIGN.md）。
    client_request_count: AtomicU64,
}

/// dart_info 持久化载荷（server 0 在 dump 时落盘，recover 时全员加载）。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DartInfo {
    pub alphabet_size: u64,
    pub tree_height: u32,
    pub num_vnode: u64,
    pub num_server: u64,
    pub replication_factor: u32,
    pub suffix_mode: SuffixMode,
}

impl DartSpace {
    pub fn new(
        num_server: u64,
        alphabet_size: u64,
        extra_tree_height: u32,
        replication_factor: u32,
        max_server_num_to_adapt: u64,
        suffix_mode: SuffixMode,
    ) -> Result<Self, SpaceError> {
        if num_server == 0 {
            return Err(SpaceError::ZeroServers);
        }
        if alphabet_size < 2 {
            return Err(SpaceError::BadAlphabet);
        }
        if replication_factor == 0 {
            return Err(SpaceError::ZeroReplication);
        }

        let physical = if max_server_num_to_adapt == 0 {
            num_server
        } else {
            max_server_num_to_adapt
        };
        let tree_height = ((physical as f64).ln() / (alphabet_size as f64).ln()).ceil() as u32
            + 1
            + extra_tree_height;
        let num_vnode = alphabet_size.pow(tree_height);

        Ok(Self {
            alphabet_size,
            tree_height,
            num_vnode,
            num_server,
            replication_factor,
            suffix_mode,
            client_request_count: AtomicU64::new(0),
        })
    }

    pub fn from_info(info: &DartInfo) -> Self {
        Self {
            alphabet_size: info.alphabet_size,
            tree_height: info.tree_height,
            num_vnode: info.num_vnode,
            num_server: info.num_server,
            replication_factor: info.replication_factor,
            suffix_mode: info.suffix_mode,
            client_request_count: AtomicU64::new(0),
        }
    }

    pub fn info(&self) -> DartInfo {
        DartInfo {
            alphabet_size: self.alphabet_size,
            tree_height: self.tree_height,
            num_vnode: self.num_vnode,
            num_server: self.num_server,
            replication_factor: self.replication_factor,
            suffix_mode: self.suffix_mode,
        }
    }

    /// vnode -> 物理 server。每个 server 静态持有一段连续 vnode 区间。
    pub fn server_of(&self, vnode_id: u64) -> u64 {
        let per_server = self.num_vnode / self.num_server;
        (vnode_id / per_server) % self.num_server
    }

    /// 指定 server 持有的全部 vnode（recover 时用）。
    pub fn vnodes_owned_by(&self, server_id: u64) -> Vec<u64> {
        (0..self.num_vnode)
            .filter(|&v| self.server_of(v) == server_id)
            .collect()
    }

    /// 自增并返回请求序号（副本 round-robin 选择）。
    pub fn next_request_index(&self) -> u64 {
        self.client_request_count.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space(num_server: u64) -> DartSpace {
        DartSpace::new(num_server, 27, 0, 3, 0, SuffixMode::Reverse).unwrap()
    }

    #[test]
    fn height_and_vnode_derivation() {
        let s = space(3);
        assert_eq!(s.tree_height, 2);
        assert_eq!(s.num_vnode, 729);
    }

    #[test]
    fn single_server_height_is_one() {
        let s = space(1);
        assert_eq!(s.tree_height, 1);
        assert_eq!(s.num_vnode, 27);
    }

    #[test]
    fn vnode_ownership_partitions_whole_space() {
        let s = space(3);
        let mut total = 0usize;
        for sid in 0..3 {
            let owned = s.vnodes_owned_by(sid);
            assert!(!owned.is_empty());
            assert!(owned.iter().all(|&v| s.server_of(v) == sid));
            total += owned.len();
        }
        assert_eq!(total as u64, s.num_vnode);
    }

    #[test]
    fn zero_servers_is_a_config_error() {
        assert!(DartSpace::new(0, 27, 0, 3, 0, SuffixMode::Reverse).is_err());
        assert!(DartSpace::new(3, 1, 0, 3, 0, SuffixMode::Reverse).is_err());
        assert!(DartSpace::new(3, 27, 0, 0, 0, SuffixMode::Reverse).is_err());
    }

    #[test]
    fn request_counter_is_monotonic() {
        let s = space(3);
        let a = s.next_request_index();
        let b = s.next_request_index();
        assert!(b > a);
    }

    #[test]
    fn info_round_trip() {
        let s = space(3);
        let restored = DartSpace::from_info(&s.info());
        assert_eq!(restored.num_vnode, s.num_vnode);
        assert_eq!(restored.tree_height, s.tree_height);
    }
}
