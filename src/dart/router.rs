use crate::config::SuffixMode;
use crate::dart::load::ServerInfoProvider;
use crate::dart::space::DartSpace;
use crate::query::pattern::{classify, PatternKind};

/// DART 层面的操作类型。查询侧 token 均已去掉通配符。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DartOp {
    Insert,
    Delete,
    Exact,
    Prefix,
    Suffix,
    Infix,
}

impl DartOp {
    pub fn is_write(self) -> bool {
        matches!(self, DartOp::Insert | DartOp::Delete)
    }
}

/// 一条路由结果：该 token 应发往哪个 server。
/// 写操作时 `vnode_id` 是将要落盘归组的虚拟节点；查询广播时无意义（置 0）。
#[derive(Clone, Debug)]
pub struct HashResult {
    pub server_id: u64,
    pub vnode_id: u64,
    pub token: String,
    pub is_suffix: bool,
}

impl DartSpace {
    /// 把 key 的前 tree_height 个字符当作 alphabet 进制数求值。
    /// 超出 key 长度（或树高）的位贡献 0。
    pub fn base_vnode(&self, key: &str) -> u64 {
        let bytes = key.as_bytes();
        let h = self.tree_height;
        let mut rst: u64 = 0;
        for n in 1..=h {
            let digit = match bytes.get((n - 1) as usize) {
                Some(&c) => (c as u64) % self.alphabet_size,
                None => 0,
            };
            rst += digit * self.alphabet_size.pow(h - n);
        }
        rst % self.num_vnode
    }

    /// Power-of-two-choice 备选 vnode。
    ///
    /// 扰动来源：叶字符、其前驱和后继（越界取 0）。major offset 挪到别的
    /// sub-region，minor offset 在 sub-region 内挪动，region_start 由首字符
    /// 加半个 alphabet 的反相位移决定，保证备选大概率落在不同 region。
    ///
    /// 插入路径传入 `load`：比较 base / 备选所在物理 server 的
    /// `indexed_word_count`，谁轻选谁。查询路径 `load = None`，恒取备选。
    pub fn reconciled_vnode(
        &self,
        base_vnode: u64,
        key: &str,
        load: Option<&dyn ServerInfoProvider>,
    ) -> u64 {
        if self.tree_height <= 1 {
            return base_vnode;
        }
        let bytes = key.as_bytes();
        let len = bytes.len();
        if len == 0 {
            return base_vnode;
        }
        let th = self.tree_height as usize;
        let alpha = self.alphabet_size;

        let (last_c_index, pre_leaf, post_leaf): (usize, u64, u64) = if len <= th {
            let lci = len - 1;
            let pre = if len <= 1 {
                0
            } else {
                bytes[lci - 1] as u64 % alpha
            };
            (lci, pre, 0)
        } else {
            let lci = th - 1;
            let post = bytes[lci + 1] as u64 % alpha;
            let pre = bytes[lci - 1] as u64 % alpha;
            (lci, pre, post)
        };
        let leaf = bytes[last_c_index] as u64 % alpha;

        let leaf_post_sum = leaf + pre_leaf + post_leaf;
        let leaf_post_diff = (post_leaf as i64 - leaf as i64 - pre_leaf as i64).unsigned_abs();

        let region_size = self.num_vnode / alpha;
        let sub_region_size = region_size / alpha;

        let major_offset = (leaf_post_sum % alpha) * sub_region_size;
        let minor_offset = leaf_post_diff;
        let region_offset = base_vnode
            .wrapping_add(major_offset)
            .wrapping_sub(minor_offset)
            % region_size;

        let invert_idx = alpha / 2;
        let region_start = ((bytes[0] as u64 + invert_idx) % alpha) * region_size;
        let alternate = (base_vnode + region_start + region_offset) % self.num_vnode;

        match load {
            Some(provider) => {
                let origin = provider.server_info(self.server_of(base_vnode));
                let candidate = provider.server_info(self.server_of(alternate));
                if origin.indexed_word_count > candidate.indexed_word_count {
                    alternate
                } else {
                    base_vnode
                }
            }
            None => alternate,
        }
    }

    /// 主 vnode + 等距分布的副本 vnode。`as_physical` 时映射成 server id。
    pub fn replica_vnodes(&self, master_vnode: u64, as_physical: bool) -> Vec<u64> {
        let mut out = Vec::with_capacity(self.replication_factor as usize);
        out.push(master_vnode);
        let distance = self.num_vnode / self.alphabet_size;
        for r in 1..self.replication_factor as u64 {
            out.push((master_vnode + r * distance) % self.num_vnode);
        }
        if as_physical {
            for v in out.iter_mut() {
                *v = self.server_of(*v);
            }
        }
        out
    }

    /// 插入路由：reconciled vnode 的全部副本所在 server。
    pub fn route_insert(&self, key: &str, load: Option<&dyn ServerInfoProvider>) -> Vec<u64> {
        let base = self.base_vnode(key);
        let master = self.reconciled_vnode(base, key, load);
        self.replica_vnodes(master, true)
    }

    /// 查询/删除路由。token 已去通配符。
    ///
    /// - infix（Reverse 模式）：全服广播。
    /// - 短 token 的 prefix/suffix（及 Exhaustive 模式的 infix）：广播到
    ///   首字符 region 覆盖的 server 区间。
    /// - 其余（exact、长 token、删除）：base + 备选两套副本；删除要清掉
    ///   两边全部副本，读则 round-robin 取一对。
    pub fn route_query(&self, token: &str, op: DartOp) -> Vec<u64> {
        if op == DartOp::Insert {
            return Vec::new();
        }

        if op == DartOp::Infix && self.suffix_mode == SuffixMode::Reverse {
            return (0..self.num_server).collect();
        }

        let region_scan = matches!(
            (op, self.suffix_mode),
            (DartOp::Prefix, _)
                | (DartOp::Suffix, SuffixMode::Reverse)
                | (DartOp::Infix, SuffixMode::Exhaustive)
        );
        if region_scan && (token.len() as u32) < self.tree_height {
            let region_size = self.num_vnode / self.alphabet_size;
            let first = token.bytes().next().unwrap_or(0) as u64;
            let region_start = (first % self.alphabet_size) * region_size;
            let s0 = self.server_of(region_start);
            let s1 = self.server_of(region_start + region_size - 1);
            return (s0..=s1).collect();
        }

        let base = self.base_vnode(token);
        let alt = self.reconciled_vnode(base, token, None);
        let base_reps = self.replica_vnodes(base, false);
        let alt_reps = self.replica_vnodes(alt, false);

        if op == DartOp::Delete {
            return base_reps
                .iter()
                .chain(alt_reps.iter())
                .map(|&v| self.server_of(v))
                .collect();
        }

        let idx = (self.next_request_index() % self.replication_factor as u64) as usize;
        vec![
            self.server_of(base_reps[idx]),
            self.server_of(alt_reps[idx]),
        ]
    }

    /// 完整路由入口：按后缀策略展开 token，并为每个 token 产出路由结果。
    ///
    /// 写操作在 Reverse 模式展开为「原 key + 反转 key」两条，在 Exhaustive
    /// 模式展开为全部后缀；查询只有一条 token（调用方已做模式判定）。
    pub fn dart_hash(
        &self,
        key: &str,
        op: DartOp,
        load: Option<&dyn ServerInfoProvider>,
    ) -> Vec<HashResult> {
        let tokens: Vec<(String, bool)> = if op.is_write() {
            match self.suffix_mode {
                SuffixMode::Exhaustive => key
                    .char_indices()
                    .map(|(i, _)| (key[i..].to_string(), i > 0))
                    .collect(),
                SuffixMode::Reverse => vec![
                    (key.to_string(), false),
                    (key.chars().rev().collect(), true),
                ],
            }
        } else {
            vec![(key.to_string(), false)]
        };

        let mut out = Vec::new();
        for (token, is_suffix) in tokens {
            match op {
                DartOp::Insert => {
                    let base = self.base_vnode(&token);
                    let master = self.reconciled_vnode(base, &token, load);
                    for v in self.replica_vnodes(master, false) {
                        out.push(HashResult {
                            server_id: self.server_of(v),
                            vnode_id: v,
                            token: token.clone(),
                            is_suffix,
                        });
                    }
                }
                DartOp::Delete => {
                    let base = self.base_vnode(&token);
                    let alt = self.reconciled_vnode(base, &token, None);
                    let vnodes = self
                        .replica_vnodes(base, false)
                        .into_iter()
                        .chain(self.replica_vnodes(alt, false));
                    for v in vnodes {
                        out.push(HashResult {
                            server_id: self.server_of(v),
                            vnode_id: v,
                            token: token.clone(),
                            is_suffix,
                        });
                    }
                }
                _ => {
                    for sid in self.route_query(&token, op) {
                        out.push(HashResult {
                            server_id: sid,
                            vnode_id: 0,
                            token: token.clone(),
                            is_suffix,
                        });
                    }
                }
            }
        }
        out
    }

    /// DHT 基线（对照用，索引引擎本身不走这条路）：点操作单服，
    /// 模式查询全服广播，单字符 prefix/suffix 例外（仍可单点命中）。
    pub fn dht_hash(&self, key: &str, op: DartOp) -> Vec<u64> {
        use xxhash_rust::xxh3::xxh3_64;

        let full_scan = match op {
            DartOp::Insert | DartOp::Delete | DartOp::Exact => false,
            DartOp::Prefix | DartOp::Suffix => key.len() > 1,
            DartOp::Infix => true,
        };
        if full_scan {
            (0..self.num_server).collect()
        } else {
            vec![xxh3_64(key.as_bytes()) % self.num_server]
        }
    }
}

impl DartSpace {
    /// 把 "key 模式" 查询串（可带 `=value` 部分）变成路由 token + 操作类型。
    ///
    /// Reverse 模式下 suffix 查询按反转 token 路由：后缀条目当初就是以
    /// 反转 key 定位到 vnode 的，查询必须走同一条数字展开。
    pub fn determine_query_token(&self, query: &str) -> (String, DartOp) {
        let key_part = query.split('=').next().unwrap_or(query);
        let (kind, token) = classify(key_part);
        match kind {
            PatternKind::Exact => (token, DartOp::Exact),
            PatternKind::Prefix => (token, DartOp::Prefix),
            PatternKind::Suffix => match self.suffix_mode {
                SuffixMode::Reverse => (token.chars().rev().collect(), DartOp::Suffix),
                SuffixMode::Exhaustive => (token, DartOp::Suffix),
            },
            PatternKind::Infix => (token, DartOp::Infix),
        }
    }
}
