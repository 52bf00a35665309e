use std::time::Instant;

use roaring::RoaringTreemap;
use serde::{Deserialize, Serialize};

use crate::config::SuffixMode;
use crate::dart::load::ServerLoad;
use crate::index::rbtree::{NumKind, RbTree};
use crate::index::trie::PrefixMap;
use crate::query::pattern::{
    classify, is_quoted, parse_range, split_kv, strip_quotes, PatternKind, RangeExpr,
};
use crate::stats::IndexStats;

/// key leaf 上已出现的值类别标记（2 bit）
pub const VK_STRING: u8 = 0b01;
pub const VK_NUMERIC: u8 = 0b10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeKind {
    Prefix,
    Suffix,
}

/// 属性值。数值统一 8 字节 little-endian 进入数值子索引。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TagValue {
    Str(String),
    Uint64(u64),
    Int64(i64),
    Double(f64),
}

impl TagValue {
    pub fn numeric_kind(&self) -> Option<NumKind> {
        match self {
            TagValue::Str(_) => None,
            TagValue::Uint64(_) => Some(NumKind::Uint64),
            TagValue::Int64(_) => Some(NumKind::Int64),
            TagValue::Double(_) => Some(NumKind::Double),
        }
    }

    pub fn numeric_key(&self) -> Option<[u8; 8]> {
        match self {
            TagValue::Str(_) => None,
            TagValue::Uint64(v) => Some(v.to_le_bytes()),
            TagValue::Int64(v) => Some(v.to_le_bytes()),
            TagValue::Double(v) => Some(v.to_le_bytes()),
        }
    }
}

/// 单次 create/delete 的请求封皮。只活在一次操作内，不持久化。
#[derive(Clone, Debug)]
pub struct IdxRecord {
    pub key: String,
    pub value: TagValue,
    pub obj_ids: Vec<u64>,
    /// 该 token 是否为后缀派生（由路由层展开时标记）
    pub is_key_suffix: bool,
    /// 归属 vnode（dump 时按此归组文件）
    pub vnode_id: u64,
    pub src_client_id: u64,
}

/// 值子索引叶：一个去重的 obj_id 集合。集合空则叶亡。
#[derive(Clone, Debug, Default)]
pub struct ValueLeaf {
    pub obj_ids: RoaringTreemap,
}

impl ValueLeaf {
    fn with_ids(ids: &[u64]) -> Self {
        let mut leaf = ValueLeaf::default();
        for &id in ids {
            leaf.obj_ids.insert(id);
        }
        leaf
    }
}

/// 键索引叶：每个独立属性 key 一个，最多持有四个值子索引。
/// secondary_rbt 预留槽位，当前没有任何写入路径（见 DESIGN.md）。
/// 四个槽位全空时由删除级联摘除整个 leaf。
#[derive(Debug, Default)]
pub struct KeyLeaf {
    pub vnode_id: u64,
    pub value_kinds: u8,
    pub numeric_kind: Option<NumKind>,
    pub primary_trie: Option<PrefixMap<ValueLeaf>>,
    pub secondary_trie: Option<PrefixMap<ValueLeaf>>,
    pub primary_rbt: Option<RbTree<ValueLeaf>>,
    pub secondary_rbt: Option<RbTree<ValueLeaf>>,
}

impl KeyLeaf {
    fn new(vnode_id: u64) -> Self {
        Self {
            vnode_id,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primary_trie.is_none()
            && self.secondary_trie.is_none()
            && self.primary_rbt.is_none()
            && self.secondary_rbt.is_none()
    }
}

/// 单 server 的本地索引引擎。
///
/// 两棵键索引：prefix_tree 存原 key；suffix_tree 按后缀策略存反转 key
/// 或全部真后缀。结构性修改不做内部同步，外层 dispatch 负责粗粒度互斥。
#[derive(Debug)]
pub struct Idioms {
    pub server_id: u64,
    pub num_servers: u64,
    pub suffix_mode: SuffixMode,
    prefix_tree: PrefixMap<KeyLeaf>,
    suffix_tree: PrefixMap<KeyLeaf>,
    index_record_count: i64,
    insert_request_count: u64,
    delete_request_count: u64,
    search_request_count: u64,
    time_create_us: u64,
    time_delete_us: u64,
    time_search_us: u64,
}

impl Idioms {
    pub fn new(server_id: u64, num_servers: u64, suffix_mode: SuffixMode) -> Self {
        Self {
            server_id,
            num_servers,
            suffix_mode,
            prefix_tree: PrefixMap::new(),
            suffix_tree: PrefixMap::new(),
            index_record_count: 0,
            insert_request_count: 0,
            delete_request_count: 0,
            search_request_count: 0,
            time_create_us: 0,
            time_delete_us: 0,
            time_search_us: 0,
        }
    }

    pub fn tree(&self, kind: TreeKind) -> &PrefixMap<KeyLeaf> {
        match kind {
            TreeKind::Prefix => &self.prefix_tree,
            TreeKind::Suffix => &self.suffix_tree,
        }
    }

    fn tree_mut(&mut self, kind: TreeKind) -> &mut PrefixMap<KeyLeaf> {
        match kind {
            TreeKind::Prefix => &mut self.prefix_tree,
            TreeKind::Suffix => &mut self.suffix_tree,
        }
    }

    /// 插入一条 (key, value, obj_ids)。key leaf / 值子索引 / 值叶全部
    /// 惰性创建，重复插入同一 (key, value, id) 是集合语义空操作。
    pub fn create(&mut self, rec: &IdxRecord) {
        let t0 = Instant::now();
        let kind = if rec.is_key_suffix {
            TreeKind::Suffix
        } else {
            TreeKind::Prefix
        };
        let mode = self.suffix_mode;
        insert_into_key_trie(self.tree_mut(kind), mode, rec);
        self.time_create_us += t0.elapsed().as_micros() as u64;
        self.index_record_count += 1;
        self.insert_request_count += 1;
    }

    /// 删除一条记录的 obj_ids。叶集合清空后自底向上收敛：
    /// 值叶 -> 值子索引 -> key leaf，引用计数式拆除而非整树重建。
    /// key/value 不存在时是成功的空操作。
    pub fn delete(&mut self, rec: &IdxRecord) {
        let t0 = Instant::now();
        let kind = if rec.is_key_suffix {
            TreeKind::Suffix
        } else {
            TreeKind::Prefix
        };
        let mode = self.suffix_mode;
        delete_from_key_trie(self.tree_mut(kind), mode, rec);
        self.time_delete_us += t0.elapsed().as_micros() as u64;
        self.index_record_count -= 1;
        self.delete_request_count += 1;
    }

    /// 查询入口。query 形如 `key_pattern=value_pattern`；缺 `=` 属于畸形
    /// 查询，按零结果处理。命中结果不跨 key 去重（fan-out 层负责合并）。
    pub fn search(&mut self, query: &str) -> Vec<u64> {
        let t0 = Instant::now();
        self.search_request_count += 1;

        let mut out = Vec::new();
        match split_kv(query) {
            Some((k_tok, v_tok)) => self.search_inner(k_tok, v_tok, &mut out),
            None => {
                tracing::debug!("Query '{}' has no '=' delimiter, zero results", query);
            }
        }
        self.time_search_us += t0.elapsed().as_micros() as u64;
        out
    }

    fn search_inner(&self, k_tok: &str, v_tok: &str, out: &mut Vec<u64>) {
        let mode = self.suffix_mode;
        let (kind, tok) = classify(k_tok);
        match kind {
            PatternKind::Exact => {
                if let Some(leaf) = self.prefix_tree.get(tok.as_bytes()) {
                    eval_value(leaf, v_tok, mode, out);
                }
            }
            PatternKind::Prefix => {
                for (_, leaf) in self.prefix_tree.iter_prefix(tok.as_bytes()) {
                    eval_value(leaf, v_tok, mode, out);
                }
            }
            PatternKind::Suffix => match mode {
                SuffixMode::Reverse => {
                    let reversed: String = tok.chars().rev().collect();
                    for (_, leaf) in self.suffix_tree.iter_prefix(reversed.as_bytes()) {
                        eval_value(leaf, v_tok, mode, out);
                    }
                }
                // 后缀全展开时 token 本身就是一个后缀条目；整 key 相等的
                // 情况只在 prefix 树里
                SuffixMode::Exhaustive => {
                    if let Some(leaf) = self.suffix_tree.get(tok.as_bytes()) {
                        eval_value(leaf, v_tok, mode, out);
                    }
                    if let Some(leaf) = self.prefix_tree.get(tok.as_bytes()) {
                        eval_value(leaf, v_tok, mode, out);
                    }
                }
            },
            PatternKind::Infix => match mode {
                SuffixMode::Reverse => {
                    for (key, leaf) in self.prefix_tree.iter() {
                        if contains_sub(key, tok.as_bytes()) {
                            eval_value(leaf, v_tok, mode, out);
                        }
                    }
                }
                // 任意 infix 必是某后缀的前缀
                SuffixMode::Exhaustive => {
                    for (_, leaf) in self.suffix_tree.iter_prefix(tok.as_bytes()) {
                        eval_value(leaf, v_tok, mode, out);
                    }
                    for (_, leaf) in self.prefix_tree.iter_prefix(tok.as_bytes()) {
                        eval_value(leaf, v_tok, mode, out);
                    }
                }
            },
        }
    }

    /// recover 路径：按 dump 内容原样重建字符串值叶。
    /// 不重算 DART 路由，信任旧文件的归组；副本文件重复加载时靠
    /// 集合语义自然合并。
    pub fn restore_string_value(
        &mut self,
        tree_kind: TreeKind,
        key: &[u8],
        vnode_id: u64,
        secondary: bool,
        value: &[u8],
        obj_ids: &[u64],
    ) {
        let tree = self.tree_mut(tree_kind);
        if tree.get(key).is_none() {
            tree.insert(key, KeyLeaf::new(vnode_id));
        }
        let leaf = tree.get_mut(key).expect("leaf just ensured");
        leaf.value_kinds |= VK_STRING;
        let slot = if secondary {
            &mut leaf.secondary_trie
        } else {
            &mut leaf.primary_trie
        };
        add_ids(slot.get_or_insert_with(PrefixMap::new), value, obj_ids);
    }

    /// recover 路径：重建数值值叶。
    pub fn restore_numeric_value(
        &mut self,
        tree_kind: TreeKind,
        key: &[u8],
        vnode_id: u64,
        num_kind: NumKind,
        secondary: bool,
        value_key: &[u8],
        obj_ids: &[u64],
    ) {
        let tree = self.tree_mut(tree_kind);
        if tree.get(key).is_none() {
            tree.insert(key, KeyLeaf::new(vnode_id));
        }
        let leaf = tree.get_mut(key).expect("leaf just ensured");
        leaf.value_kinds |= VK_NUMERIC;
        if leaf.numeric_kind.is_none() {
            leaf.numeric_kind = Some(num_kind);
        }
        let slot = if secondary {
            &mut leaf.secondary_rbt
        } else {
            &mut leaf.primary_rbt
        };
        let rbt = slot.get_or_insert_with(|| RbTree::new(num_kind));
        match rbt.find_mut(value_key) {
            Some(vl) => {
                for &id in obj_ids {
                    vl.obj_ids.insert(id);
                }
            }
            None => {
                rbt.add(value_key, ValueLeaf::with_ids(obj_ids));
            }
        }
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            server_id: self.server_id,
            index_record_count: self.index_record_count,
            insert_request_count: self.insert_request_count,
            delete_request_count: self.delete_request_count,
            search_request_count: self.search_request_count,
            time_create_us: self.time_create_us,
            time_delete_us: self.time_delete_us,
            time_search_us: self.time_search_us,
            distinct_prefix_keys: self.prefix_tree.len(),
            distinct_suffix_keys: self.suffix_tree.len(),
        }
    }

    /// 插入路径 two-choice 抉择需要的负载视图。
    pub fn server_load(&self) -> ServerLoad {
        ServerLoad {
            id: self.server_id,
            indexed_word_count: self.index_record_count,
            request_count: (self.insert_request_count
                + self.delete_request_count
                + self.search_request_count) as i64,
        }
    }
}

fn insert_into_key_trie(tree: &mut PrefixMap<KeyLeaf>, mode: SuffixMode, rec: &IdxRecord) {
    let key = rec.key.as_bytes();
    if tree.get(key).is_none() {
        tree.insert(key, KeyLeaf::new(rec.vnode_id));
    }
    let leaf = tree.get_mut(key).expect("leaf just ensured");

    match &rec.value {
        TagValue::Str(raw) => {
            leaf.value_kinds |= VK_STRING;
            let value = strip_quotes(raw);
            // 惰性建串值子索引，重复调用幂等
            let primary = leaf.primary_trie.get_or_insert_with(PrefixMap::new);
            add_ids(primary, value.as_bytes(), &rec.obj_ids);

            let secondary = leaf.secondary_trie.get_or_insert_with(PrefixMap::new);
            match mode {
                SuffixMode::Reverse => {
                    let reversed: String = value.chars().rev().collect();
                    add_ids(secondary, reversed.as_bytes(), &rec.obj_ids);
                }
                SuffixMode::Exhaustive => {
                    for (i, _) in value.char_indices().skip(1) {
                        add_ids(secondary, value[i..].as_bytes(), &rec.obj_ids);
                    }
                }
            }
        }
        value => {
            let num_kind = value.numeric_kind().expect("non-string tag value");
            let value_key = value.numeric_key().expect("non-string tag value");
            leaf.value_kinds |= VK_NUMERIC;
            // 首次数值插入固定该 key 的数值类型与比较器
            if leaf.primary_rbt.is_none() {
                leaf.numeric_kind = Some(num_kind);
                leaf.primary_rbt = Some(RbTree::new(num_kind));
            }
            let rbt = leaf.primary_rbt.as_mut().expect("just ensured");
            match rbt.find_mut(&value_key) {
                Some(vl) => {
                    for &id in &rec.obj_ids {
                        vl.obj_ids.insert(id);
                    }
                }
                None => {
                    rbt.add(&value_key, ValueLeaf::with_ids(&rec.obj_ids));
                }
            }
        }
    }
}

fn delete_from_key_trie(tree: &mut PrefixMap<KeyLeaf>, mode: SuffixMode, rec: &IdxRecord) {
    let key = rec.key.as_bytes();
    let Some(leaf) = tree.get_mut(key) else {
        return;
    };

    match &rec.value {
        TagValue::Str(raw) => {
            let value = strip_quotes(raw);
            if let Some(trie) = leaf.primary_trie.as_mut() {
                remove_ids(trie, value.as_bytes(), &rec.obj_ids);
            }
            if let Some(trie) = leaf.secondary_trie.as_mut() {
                match mode {
                    SuffixMode::Reverse => {
                        let reversed: String = value.chars().rev().collect();
                        remove_ids(trie, reversed.as_bytes(), &rec.obj_ids);
                    }
                    SuffixMode::Exhaustive => {
                        for (i, _) in value.char_indices().skip(1) {
                            remove_ids(trie, value[i..].as_bytes(), &rec.obj_ids);
                        }
                    }
                }
            }
            // 子索引清空即摘除，对应槽位归 None
            if leaf.primary_trie.as_ref().is_some_and(|t| t.is_empty()) {
                leaf.primary_trie = None;
            }
            if leaf.secondary_trie.as_ref().is_some_and(|t| t.is_empty()) {
                leaf.secondary_trie = None;
            }
            if leaf.primary_trie.is_none() && leaf.secondary_trie.is_none() {
                leaf.value_kinds &= !VK_STRING;
            }
        }
        value => {
            if let Some(value_key) = value.numeric_key() {
                if let Some(rbt) = leaf.primary_rbt.as_mut() {
                    let emptied = match rbt.find_mut(&value_key) {
                        Some(vl) => {
                            for &id in &rec.obj_ids {
                                vl.obj_ids.remove(id);
                            }
                            vl.obj_ids.is_empty()
                        }
                        None => false,
                    };
                    if emptied {
                        rbt.remove(&value_key);
                    }
                }
            }
            if leaf.primary_rbt.as_ref().is_some_and(|t| t.is_empty()) {
                leaf.primary_rbt = None;
            }
            if leaf.primary_rbt.is_none() && leaf.secondary_rbt.is_none() {
                leaf.value_kinds &= !VK_NUMERIC;
                leaf.numeric_kind = None;
            }
        }
    }

    // 四槽位全空 -> key leaf 本身摘除
    let empty = leaf.is_empty();
    if empty {
        tree.remove(key);
    }
}

fn add_ids(trie: &mut PrefixMap<ValueLeaf>, value: &[u8], ids: &[u64]) {
    if trie.get(value).is_none() {
        trie.insert(value, ValueLeaf::default());
    }
    let leaf = trie.get_mut(value).expect("leaf just ensured");
    for &id in ids {
        leaf.obj_ids.insert(id);
    }
}

fn remove_ids(trie: &mut PrefixMap<ValueLeaf>, value: &[u8], ids: &[u64]) {
    let emptied = match trie.get_mut(value) {
        Some(leaf) => {
            for &id in ids {
                leaf.obj_ids.remove(id);
            }
            leaf.obj_ids.is_empty()
        }
        None => false,
    };
    if emptied {
        trie.remove(value);
    }
}

fn contains_sub(hay: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || hay.windows(needle.len()).any(|w| w == needle)
}

fn collect_leaf(leaf: &ValueLeaf, out: &mut Vec<u64>) {
    out.extend(leaf.obj_ids.iter());
}

/// 对单个命中的 key leaf 求值 value 模式：
/// 引号 -> 字符串子索引，数字/范围 -> 数值子索引，两边都不是 -> 零贡献。
fn eval_value(leaf: &KeyLeaf, v_tok: &str, mode: SuffixMode, out: &mut Vec<u64>) {
    if is_quoted(v_tok) {
        let stripped = strip_quotes(v_tok);
        let (kind, tok) = classify(stripped);
        eval_string_value(leaf, kind, &tok, mode, out);
    } else if let Some(num_kind) = leaf.numeric_kind {
        if let Some(expr) = parse_range(v_tok, num_kind) {
            eval_numeric_value(leaf, &expr, out);
        }
    }
}

fn eval_string_value(
    leaf: &KeyLeaf,
    kind: PatternKind,
    tok: &str,
    mode: SuffixMode,
    out: &mut Vec<u64>,
) {
    match kind {
        PatternKind::Exact => {
            if let Some(trie) = leaf.primary_trie.as_ref() {
                if let Some(vl) = trie.get(tok.as_bytes()) {
                    collect_leaf(vl, out);
                }
            }
        }
        PatternKind::Prefix => {
            if let Some(trie) = leaf.primary_trie.as_ref() {
                for (_, vl) in trie.iter_prefix(tok.as_bytes()) {
                    collect_leaf(vl, out);
                }
            }
        }
        PatternKind::Suffix => match mode {
            SuffixMode::Reverse => {
                if let Some(trie) = leaf.secondary_trie.as_ref() {
                    let reversed: String = tok.chars().rev().collect();
                    for (_, vl) in trie.iter_prefix(reversed.as_bytes()) {
                        collect_leaf(vl, out);
                    }
                }
            }
            SuffixMode::Exhaustive => {
                if let Some(trie) = leaf.secondary_trie.as_ref() {
                    if let Some(vl) = trie.get(tok.as_bytes()) {
                        collect_leaf(vl, out);
                    }
                }
                if let Some(trie) = leaf.primary_trie.as_ref() {
                    if let Some(vl) = trie.get(tok.as_bytes()) {
                        collect_leaf(vl, out);
                    }
                }
            }
        },
        PatternKind::Infix => match mode {
            // 全扫 + 字面包含过滤
            SuffixMode::Reverse => {
                if let Some(trie) = leaf.primary_trie.as_ref() {
                    for (val, vl) in trie.iter() {
                        if contains_sub(val, tok.as_bytes()) {
                            collect_leaf(vl, out);
                        }
                    }
                }
            }
            SuffixMode::Exhaustive => {
                if let Some(trie) = leaf.secondary_trie.as_ref() {
                    for (_, vl) in trie.iter_prefix(tok.as_bytes()) {
                        collect_leaf(vl, out);
                    }
                }
                if let Some(trie) = leaf.primary_trie.as_ref() {
                    for (_, vl) in trie.iter_prefix(tok.as_bytes()) {
                        collect_leaf(vl, out);
                    }
                }
            }
        },
    }
}

fn eval_numeric_value(leaf: &KeyLeaf, expr: &RangeExpr, out: &mut Vec<u64>) {
    let Some(rbt) = leaf.primary_rbt.as_ref() else {
        return;
    };
    match expr {
        RangeExpr::Exact(k) => {
            if let Some(vl) = rbt.find(k) {
                collect_leaf(vl, out);
            }
        }
        RangeExpr::Range { lo, hi } => {
            let lo_bytes = lo.as_ref().map(|(k, _)| &k[..]);
            let hi_bytes = hi.as_ref().map(|(k, _)| &k[..]);
            let lo_inclusive = lo.as_ref().map(|&(_, i)| i).unwrap_or(true);
            let hi_inclusive = hi.as_ref().map(|&(_, i)| i).unwrap_or(true);
            rbt.range_for_each(lo_bytes, hi_bytes, lo_inclusive, hi_inclusive, &mut |_, vl| {
                collect_leaf(vl, out)
            });
        }
    }
}
