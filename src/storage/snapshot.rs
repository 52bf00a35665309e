use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dart::space::{DartInfo, DartSpace};
use crate::index::idioms::{Idioms, KeyLeaf, TreeKind, ValueLeaf};
use crate::index::rbtree::{NumKind, RbTree};
use crate::index::trie::PrefixMap;

/// 索引 dump 文件 header
const MAGIC: u32 = 0x3158_4454; // "TDX1"
const VERSION: u32 = 1;
const STATE_COMMITTED: u32 = 0x0000_0001;
const HEADER_SIZE: usize = 4 + 4 + 4 + 4 + 4; // magic + version + state + data_len + checksum

/// 轻量完整性校验（非加密），发现截断/随机位翻转即可。
fn rolling_checksum(data: &[u8]) -> u32 {
    let mut s: u32 = 0;
    for &b in data {
        s = s.wrapping_add(b as u32);
        s = s.rotate_left(3);
    }
    s
}

/// 一个值叶：值（串字节或 8 字节数值编码）+ 它的 obj_id 列表。
#[derive(Clone, Debug, Serialize, Deserialize)]
struct ValueDump {
    key: Vec<u8>,
    obj_ids: Vec<u64>,
}

/// 一个 key leaf 的全部内容，按子索引槽位展开。
#[derive(Clone, Debug, Serialize, Deserialize)]
struct KeyDump {
    key: Vec<u8>,
    value_kinds: u8,
    numeric_kind: Option<NumKind>,
    primary_trie: Option<Vec<ValueDump>>,
    secondary_trie: Option<Vec<ValueDump>>,
    primary_rbt: Option<Vec<ValueDump>>,
    secondary_rbt: Option<Vec<ValueDump>>,
}

/// 单个 (tree, server, vnode) 文件的载荷。
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct VnodeDump {
    keys: Vec<KeyDump>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RecoverStats {
    pub files_loaded: usize,
    pub files_missing: usize,
    pub keys_restored: usize,
}

/// 按 (tree kind, server, vnode) 切分的索引快照目录。
///
/// 落盘协议与加载校验：header(magic/version/state/len/checksum) +
/// bincode body，tmp 写入 + fsync + rename 原子替换 + fsync(dir)。
/// 任何校验不一致在加载时都按"无数据"处理，只留 warn。
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn index_file(&self, kind: TreeKind, server_id: u64, vnode_id: u64) -> PathBuf {
        let base = match kind {
            TreeKind::Prefix => "idioms_prefix",
            TreeKind::Suffix => "idioms_suffix",
        };
        self.dir.join(format!("{base}_{server_id}_{vnode_id}.bin"))
    }

    fn dart_info_file(&self) -> PathBuf {
        self.dir.join("dart_info.bin")
    }

    /// 深度优先导出两棵键索引，key leaf 按归属 vnode 分组，一组一文件。
    /// server 0 额外落一份全局 DART 配置。返回写出的索引文件数。
    pub fn dump(&self, engine: &Idioms, space: &DartSpace) -> anyhow::Result<usize> {
        fs::create_dir_all(&self.dir)?;
        let server_id = engine.server_id;
        let mut files_written = 0usize;

        for kind in [TreeKind::Prefix, TreeKind::Suffix] {
            let mut groups: HashMap<u64, VnodeDump> = HashMap::new();
            for (key, leaf) in engine.tree(kind).iter() {
                groups
                    .entry(leaf.vnode_id)
                    .or_default()
                    .keys
                    .push(dump_key_leaf(key, leaf));
            }
            for (vnode_id, dump) in groups {
                let path = self.index_file(kind, server_id, vnode_id);
                self.write_atomic(&path, &dump)?;
                files_written += 1;
            }
        }

        if server_id == 0 {
            self.write_atomic(&self.dart_info_file(), &space.info())?;
        }
        tracing::info!(
            "Index dump complete: server={} files={}",
            server_id,
            files_written
        );
        Ok(files_written)
    }

    pub fn load_dart_info(&self) -> anyhow::Result<Option<DartInfo>> {
        self.read_valid(&self.dart_info_file())
    }

    /// 重建本 server 拥有的全部 vnode：对每个 vnode 尝试加载每个 server
    /// 当年写出的文件。文件缺失是常态（该 (server, vnode) 无数据），
    /// 不是错误。数据按 dump 原样重建，不重算 DART 路由。
    pub fn recover(
        &self,
        engine: &mut Idioms,
        space: &DartSpace,
        server_id: u64,
    ) -> anyhow::Result<RecoverStats> {
        let mut stats = RecoverStats::default();
        for &vid in space.vnodes_owned_by(server_id).iter() {
            for sid in 0..space.num_server {
                for kind in [TreeKind::Prefix, TreeKind::Suffix] {
                    let path = self.index_file(kind, sid, vid);
                    match self.read_valid::<VnodeDump>(&path)? {
                        None => stats.files_missing += 1,
                        Some(dump) => {
                            stats.files_loaded += 1;
                            for kd in &dump.keys {
                                restore_key(engine, kind, vid, kd);
                                stats.keys_restored += 1;
                            }
                        }
                    }
                }
            }
        }
        tracing::info!(
            "Index recover complete: server={} loaded={} missing={} keys={}",
            server_id,
            stats.files_loaded,
            stats.files_missing,
            stats.keys_restored
        );
        Ok(stats)
    }

    fn write_atomic<T: Serialize>(&self, path: &Path, payload: &T) -> anyhow::Result<()> {
        let body = bincode::serialize(payload)?;
        let data_len: u32 = body
            .len()
            .try_into()
            .map_err(|_| anyhow::anyhow!("dump body too large (>{} bytes)", u32::MAX))?;

        let tmp = path.with_extension("bin.tmp");
        let mut file = File::create(&tmp)?;
        let mut header = [0u8; HEADER_SIZE];
        header[0..4].copy_from_slice(&MAGIC.to_le_bytes());
        header[4..8].copy_from_slice(&VERSION.to_le_bytes());
        header[8..12].copy_from_slice(&STATE_COMMITTED.to_le_bytes());
        header[12..16].copy_from_slice(&data_len.to_le_bytes());
        header[16..20].copy_from_slice(&rolling_checksum(&body).to_le_bytes());
        file.write_all(&header)?;
        file.write_all(&body)?;
        file.sync_all()?;

        // rename 原子替换 + fsync(dir) 保证目录项落盘
        fs::rename(&tmp, path)?;
        if let Some(parent) = path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }
        Ok(())
    }

    fn read_valid<T: for<'de> Deserialize<'de>>(&self, path: &Path) -> anyhow::Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read(path)?;
        if data.len() < HEADER_SIZE {
            tracing::warn!("Dump file {:?} too small, ignoring", path);
            return Ok(None);
        }

        let magic = u32::from_le_bytes(data[0..4].try_into().expect("slice len checked"));
        let version = u32::from_le_bytes(data[4..8].try_into().expect("slice len checked"));
        let state = u32::from_le_bytes(data[8..12].try_into().expect("slice len checked"));
        let data_len = u32::from_le_bytes(data[12..16].try_into().expect("slice len checked"));
        let stored_checksum = u32::from_le_bytes(data[16..20].try_into().expect("slice len checked"));

        if magic != MAGIC || version != VERSION {
            tracing::warn!("Dump file {:?} magic/version mismatch, ignoring", path);
            return Ok(None);
        }
        if state != STATE_COMMITTED {
            tracing::warn!("Dump file {:?} not committed, ignoring", path);
            return Ok(None);
        }
        let body = &data[HEADER_SIZE..];
        if body.len() != data_len as usize {
            tracing::warn!("Dump file {:?} length mismatch, ignoring", path);
            return Ok(None);
        }
        if rolling_checksum(body) != stored_checksum {
            tracing::warn!("Dump file {:?} checksum mismatch, ignoring", path);
            return Ok(None);
        }

        match bincode::deserialize(body) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                tracing::warn!("Dump file {:?} deserialize failed: {}", path, e);
                Ok(None)
            }
        }
    }
}

fn dump_trie(trie: &PrefixMap<ValueLeaf>) -> Vec<ValueDump> {
    trie.iter()
        .map(|(k, vl)| ValueDump {
            key: k.to_vec(),
            obj_ids: vl.obj_ids.iter().collect(),
        })
        .collect()
}

fn dump_rbt(rbt: &RbTree<ValueLeaf>) -> Vec<ValueDump> {
    let mut out = Vec::new();
    rbt.for_each(&mut |k, vl| {
        out.push(ValueDump {
            key: k.to_vec(),
            obj_ids: vl.obj_ids.iter().collect(),
        })
    });
    out
}

fn dump_key_leaf(key: &[u8], leaf: &KeyLeaf) -> KeyDump {
    KeyDump {
        key: key.to_vec(),
        value_kinds: leaf.value_kinds,
        numeric_kind: leaf.numeric_kind,
        primary_trie: leaf.primary_trie.as_ref().map(dump_trie),
        secondary_trie: leaf.secondary_trie.as_ref().map(dump_trie),
        primary_rbt: leaf.primary_rbt.as_ref().map(dump_rbt),
        secondary_rbt: leaf.secondary_rbt.as_ref().map(dump_rbt),
    }
}

fn restore_key(engine: &mut Idioms, kind: TreeKind, vnode_id: u64, kd: &KeyDump) {
    if let Some(values) = &kd.primary_trie {
        for v in values {
            engine.restore_string_value(kind, &kd.key, vnode_id, false, &v.key, &v.obj_ids);
        }
    }
    if let Some(values) = &kd.secondary_trie {
        for v in values {
            engine.restore_string_value(kind, &kd.key, vnode_id, true, &v.key, &v.obj_ids);
        }
    }
    if let Some(num_kind) = kd.numeric_kind {
        if let Some(values) = &kd.primary_rbt {
            for v in values {
                engine.restore_numeric_value(kind, &kd.key, vnode_id, num_kind, false, &v.key, &v.obj_ids);
            }
        }
        if let Some(values) = &kd.secondary_rbt {
            for v in values {
                engine.restore_numeric_value(kind, &kd.key, vnode_id, num_kind, true, &v.key, &v.obj_ids);
            }
        }
    }
}
