use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::SuffixMode;
use crate::dart::load::{ServerInfoProvider, ServerLoad};
use crate::index::idioms::{IdxRecord, Idioms, TagValue};
use crate::stats::IndexStats;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpType {
    Insert,
    Delete,
    ExactQuery,
    PrefixQuery,
    SuffixQuery,
    InfixQuery,
    RangeQuery,
}

impl OpType {
    pub fn is_write(self) -> bool {
        matches!(self, OpType::Insert | OpType::Delete)
    }
}

/// 客户端路由算法选择。dispatch 只透传；路由本身发生在客户端。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgo {
    #[default]
    DartHash,
    DhtFullHash,
    DhtInitialHash,
}

/// 三个对象引用字段里哪一个是要入索引的 obj_id。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjRefType {
    #[default]
    PrimaryId,
    SecondaryId,
    ServerId,
}

/// 单 server 一次索引操作的请求封皮（RPC 边界的本地等价物）。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub op_type: OpType,
    #[serde(default)]
    pub hash_algo: HashAlgo,
    /// 写操作：属性 key token；查询：完整 `key_pattern=value_pattern`
    pub attr_key: String,
    #[serde(default)]
    pub attr_val: Option<TagValue>,
    #[serde(default)]
    pub obj_ref_type: ObjRefType,
    #[serde(default)]
    pub obj_primary_ref: u64,
    #[serde(default)]
    pub obj_secondary_ref: u64,
    #[serde(default)]
    pub obj_server_ref: u64,
    #[serde(default)]
    pub vnode_id: u64,
    #[serde(default)]
    pub inserting_suffix: bool,
    #[serde(default)]
    pub src_client_id: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DispatchResponse {
    pub success: bool,
    pub n_items: u64,
    pub obj_ids: Vec<u64>,
}

impl DispatchResponse {
    fn ok_empty() -> Self {
        Self {
            success: true,
            n_items: 0,
            obj_ids: Vec::new(),
        }
    }

    fn failed() -> Self {
        Self {
            success: false,
            n_items: 0,
            obj_ids: Vec::new(),
        }
    }
}

/// 一个物理 server 的索引实例。
///
/// 引擎内部不做同步，这里的粗粒度互斥是唯一的并发边界：
/// create/delete/search/dump/recover 全程持锁（结构性修改与级联拆除
/// 不允许并发交错）。
pub struct IndexServer {
    engine: Mutex<Idioms>,
}

impl IndexServer {
    pub fn new(server_id: u64, num_servers: u64, suffix_mode: SuffixMode) -> Self {
        Self {
            engine: Mutex::new(Idioms::new(server_id, num_servers, suffix_mode)),
        }
    }

    /// RPC dispatch 等价入口：按 op 分派到引擎。
    pub fn perform(&self, req: &DispatchRequest) -> DispatchResponse {
        match req.op_type {
            OpType::Insert | OpType::Delete => {
                let Some(value) = req.attr_val.clone() else {
                    tracing::warn!("{:?} without attr_val rejected", req.op_type);
                    return DispatchResponse::failed();
                };
                let obj_id = match req.obj_ref_type {
                    ObjRefType::PrimaryId => req.obj_primary_ref,
                    ObjRefType::SecondaryId => req.obj_secondary_ref,
                    ObjRefType::ServerId => req.obj_server_ref,
                };
                let rec = IdxRecord {
                    key: req.attr_key.clone(),
                    value,
                    obj_ids: vec![obj_id],
                    is_key_suffix: req.inserting_suffix,
                    vnode_id: req.vnode_id,
                    src_client_id: req.src_client_id,
                };
                let mut engine = self.engine.lock();
                if req.op_type == OpType::Insert {
                    engine.create(&rec);
                } else {
                    engine.delete(&rec);
                }
                DispatchResponse::ok_empty()
            }
            _ => {
                let obj_ids = self.engine.lock().search(&req.attr_key);
                DispatchResponse {
                    success: true,
                    n_items: obj_ids.len() as u64,
                    obj_ids,
                }
            }
        }
    }

    pub fn server_load(&self) -> ServerLoad {
        self.engine.lock().server_load()
    }

    pub fn stats(&self) -> IndexStats {
        self.engine.lock().stats()
    }

    /// 维护操作（dump/recover）与请求共用同一把锁。
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut Idioms) -> R) -> R {
        let mut engine = self.engine.lock();
        f(&mut engine)
    }
}

/// 同进程多 server 集群（测试与仿真）。同时充当插入路径的负载来源。
pub struct LocalCluster {
    pub servers: Vec<Arc<IndexServer>>,
}

impl LocalCluster {
    pub fn new(num_servers: u64, suffix_mode: SuffixMode) -> Self {
        let servers = (0..num_servers)
            .map(|sid| Arc::new(IndexServer::new(sid, num_servers, suffix_mode)))
            .collect();
        Self { servers }
    }
}

impl ServerInfoProvider for LocalCluster {
    fn server_info(&self, server_id: u64) -> ServerLoad {
        match self.servers.get(server_id as usize) {
            Some(s) => s.server_load(),
            None => ServerLoad::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dart::router::DartOp;
    use crate::dart::space::DartSpace;

    fn insert_via_dart(
        space: &DartSpace,
        cluster: &LocalCluster,
        key: &str,
        value: TagValue,
        obj_id: u64,
    ) {
        for hit in space.dart_hash(key, DartOp::Insert, Some(cluster)) {
            let req = DispatchRequest {
                op_type: OpType::Insert,
                hash_algo: HashAlgo::DartHash,
                attr_key: hit.token.clone(),
                attr_val: Some(value.clone()),
                obj_ref_type: ObjRefType::PrimaryId,
                obj_primary_ref: obj_id,
                obj_secondary_ref: 0,
                obj_server_ref: 0,
                vnode_id: hit.vnode_id,
                inserting_suffix: hit.is_suffix,
                src_client_id: 0,
            };
            let resp = cluster.servers[hit.server_id as usize].perform(&req);
            assert!(resp.success);
        }
    }

    fn delete_via_dart(
        space: &DartSpace,
        cluster: &LocalCluster,
        key: &str,
        value: TagValue,
        obj_id: u64,
    ) {
        for hit in space.dart_hash(key, DartOp::Delete, None) {
            let req = DispatchRequest {
                op_type: OpType::Delete,
                hash_algo: HashAlgo::DartHash,
                attr_key: hit.token.clone(),
                attr_val: Some(value.clone()),
                obj_ref_type: ObjRefType::PrimaryId,
                obj_primary_ref: obj_id,
                obj_secondary_ref: 0,
                obj_server_ref: 0,
                vnode_id: hit.vnode_id,
                inserting_suffix: hit.is_suffix,
                src_client_id: 0,
            };
            assert!(cluster.servers[hit.server_id as usize].perform(&req).success);
        }
    }

    /// 客户端视角的查询 fan-out：路由 -> 逐服查询 -> 合并去重。
    fn query_via_dart(
        space: &DartSpace,
        cluster: &LocalCluster,
        query: &str,
        op_type: OpType,
    ) -> Vec<u64> {
        let (token, dart_op) = space.determine_query_token(query);
        let mut out = Vec::new();
        for sid in space.route_query(&token, dart_op) {
            let req = DispatchRequest {
                op_type,
                hash_algo: HashAlgo::DartHash,
                attr_key: query.to_string(),
                attr_val: None,
                obj_ref_type: ObjRefType::PrimaryId,
                obj_primary_ref: 0,
                obj_secondary_ref: 0,
                obj_server_ref: 0,
                vnode_id: 0,
                inserting_suffix: false,
                src_client_id: 0,
            };
            let resp = cluster.servers[sid as usize].perform(&req);
            assert!(resp.success);
            out.extend(resp.obj_ids);
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    fn setup() -> (DartSpace, LocalCluster) {
        let space = DartSpace::new(3, 27, 0, 3, 0, SuffixMode::Reverse).unwrap();
        let cluster = LocalCluster::new(3, SuffixMode::Reverse);
        (space, cluster)
    }

    #[test]
    fn end_to_end_exact_query() {
        let (space, cluster) = setup();
        insert_via_dart(
            &space,
            &cluster,
            "key000key",
            TagValue::Str("\"val000val\"".to_string()),
            10,
        );
        insert_via_dart(
            &space,
            &cluster,
            "key433key",
            TagValue::Str("\"val433val\"".to_string()),
            30000,
        );

        let hits = query_via_dart(
            &space,
            &cluster,
            "key000key=\"val000val\"",
            OpType::ExactQuery,
        );
        assert_eq!(hits, vec![10]);
    }

    #[test]
    fn end_to_end_prefix_query() {
        let (space, cluster) = setup();
        insert_via_dart(
            &space,
            &cluster,
            "key000key",
            TagValue::Str("\"val000val\"".to_string()),
            10,
        );
        insert_via_dart(
            &space,
            &cluster,
            "key433key",
            TagValue::Str("\"val433val\"".to_string()),
            30000,
        );

        assert!(query_via_dart(&space, &cluster, "key01*=\"val01*\"", OpType::PrefixQuery).is_empty());
        assert_eq!(
            query_via_dart(&space, &cluster, "key00*=\"val00*\"", OpType::PrefixQuery),
            vec![10]
        );
    }

    #[test]
    fn end_to_end_suffix_and_infix() {
        let (space, cluster) = setup();
        insert_via_dart(
            &space,
            &cluster,
            "key000key",
            TagValue::Str("\"val000val\"".to_string()),
            10,
        );
        insert_via_dart(
            &space,
            &cluster,
            "key433key",
            TagValue::Str("\"val433val\"".to_string()),
            30000,
        );

        assert_eq!(
            query_via_dart(&space, &cluster, "*3key=\"*3val\"", OpType::SuffixQuery),
            vec![30000]
        );
        let infix = query_via_dart(&space, &cluster, "*43*=\"*43*\"", OpType::InfixQuery);
        assert_eq!(infix, vec![30000]);
    }

    #[test]
    fn end_to_end_delete_removes_all_replicas() {
        let (space, cluster) = setup();
        insert_via_dart(
            &space,
            &cluster,
            "key000key",
            TagValue::Str("\"val000val\"".to_string()),
            10,
        );
        delete_via_dart(
            &space,
            &cluster,
            "key000key",
            TagValue::Str("\"val000val\"".to_string()),
            10,
        );
        // round-robin 会轮换副本，两次都必须为空
        for _ in 0..2 {
            assert!(query_via_dart(
                &space,
                &cluster,
                "key000key=\"val000val\"",
                OpType::ExactQuery
            )
            .is_empty());
        }
    }

    #[test]
    fn end_to_end_numeric_range() {
        let (space, cluster) = setup();
        for v in 90..=99i64 {
            insert_via_dart(&space, &cluster, "intkey", TagValue::Int64(v), v as u64);
        }
        let hits = query_via_dart(&space, &cluster, "intkey=90|~|99", OpType::RangeQuery);
        assert_eq!(hits, (90..=99).collect::<Vec<u64>>());

        let hits = query_via_dart(&space, &cluster, "intkey=90~99", OpType::RangeQuery);
        assert_eq!(hits, (91..=98).collect::<Vec<u64>>());
    }

    #[test]
    fn insert_without_value_fails() {
        let cluster = LocalCluster::new(1, SuffixMode::Reverse);
        let req = DispatchRequest {
            op_type: OpType::Insert,
            hash_algo: HashAlgo::DartHash,
            attr_key: "k".to_string(),
            attr_val: None,
            obj_ref_type: ObjRefType::PrimaryId,
            obj_primary_ref: 1,
            obj_secondary_ref: 0,
            obj_server_ref: 0,
            vnode_id: 0,
            inserting_suffix: false,
            src_client_id: 0,
        };
        assert!(!cluster.servers[0].perform(&req).success);
    }

    #[test]
    fn obj_ref_type_selects_the_recorded_id() {
        let cluster = LocalCluster::new(1, SuffixMode::Reverse);
        let mut req = DispatchRequest {
            op_type: OpType::Insert,
            hash_algo: HashAlgo::DartHash,
            attr_key: "k".to_string(),
            attr_val: Some(TagValue::Str("\"v\"".to_string())),
            obj_ref_type: ObjRefType::SecondaryId,
            obj_primary_ref: 1,
            obj_secondary_ref: 2,
            obj_server_ref: 3,
            vnode_id: 0,
            inserting_suffix: false,
            src_client_id: 0,
        };
        cluster.servers[0].perform(&req);
        req.obj_ref_type = ObjRefType::ServerId;
        cluster.servers[0].perform(&req);

        let q = DispatchRequest {
            op_type: OpType::ExactQuery,
            attr_key: "k=\"v\"".to_string(),
            ..req.clone()
        };
        let mut ids = cluster.servers[0].perform(&q).obj_ids;
        ids.sort_unstable();
        assert_eq!(ids, vec![2, 3]);
    }
}
