use serde::{Deserialize, Serialize};

/// 单个物理 server 的负载描述，插入路径上做 two-choice 抉择用。
/// 由调用方注入，本层不持久化。
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ServerLoad {
    pub id: u64,
    pub indexed_word_count: i64,
    pub request_count: i64,
}

/// 负载信息来源。生产环境走 RPC/本地统计，测试里注入固定值。
pub trait ServerInfoProvider {
    fn server_info(&self, server_id: u64) -> ServerLoad;
}

/// 固定负载表（测试/仿真用）。
pub struct FixedLoads(pub Vec<i64>);

impl ServerInfoProvider for FixedLoads {
    fn server_info(&self, server_id: u64) -> ServerLoad {
        ServerLoad {
            id: server_id,
            indexed_word_count: self.0.get(server_id as usize).copied().unwrap_or(0),
            request_count: 0,
        }
    }
}
