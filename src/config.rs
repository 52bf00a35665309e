use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// 后缀索引策略（编译期开关改为运行时配置，见 DESIGN.md）。
///
/// - `Reverse`：suffix 树存整个 key 的反转串。每个 key 只占 1 条，
///   但 suffix 查询退化为反转前缀扫描。
/// - `Exhaustive`：路由层为每个 key 展开全部真后缀。每个 key 占
///   O(len) 条，换来 suffix 查询 O(1) 点查。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuffixMode {
    #[default]
    Reverse,
    Exhaustive,
}

/// 单个索引服务进程的配置（TOML 加载，CLI 可覆盖）。
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// 本进程的物理 server id，`[0, num_server)`
    pub server_id: u64,
    pub num_server: u64,
    /// DART 分区树每层分支数
    pub alphabet_size: u64,
    /// 在推导高度之上额外增加的层数
    pub extra_tree_height: u32,
    pub replication_factor: u32,
    /// 预留扩容上限；0 表示按 num_server 推导树高
    pub max_server_num_to_adapt: u64,
    pub suffix_mode: SuffixMode,
    pub data_dir: PathBuf,
    pub listen_port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server_id: 0,
            num_server: 1,
            alphabet_size: 27,
            extra_tree_height: 0,
            replication_factor: 3,
            max_server_num_to_adapt: 0,
            suffix_mode: SuffixMode::Reverse,
            data_dir: PathBuf::from("/tmp/tagdex"),
            listen_port: 6270,
        }
    }
}

impl ServiceConfig {
    /// 从 TOML 文件加载；文件不存在时返回默认配置（首次启动零配置可用）。
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::info!("Config {:?} not found, using defaults", path);
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let cfg: ServiceConfig = toml::from_str(&raw)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_single_server() {
        let c = ServiceConfig::default();
        assert_eq!(c.num_server, 1);
        assert_eq!(c.alphabet_size, 27);
        assert_eq!(c.suffix_mode, SuffixMode::Reverse);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: ServiceConfig = toml::from_str("num_server = 4\nserver_id = 2\n").unwrap();
        assert_eq!(cfg.num_server, 4);
        assert_eq!(cfg.server_id, 2);
        assert_eq!(cfg.replication_factor, 3);
        assert_eq!(cfg.suffix_mode, SuffixMode::Reverse);
    }

    #[test]
    fn suffix_mode_parses_snake_case() {
        let cfg: ServiceConfig = toml::from_str("suffix_mode = \"exhaustive\"").unwrap();
        assert_eq!(cfg.suffix_mode, SuffixMode::Exhaustive);
    }
}
