use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use tagdex::config::ServiceConfig;
use tagdex::dart::space::DartSpace;
use tagdex::query::dispatch::IndexServer;
use tagdex::query::server::QueryServer;
use tagdex::storage::snapshot::SnapshotStore;

#[derive(Parser)]
#[command(name = "tagdex", about = "Distributed object-tag index server")]
struct Cli {
    /// TOML 配置文件路径
    #[arg(long, default_value = "tagdex.toml")]
    config: PathBuf,

    /// 覆盖配置中的监听端口
    #[arg(long)]
    port: Option<u16>,

    /// 覆盖配置中的快照目录
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// 启动时从快照目录恢复本 server 拥有的 vnode
    #[arg(long)]
    recover: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut cfg = ServiceConfig::load_or_default(&cli.config)?;
    if let Some(port) = cli.port {
        cfg.listen_port = port;
    }
    if let Some(dir) = cli.data_dir {
        cfg.data_dir = dir;
    }

    info!(
        "Starting tagdex server {} of {} (alphabet={}, replication={}, suffix_mode={:?})",
        cfg.server_id, cfg.num_server, cfg.alphabet_size, cfg.replication_factor, cfg.suffix_mode
    );

    let space = Arc::new(DartSpace::new(
        cfg.num_server,
        cfg.alphabet_size,
        cfg.extra_tree_height,
        cfg.replication_factor,
        cfg.max_server_num_to_adapt,
        cfg.suffix_mode,
    )?);
    info!(
        "DART space: tree_height={} num_vnode={}",
        space.tree_height, space.num_vnode
    );

    let server = Arc::new(IndexServer::new(
        cfg.server_id,
        cfg.num_server,
        cfg.suffix_mode,
    ));
    let store = SnapshotStore::new(cfg.data_dir.clone());

    if cli.recover {
        // dump 出的 dart_info 优先于本地配置（保证同一套 vnode 划分）
        let recover_space = match store.load_dart_info()? {
            Some(stored) => Arc::new(DartSpace::from_info(&stored)),
            None => space.clone(),
        };
        let stats = server.with_engine(|engine| store.recover(engine, &recover_space, cfg.server_id))?;
        info!(
            "Recovered index: {} files, {} keys",
            stats.files_loaded, stats.keys_restored
        );
    }

    let query_server = QueryServer::new(server.clone(), space.clone(), store);
    let port = cfg.listen_port;
    tokio::spawn(query_server.run(port));

    info!("tagdex ready. Dispatch via: http://localhost:{}/dispatch", port);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    Ok(())
}
