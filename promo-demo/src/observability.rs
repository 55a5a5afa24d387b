//! 日志初始化
//!
//! 通过 `RUST_LOG` 控制过滤级别，默认 `info`；重复调用为空操作。

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
