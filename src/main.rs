//! # Replay Insight - 命令行入口点
//!
//! 核心逻辑位于 `lib.rs`，这里只负责启动。

fn main() -> std::process::ExitCode {
    replay_insight::run()
}
