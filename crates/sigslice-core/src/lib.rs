//! 签名边界搜索核心库
//!
//! 设计要点：
//! - 核心是“前缀长度二分”状态机：对同一份字节缓冲反复提交不同长度的前缀，
//!   根据探测结果收缩区间，定位触发检测的字节边界。
//! - 探测能力抽象为 `Detector` 接口；具体引擎（进程调用型 / 系统 API 型）
//!   作为独立适配器实现，临时落盘产物的创建与清理由适配器自行负责。
//! - 会话内状态（SearchState）仅归本次调用独占，单线程同步执行，
//!   每次探测完整结束后才发起下一次，互不交叠。
//! - 终态以不可变的 `SearchOutcome` 一次性产出，中途不暴露可变标志位。

// 模块化拆分：每个关注点一个小模块，对外统一从 lib 导出
mod detector;
mod engine;
mod error;
mod hexdump;
mod ingest;
mod options;
mod outcome;

pub mod adapters;

// 对外暴露的稳定 API
pub use adapters::build_detector;
pub use detector::Detector;
pub use engine::BoundarySearchEngine;
pub use error::SetupError;
pub use hexdump::hex_region_lines;
pub use ingest::{fetch_url, list_dir_files, read_file};
pub use options::{AdapterOptions, EngineKind, SessionReport};
pub use outcome::{ProbeFailureKind, ScanOutcome, ScanStatus, SearchOutcome};
