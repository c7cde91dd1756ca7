//! 探测能力契约
//!
//! 各引擎适配器彼此独立，仅通过本接口接入核心；可用性检查与
//! 原生会话资源（句柄、临时目录）均由适配器自行持有和释放。

use crate::outcome::ScanOutcome;

/// 判定一段字节是否触发检测的能力接口
///
/// 契约：
/// - 允许阻塞至适配器自定的时限；
/// - 必须可对同一份数据的不同长度前缀反复调用；
/// - `NotFound` / `Timeout` / `Error` 为局部终止态，核心不会重试；
/// - 若需要将数据落盘供引擎读取，临时文件的创建与各退出路径上的
///   删除全部由适配器负责，核心不参与。
pub trait Detector {
    /// 引擎名称（仅用于展示与日志）
    fn engine_name(&self) -> &str;

    /// 对一段字节做一次探测
    fn scan(&mut self, data: &[u8]) -> ScanOutcome;
}
