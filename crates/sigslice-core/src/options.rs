//! 引擎选择、适配器参数与会话统计（模块）

use std::time::Duration;

use crate::outcome::SearchOutcome;

/// 可选的扫描引擎
/// - Clamav：进程调用型，跨平台（依赖本机安装 clamscan/clamdscan）。
/// - Defender：进程调用型，仅 Windows（MpCmdRun.exe）。
/// - Amsi：系统 API 型，仅 Windows（amsi.dll，要求实时防护开启）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Clamav,
    Defender,
    Amsi,
}

/// 适配器构造参数
#[derive(Debug, Clone)]
pub struct AdapterOptions {
    /// 单次探测时限（进程调用型适配器超时后杀进程并上报 Timeout）
    pub probe_timeout: Duration,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(30),
        }
    }
}

/// 单个会话的汇总（便于 CLI 打印与测试断言）
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// 会话终态
    pub outcome: SearchOutcome,
    /// 实际发起的探测次数（含整体缓冲的首次探测）
    pub probes_issued: usize,
}
