//! 会话开始前的失败分类（thiserror）
//!
//! 仅这些错误会作为硬失败抛给调用方，且都发生在任何探测之前；
//! 探测本身的失败属于预期结果，以 `SearchOutcome::Aborted` 表达。

use thiserror::Error;

/// 准备阶段错误：永不重试，直接终止
#[derive(Debug, Error)]
pub enum SetupError {
    /// 输入缓冲为空（前置条件违规）
    #[error("input buffer is empty")]
    EmptyBuffer,

    /// 引擎不可用（可执行文件缺失、初始化失败等），对所有探测永久生效
    #[error("detector unavailable: {0}")]
    DetectorUnavailable(String),

    /// 平台能力缺失（例如实时防护未开启）
    #[error("required platform capability missing: {0}")]
    CapabilityMissing(String),

    /// 当前平台不支持所选引擎
    #[error("engine `{0}` is not supported on this platform")]
    PlatformUnsupported(&'static str),
}
