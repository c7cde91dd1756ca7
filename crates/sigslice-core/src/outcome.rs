//! 探测与会话结果类型（对外暴露）

use std::fmt;

/// 单次探测的状态
/// - NoThreat / ThreatFound：正常判定结果，驱动二分转移。
/// - NotFound / Timeout / Error：局部终止态，核心不会重试，会话立即中止。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    NoThreat,
    ThreatFound,
    NotFound,
    Timeout,
    Error,
}

/// 单次探测的完整结果（不可变值）
/// 签名名称为尽力而为的附加信息，缺失不是错误。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub status: ScanStatus,
    pub signature: Option<String>,
}

impl ScanOutcome {
    /// 无附加签名的结果
    pub fn status(status: ScanStatus) -> Self {
        Self { status, signature: None }
    }

    /// 命中结果（可携带引擎给出的签名名）
    pub fn threat(signature: Option<String>) -> Self {
        Self { status: ScanStatus::ThreatFound, signature }
    }
}

/// 探测失败的分类（会话级终止原因）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeFailureKind {
    /// 探测产物在引擎侧不可见（例如临时文件缺失）
    NotFound,
    /// 超过适配器规定的单次探测时限
    Timeout,
    /// 引擎返回了无法归类的错误
    EngineError,
}

impl ProbeFailureKind {
    /// 从非正常状态映射失败分类；正常状态返回 None
    pub(crate) fn from_status(status: ScanStatus) -> Option<Self> {
        match status {
            ScanStatus::NotFound => Some(Self::NotFound),
            ScanStatus::Timeout => Some(Self::Timeout),
            ScanStatus::Error => Some(Self::EngineError),
            ScanStatus::NoThreat | ScanStatus::ThreatFound => None,
        }
    }
}

impl fmt::Display for ProbeFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "probe artifact not found by the engine"),
            Self::Timeout => write!(f, "probe timed out"),
            Self::EngineError => write!(f, "engine reported an error"),
        }
    }
}

/// 会话终态（每个会话恰好产出一次，不可变）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// 整体缓冲未触发检测
    NotMalicious,
    /// 成功定位边界：长度达到 boundary 的前缀开始触发检测
    Isolated {
        boundary: usize,
        signature: Option<String>,
    },
    /// 确认恶意，但区间收敛到末端仍未定位出边界（通常是检测非长度单调）
    MaliciousUnisolated,
    /// 某次探测失败，会话中止，不产出任何部分结果
    Aborted { kind: ProbeFailureKind },
}
