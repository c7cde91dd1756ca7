//! 引擎适配器集合
//!
//! 每个适配器独立实现 `Detector`：自行做可用性检查、自行持有
//! 原生会话资源与临时落盘目录。核心对适配器内部一无所知。

mod proc;
pub mod scratch;

pub mod clamav;
#[cfg(windows)]
pub mod amsi;
#[cfg(windows)]
pub mod defender;

pub use clamav::ClamavDetector;
#[cfg(windows)]
pub use amsi::AmsiDetector;
#[cfg(windows)]
pub use defender::DefenderDetector;

use crate::detector::Detector;
use crate::error::SetupError;
use crate::options::{AdapterOptions, EngineKind};

/// 按引擎类型构造适配器
///
/// 可用性检查在此处一次性完成并永久生效：失败即 `SetupError`，
/// 不会推迟到单次探测时再报。
pub fn build_detector(
    kind: EngineKind,
    opts: &AdapterOptions,
) -> Result<Box<dyn Detector>, SetupError> {
    match kind {
        EngineKind::Clamav => Ok(Box::new(ClamavDetector::new(opts)?)),
        #[cfg(windows)]
        EngineKind::Defender => Ok(Box::new(DefenderDetector::new(opts)?)),
        #[cfg(windows)]
        EngineKind::Amsi => Ok(Box::new(AmsiDetector::new()?)),
        #[cfg(not(windows))]
        EngineKind::Defender => Err(SetupError::PlatformUnsupported("defender")),
        #[cfg(not(windows))]
        EngineKind::Amsi => Err(SetupError::PlatformUnsupported("amsi")),
    }
}
