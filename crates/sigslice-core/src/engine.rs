//! 边界搜索状态机（核心）
//!
//! 每个会话对应一份缓冲：先对整体做一次探测确认恶意，然后进入
//! 前缀长度二分循环。区间下界 `lower_bound` 只会因“确认干净”的
//! 探测而上移；增长转移的上锚固定取原始整体长度（首个探测已确认
//! 其为阳性）。检测若非长度单调，循环仍会在同样的收敛条件下按
//! O(log N) 次探测终止，只是报告“恶意但未定位边界”而非给出伪边界。

use std::io::Write;

use anyhow::Result;
use tracing::debug;

use crate::detector::Detector;
use crate::error::SetupError;
use crate::hexdump::hex_region_lines;
use crate::options::SessionReport;
use crate::outcome::{ProbeFailureKind, ScanOutcome, ScanStatus, SearchOutcome};

/// 命中后展示的区域上限（边界前至多这么多字节）
const HEX_REGION_MAX: usize = 256;

/// 一次会话的可变搜索状态（仅引擎内部可见，随会话结束丢弃）
struct SearchState {
    /// 已确认不触发检测的最大前缀长度；从 0 起单调不减
    lower_bound: usize,
    /// 即将探测的前缀长度；恒满足 lower_bound ≤ probe_len ≤ len
    probe_len: usize,
}

/// 二分边界搜索引擎
///
/// 同一实例可依次跑多个会话；会话之间不共享任何状态。
pub struct BoundarySearchEngine;

impl BoundarySearchEngine {
    pub fn new() -> Self {
        Self
    }

    /// 跑完一个会话：从整体探测到终态
    ///
    /// 人读的结果行写入 `out`；逐探测的细节仅以 debug 日志输出。
    /// 空缓冲在任何探测之前即拒绝；探测失败不作为 Err 抛出，而是
    /// 以 `SearchOutcome::Aborted` 作为会话终态返回。
    pub fn run(
        &self,
        buf: &[u8],
        detector: &mut dyn Detector,
        out: &mut dyn Write,
    ) -> Result<SessionReport> {
        if buf.is_empty() {
            return Err(SetupError::EmptyBuffer.into());
        }

        let mut probes = 0usize;
        writeln!(out, "Target file size: {} bytes", buf.len())?;

        // 初始转移：整体探测一次
        let first = Self::probe(detector, buf, &mut probes);
        match first.status {
            ScanStatus::NoThreat => {
                writeln!(out, "No threat found!")?;
                return Ok(SessionReport {
                    outcome: SearchOutcome::NotMalicious,
                    probes_issued: probes,
                });
            }
            ScanStatus::ThreatFound => {}
            other => return Self::abort(out, other, probes),
        }
        // 整体探测给出的签名名，留作命中时的兜底展示
        let full_sig = first.signature;

        let mut state = SearchState {
            lower_bound: 0,
            probe_len: buf.len() / 2,
        };

        loop {
            let outcome = Self::probe(detector, &buf[..state.probe_len], &mut probes);
            match outcome.status {
                ScanStatus::ThreatFound => {
                    let cand = (state.probe_len - state.lower_bound) / 2 + state.lower_bound;
                    if state.probe_len == cand + 1 {
                        // 区间收缩到位：当前前缀长度即边界
                        let boundary = state.probe_len;
                        let signature = outcome.signature.or(full_sig);
                        Self::report_isolated(out, buf, boundary, signature.as_deref())?;
                        return Ok(SessionReport {
                            outcome: SearchOutcome::Isolated { boundary, signature },
                            probes_issued: probes,
                        });
                    }
                    state.probe_len = cand;
                }
                ScanStatus::NoThreat => {
                    state.lower_bound = state.probe_len;
                    // 增长转移：上锚固定为原始整体长度（见模块注释）
                    let cand = (buf.len() - state.probe_len) / 2 + state.probe_len;
                    if cand == buf.len() - 1 {
                        writeln!(out, "File is malicious, but couldn't identify bad bytes")?;
                        return Ok(SessionReport {
                            outcome: SearchOutcome::MaliciousUnisolated,
                            probes_issued: probes,
                        });
                    }
                    state.probe_len = cand;
                }
                other => return Self::abort(out, other, probes),
            }
        }
    }

    /// 发起一次探测并计数
    fn probe(detector: &mut dyn Detector, data: &[u8], probes: &mut usize) -> ScanOutcome {
        *probes += 1;
        debug!(engine = detector.engine_name(), len = data.len(), "testing prefix");
        let outcome = detector.scan(data);
        debug!(status = ?outcome.status, "probe finished");
        outcome
    }

    /// 探测失败：立即中止，不重试，不产出部分结果
    fn abort(out: &mut dyn Write, status: ScanStatus, probes: usize) -> Result<SessionReport> {
        // from_status 对非正常状态恒有值；兜底按引擎错误处理
        let kind = ProbeFailureKind::from_status(status).unwrap_or(ProbeFailureKind::EngineError);
        writeln!(out, "Scan aborted: {kind}")?;
        Ok(SessionReport {
            outcome: SearchOutcome::Aborted { kind },
            probes_issued: probes,
        })
    }

    /// 命中报告：边界偏移 + 边界前至多 256 字节的十六进制展示
    fn report_isolated(
        out: &mut dyn Write,
        buf: &[u8],
        boundary: usize,
        signature: Option<&str>,
    ) -> Result<()> {
        writeln!(out, "Identified end of bad bytes at offset 0x{boundary:X}")?;
        if let Some(sig) = signature {
            writeln!(out, "Signature: {sig}")?;
        }
        let window = boundary.min(HEX_REGION_MAX);
        for line in hex_region_lines(&buf[boundary - window..boundary], boundary) {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}

impl Default for BoundarySearchEngine {
    fn default() -> Self {
        Self::new()
    }
}
