//! 公开 API 层的会话级测试
//!
//! 用脚本化探测器替代真实引擎：不拉进程、不依赖本机装了什么杀软，
//! 只验证核心的收敛行为与临时产物生命周期。

use sigslice_core::adapters::scratch::ScratchDir;
use sigslice_core::{
    hex_region_lines, BoundarySearchEngine, Detector, ProbeFailureKind, ScanOutcome, ScanStatus,
    SearchOutcome,
};

/// 会把每次探测落盘再判定的脚本化探测器（模拟进程调用型适配器）
struct DiskBackedDetector<F: FnMut(usize) -> ScanStatus> {
    scratch: ScratchDir,
    judge: F,
    probes: usize,
}

impl<F: FnMut(usize) -> ScanStatus> DiskBackedDetector<F> {
    fn new(judge: F) -> Self {
        Self {
            scratch: ScratchDir::new().expect("create scratch dir"),
            judge,
            probes: 0,
        }
    }

    fn artifact_count(&self) -> usize {
        std::fs::read_dir(self.scratch.path())
            .map(|rd| rd.count())
            .unwrap_or(0)
    }
}

impl<F: FnMut(usize) -> ScanStatus> Detector for DiskBackedDetector<F> {
    fn engine_name(&self) -> &str {
        "disk-backed"
    }

    fn scan(&mut self, data: &[u8]) -> ScanOutcome {
        self.probes += 1;
        // 与真实适配器同样的产物生命周期：探测前写入，返回前删除
        let path = self.scratch.write_probe("testfile", data).expect("write probe");
        let status = (self.judge)(data.len());
        self.scratch.remove_probe(&path);
        ScanOutcome::status(status)
    }
}

#[test]
fn isolates_monotonic_boundary_and_dumps_region() {
    let n = 1000usize;
    let k = 640usize;
    let buf: Vec<u8> = (0..n).map(|i| (i % 251) as u8).collect();
    let mut detector = DiskBackedDetector::new(move |len| {
        if len >= k {
            ScanStatus::ThreatFound
        } else {
            ScanStatus::NoThreat
        }
    });

    let mut out = Vec::new();
    let report = BoundarySearchEngine::new()
        .run(&buf, &mut detector, &mut out)
        .expect("session runs");

    assert_eq!(
        report.outcome,
        SearchOutcome::Isolated { boundary: 640, signature: None }
    );
    assert_eq!(report.probes_issued, 23);
    assert_eq!(detector.probes, 23);
    // 探测产物全部清理完毕
    assert_eq!(detector.artifact_count(), 0);

    // 命中报告包含边界行与边界前 256 字节的十六进制区域
    let text = String::from_utf8(out).expect("utf8 output");
    assert!(text.contains("Target file size: 1000 bytes"));
    assert!(text.contains("Identified end of bad bytes at offset 0x280"));
    let expected_first_row = hex_region_lines(&buf[640 - 256..640], 640)
        .into_iter()
        .next()
        .expect("region is non-empty");
    assert!(text.contains(&expected_first_row));
    // 区域起始偏移 = 640 - 256 = 0x180
    assert!(expected_first_row.starts_with("00000180   "));
}

#[test]
fn timeout_mid_session_aborts_and_leaves_no_artifacts() {
    let buf = vec![0u8; 1000];
    let mut calls = 0usize;
    let mut detector = DiskBackedDetector::new(move |_| {
        calls += 1;
        match calls {
            1 => ScanStatus::ThreatFound,
            _ => ScanStatus::Timeout,
        }
    });

    let mut out = Vec::new();
    let report = BoundarySearchEngine::new()
        .run(&buf, &mut detector, &mut out)
        .expect("session runs");

    assert_eq!(
        report.outcome,
        SearchOutcome::Aborted { kind: ProbeFailureKind::Timeout }
    );
    // 第二次探测后立即中止，没有第三次
    assert_eq!(detector.probes, 2);
    // 超时那次的产物也被删除
    assert_eq!(detector.artifact_count(), 0);

    let text = String::from_utf8(out).expect("utf8 output");
    assert!(text.contains("Scan aborted: probe timed out"));
}

#[test]
fn identical_sessions_yield_identical_outcomes() {
    let buf: Vec<u8> = (0..512).map(|i| (i * 7 % 256) as u8).collect();
    let run_once = || {
        let mut detector = DiskBackedDetector::new(|len| {
            if len >= 200 {
                ScanStatus::ThreatFound
            } else {
                ScanStatus::NoThreat
            }
        });
        let mut out = Vec::new();
        let report = BoundarySearchEngine::new()
            .run(&buf, &mut detector, &mut out)
            .expect("session runs");
        (report.outcome, report.probes_issued, out)
    };

    let first = run_once();
    let second = run_once();
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
    assert_eq!(first.2, second.2);
}

#[test]
fn boundary_in_first_256_bytes_dumps_from_file_start() {
    // 边界小于 256 时，展示区域从文件头开始
    let n = 300usize;
    let k = 100usize;
    let buf: Vec<u8> = (0..n).map(|i| (i % 256) as u8).collect();
    let mut detector = DiskBackedDetector::new(move |len| {
        if len >= k {
            ScanStatus::ThreatFound
        } else {
            ScanStatus::NoThreat
        }
    });

    let mut out = Vec::new();
    let report = BoundarySearchEngine::new()
        .run(&buf, &mut detector, &mut out)
        .expect("session runs");

    let boundary = match report.outcome {
        SearchOutcome::Isolated { boundary, .. } => boundary,
        other => panic!("unexpected outcome {other:?}"),
    };
    assert!(boundary == k || boundary == k + 1);

    let text = String::from_utf8(out).expect("utf8 output");
    // 区域覆盖 [0, boundary)，首行偏移为 0
    assert!(text.contains("\n00000000   "));
}
