//! Windows Defender 适配器（进程调用型，仅 Windows）
//!
//! 构造时确认 MpCmdRun.exe 存在，缺失即永久失败。退出码约定：
//! 0 = 未命中，2 = 命中，其余 = 错误。

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use tracing::error;

use crate::adapters::proc::run_with_timeout;
use crate::adapters::scratch::ScratchDir;
use crate::detector::Detector;
use crate::error::SetupError;
use crate::options::AdapterOptions;
use crate::outcome::{ScanOutcome, ScanStatus};

const MPCMDRUN_PATH: &str = r"C:\Program Files\Windows Defender\MpCmdRun.exe";

pub struct DefenderDetector {
    mpcmdrun_path: PathBuf,
    scratch: ScratchDir,
    probe_timeout: Duration,
}

impl DefenderDetector {
    pub fn new(opts: &AdapterOptions) -> Result<Self, SetupError> {
        let mpcmdrun_path = PathBuf::from(MPCMDRUN_PATH);
        if !mpcmdrun_path.exists() {
            return Err(SetupError::DetectorUnavailable(format!(
                "MpCmdRun.exe not found at {MPCMDRUN_PATH}"
            )));
        }
        let scratch = ScratchDir::new()
            .map_err(|e| SetupError::DetectorUnavailable(format!("scratch dir: {e}")))?;
        Ok(Self {
            mpcmdrun_path,
            scratch,
            probe_timeout: opts.probe_timeout,
        })
    }

    fn scan_file(&self, path: &Path) -> ScanOutcome {
        if !path.exists() {
            return ScanOutcome::status(ScanStatus::NotFound);
        }

        let mut cmd = Command::new(&self.mpcmdrun_path);
        cmd.arg("-Scan")
            .arg("-ScanType")
            .arg("3")
            .arg("-File")
            .arg(path)
            .arg("-DisableRemediation")
            .arg("-Trace")
            .arg("-Level")
            .arg("0x10");

        let out = match run_with_timeout(&mut cmd, self.probe_timeout) {
            Ok(out) => out,
            Err(e) => {
                error!(error = %e, "failed to spawn MpCmdRun");
                return ScanOutcome::status(ScanStatus::Error);
            }
        };
        if out.timed_out {
            return ScanOutcome::status(ScanStatus::Timeout);
        }

        match out.exit_code {
            Some(0) => ScanOutcome::status(ScanStatus::NoThreat),
            Some(2) => ScanOutcome::threat(parse_signature(&out.stdout)),
            code => {
                error!(?code, "MpCmdRun returned an unexpected exit code");
                ScanOutcome::status(ScanStatus::Error)
            }
        }
    }
}

/// 从 -Trace 输出的 `Threat` 行提取签名名（格式脆弱，尽力而为）
fn parse_signature(stdout: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(stdout);
    for line in text.lines() {
        if let Some(rest) = line.trim_start().strip_prefix("Threat ") {
            let name = rest.split_whitespace().next()?;
            return Some(name.to_string());
        }
    }
    None
}

impl Detector for DefenderDetector {
    fn engine_name(&self) -> &str {
        "defender"
    }

    fn scan(&mut self, data: &[u8]) -> ScanOutcome {
        // Defender 只扫磁盘；扩展名取 .exe 以命中 PE 相关签名
        let probe_path = match self.scratch.write_probe("file.exe", data) {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "failed to materialize probe artifact");
                return ScanOutcome::status(ScanStatus::Error);
            }
        };
        let outcome = self.scan_file(&probe_path);
        self.scratch.remove_probe(&probe_path);
        outcome
    }
}
