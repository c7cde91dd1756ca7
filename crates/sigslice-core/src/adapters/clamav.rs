//! ClamAV 适配器（进程调用型）
//!
//! 构造时在 PATH 里解析 clamdscan（优先）或 clamscan，缺失即
//! 永久失败。每次探测把前缀写成临时文件交给进程扫描，返回后
//! 立即删除。退出码约定：0 = 未命中，1 = 命中，其余 = 错误。

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, error};

use crate::adapters::proc::{resolve_in_path, run_with_timeout};
use crate::adapters::scratch::ScratchDir;
use crate::detector::Detector;
use crate::error::SetupError;
use crate::options::AdapterOptions;
use crate::outcome::{ScanOutcome, ScanStatus};

pub struct ClamavDetector {
    scanner_path: PathBuf,
    uses_clamd: bool,
    scratch: ScratchDir,
    probe_timeout: Duration,
    signature_rx: Regex,
}

impl ClamavDetector {
    pub fn new(opts: &AdapterOptions) -> Result<Self, SetupError> {
        let (scanner_path, uses_clamd) = match resolve_in_path("clamdscan") {
            Some(p) => (p, true),
            None => match resolve_in_path("clamscan") {
                Some(p) => (p, false),
                None => {
                    return Err(SetupError::DetectorUnavailable(
                        "clamdscan/clamscan not found in PATH".to_string(),
                    ))
                }
            },
        };
        if !uses_clamd {
            debug!("using clamscan; install clamav-daemon for much faster probes");
        }

        let scratch = ScratchDir::new()
            .map_err(|e| SetupError::DetectorUnavailable(format!("scratch dir: {e}")))?;

        // 输出格式：`<路径>: <签名名> FOUND`
        let signature_rx = Regex::new(r": (.+) FOUND")
            .map_err(|e| SetupError::DetectorUnavailable(format!("signature regex: {e}")))?;

        Ok(Self {
            scanner_path,
            uses_clamd,
            scratch,
            probe_timeout: opts.probe_timeout,
            signature_rx,
        })
    }

    fn scan_file(&self, path: &Path) -> ScanOutcome {
        if !path.exists() {
            return ScanOutcome::status(ScanStatus::NotFound);
        }

        // clamav-daemon 以 clamav 用户运行，产物需对其可读
        #[cfg(unix)]
        if self.uses_clamd {
            use std::fs;
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(self.scratch.path(), fs::Permissions::from_mode(0o755));
            let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o755));
        }

        let mut cmd = Command::new(&self.scanner_path);
        cmd.arg("--no-summary").arg("--infected").arg(path);

        let out = match run_with_timeout(&mut cmd, self.probe_timeout) {
            Ok(out) => out,
            Err(e) => {
                error!(error = %e, "failed to spawn clamav scanner");
                return ScanOutcome::status(ScanStatus::Error);
            }
        };
        if out.timed_out {
            return ScanOutcome::status(ScanStatus::Timeout);
        }

        match out.exit_code {
            Some(0) => ScanOutcome::status(ScanStatus::NoThreat),
            Some(1) => ScanOutcome::threat(self.parse_signature(&out.stdout)),
            code => {
                error!(?code, "clamav scanner returned an unexpected exit code");
                ScanOutcome::status(ScanStatus::Error)
            }
        }
    }

    /// 从进程输出提取签名名（尽力而为，失败不影响判定）
    fn parse_signature(&self, stdout: &[u8]) -> Option<String> {
        let text = String::from_utf8_lossy(stdout);
        self.signature_rx
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    }
}

impl Detector for ClamavDetector {
    fn engine_name(&self) -> &str {
        "clamav"
    }

    fn scan(&mut self, data: &[u8]) -> ScanOutcome {
        // 引擎扫磁盘不扫内存：先落盘，返回后无条件删除
        let probe_path = match self.scratch.write_probe("testfile", data) {
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
