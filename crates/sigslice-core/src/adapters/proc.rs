//! 进程调用型适配器的公共骨架：带时限地跑一个外部扫描进程
//!
//! 单次探测内部用一个短命线程排空子进程 stdout，避免被杀掉的
//! 子进程因管道写满而卡死；探测本身仍是严格串行的。

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// 子进程的执行结果
pub(crate) struct ProcOutput {
    /// 退出码；超时被杀时为 None
    pub(crate) exit_code: Option<i32>,
    pub(crate) stdout: Vec<u8>,
    pub(crate) timed_out: bool,
}

/// 跑一个命令直到退出或超时；超时则杀进程并标记 timed_out
pub(crate) fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> io::Result<ProcOutput> {
    cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::null());
    let mut child = cmd.spawn()?;

    let stdout_pipe = child.stdout.take();
    let reader = std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = stdout_pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    });

    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            let stdout = reader.join().unwrap_or_default();
            return Ok(ProcOutput {
                exit_code: status.code(),
                stdout,
                timed_out: false,
            });
        }
        if started.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            let _ = reader.join();
            return Ok(ProcOutput {
                exit_code: None,
                stdout: Vec::new(),
                timed_out: true,
            });
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

/// 在 PATH 里解析可执行文件
pub(crate) fn resolve_in_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let cand = dir.join(name);
        if cand.is_file() {
            return Some(cand);
        }
        #[cfg(windows)]
        {
            let cand = dir.join(format!("{name}.exe"));
            if cand.is_file() {
                return Some(cand);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn captures_stdout_and_exit_code() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("printf hello; exit 3");
        let out = run_with_timeout(&mut cmd, Duration::from_secs(10)).expect("spawn sh");
        assert!(!out.timed_out);
        assert_eq!(out.exit_code, Some(3));
        assert_eq!(out.stdout, b"hello");
    }

    #[test]
    #[cfg(unix)]
    fn kills_process_after_timeout() {
        let mut cmd = Command::new("sleep");
        cmd.arg("30");
        let started = Instant::now();
        let out = run_with_timeout(&mut cmd, Duration::from_millis(200)).expect("spawn sleep");
        assert!(out.timed_out);
        assert!(out.exit_code.is_none());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    #[cfg(unix)]
    fn resolves_common_binary_from_path() {
        assert!(resolve_in_path("sh").is_some());
        assert!(resolve_in_path("definitely-not-a-real-binary-name").is_none());
    }
}
