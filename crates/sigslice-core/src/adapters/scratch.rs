//! 探测产物的临时落盘目录
//!
//! 许多引擎只扫磁盘不扫内存，适配器需要把待测前缀写成临时文件。
//! 产物以“探测”为粒度：探测前写入、探测返回后同步删除；目录本身
//! 随适配器销毁整体回收（tempfile 的 Drop 兜底）。删除失败只记日志，
//! 绝不升级为错误，以免掩盖真正的扫描结果。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::warn;

/// 适配器私有的临时目录
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    pub fn new() -> io::Result<Self> {
        Ok(Self { dir: tempfile::tempdir()? })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// 把一次探测的数据写成临时文件，返回其路径
    pub fn write_probe(&self, name: &str, data: &[u8]) -> io::Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::write(&path, data)?;
        Ok(path)
    }

    /// 删除探测产物；失败只记录，不上抛
    pub fn remove_probe(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "failed to remove probe artifact");
        }
    }
}
