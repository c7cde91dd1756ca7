//! 输入来源：本地文件 / 目录枚举 / URL 下载
//!
//! 只负责在首个探测之前把数据变成一份不可变字节缓冲；
//! 缓冲非空由引擎在会话开始时检查。

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use walkdir::WalkDir;

/// URL 下载时限
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// 整读一个本地文件
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read input file {}", path.display()))
}

/// 枚举目录下的常规文件（深度 1），按文件名排序保证处理顺序可复现
pub fn list_dir_files(dir: &Path) -> Result<Vec<PathBuf>> {
    ensure!(dir.exists(), "directory not found: {}", dir.display());
    ensure!(dir.is_dir(), "path is not a directory: {}", dir.display());

    let mut files: Vec<PathBuf> = vec![];
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    ensure!(!files.is_empty(), "no files found in directory {}", dir.display());
    Ok(files)
}

/// 通过 HTTP GET 下载一份字节缓冲
pub fn fetch_url(url: &str) -> Result<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("build http client")?;
    let resp = client
        .get(url)
        .send()
        .with_context(|| format!("could not connect to {url}"))?
        .error_for_status()
        .with_context(|| format!("request to {url} failed"))?;
    let bytes = resp.bytes().context("read response body")?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_only_regular_files_sorted() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("b.bin"), b"b").expect("write");
        std::fs::write(dir.path().join("a.bin"), b"a").expect("write");
        std::fs::create_dir(dir.path().join("sub")).expect("mkdir");
        std::fs::write(dir.path().join("sub").join("nested.bin"), b"n").expect("write");

        let files = list_dir_files(dir.path()).expect("list");
        let names: Vec<_> = files
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect();
        assert_eq!(names, vec!["a.bin", "b.bin"]);
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(list_dir_files(dir.path()).is_err());
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(list_dir_files(Path::new("/does/not/exist-sigslice")).is_err());
    }
}
