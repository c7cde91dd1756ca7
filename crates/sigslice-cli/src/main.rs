use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sigslice_core::{
    build_detector, fetch_url, list_dir_files, read_file, AdapterOptions, BoundarySearchEngine,
    EngineKind, SearchOutcome,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "sigslice", version, about = "AV 签名边界定位器")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 对文件 / URL / 目录做签名边界搜索
    Scan {
        /// 分析磁盘上的一个文件
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,

        /// 分析从 URL 下载的文件
        #[arg(long, short = 'u')]
        url: Option<String>,

        /// 分析目录下的所有文件（深度 1）
        #[arg(long, short = 'd')]
        dir: Option<PathBuf>,

        /// 扫描引擎：clamav、defender 或 amsi（后两者仅 Windows）
        #[arg(long, short = 'e', default_value = "clamav", value_parser = ["clamav", "defender", "amsi"])]
        engine: String,

        /// 单次探测时限（秒，进程调用型引擎）
        #[arg(long, default_value_t = 30)]
        timeout: u64,

        /// 输出逐探测的调试信息
        #[arg(long)]
        debug: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { file, url, dir, engine, timeout, debug } => {
            init_tracing(debug);

            // 解析引擎参数
            let kind = match engine.as_str() {
                "defender" => EngineKind::Defender,
                "amsi" => EngineKind::Amsi,
                _ => EngineKind::Clamav,
            };
            let opts = AdapterOptions { probe_timeout: Duration::from_secs(timeout) };

            // 汇集输入缓冲（目录 > 文件 > URL，三者取其一）
            let targets: Vec<(String, Vec<u8>)> = if let Some(d) = dir {
                let files = list_dir_files(&d)?;
                info!(count = files.len(), "found files to scan");
                let mut targets = Vec::with_capacity(files.len());
                for path in files {
                    let name = path.display().to_string();
                    targets.push((name, read_file(&path)?));
                }
                targets
            } else if let Some(f) = file {
                vec![(f.display().to_string(), read_file(&f)?)]
            } else if let Some(u) = url {
                let bytes = fetch_url(&u)?;
                vec![(u, bytes)]
            } else {
                bail!("one of --file, --url or --dir is required");
            };

            // 可用性检查在此一次性完成；失败属于准备阶段错误，非零退出
            let mut detector = build_detector(kind, &opts).context("initialize detector")?;
            info!(engine = detector.engine_name(), "detector ready");

            run_sessions(targets, detector.as_mut())?;
        }
    }

    Ok(())
}

/// 逐个会话执行并打印汇总；探测失败不影响退出码
fn run_sessions(
    targets: Vec<(String, Vec<u8>)>,
    detector: &mut dyn sigslice_core::Detector,
) -> Result<()> {
    let engine = BoundarySearchEngine::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut isolated = 0usize;
    let mut unisolated = 0usize;
    let mut clean = 0usize;
    let mut aborted = 0usize;

    for (name, buf) in &targets {
        writeln!(out, "Scanning: {name}")?;
        let report = engine.run(buf, detector, &mut out)?;
        info!(
            target_name = %name,
            probes = report.probes_issued,
            outcome = ?report.outcome,
            "session finished"
        );
        match report.outcome {
            SearchOutcome::Isolated { .. } => isolated += 1,
            SearchOutcome::MaliciousUnisolated => unisolated += 1,
            SearchOutcome::NotMalicious => clean += 1,
            SearchOutcome::Aborted { .. } => aborted += 1,
        }
    }

    writeln!(out, "{}", "-".repeat(60))?;
    writeln!(
        out,
        "Scan complete: {} session(s), {} isolated, {} malicious without boundary, {} clean, {} aborted",
        targets.len(),
        isolated,
        unisolated,
        clean,
        aborted,
    )?;

    Ok(())
}

fn init_tracing(debug: bool) {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 默认支持 RUST_LOG 控制等级；--debug 直接强制 debug
    let env_filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
