use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

use qcm_explain::error::ConfigError;
use qcm_explain::orchestrator::{Vote, VoteSource};
use qcm_explain::{
    compare_prompts, extract_questions, load_records, logger, render_extracted, App, AppError,
    BundleMode, Config, LlmService, PreferenceStore, PromptVariant, QuestionCtx, QuestionRecord,
};

/// 提取结果的默认文件名
const DEFAULT_EXTRACT_OUTPUT: &str = "questions_qcm.csv";

#[derive(Parser)]
#[command(name = "qcm_explain")]
#[command(about = "为 QCM 题库生成答案解析，并从试卷文本中提取题目")]
#[command(version)]
struct Cli {
    /// TOML 配置文件
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// 显示详细日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 为一个或多个分隔文件生成解析
    Generate {
        /// 输入文件（每行: 题干$A$B$C$D$答案$图片$解析）
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// 使用的 prompt 版本（V1/V2），默认读取偏好文件
        #[arg(long)]
        variant: Option<PromptVariant>,
        /// 输出目录
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
        /// 打包方式: none, json, viewer
        #[arg(long)]
        bundle: Option<BundleMode>,
        /// viewer 打包使用的 HTML 模板
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,
    },
    /// 从试卷文本中提取题目
    Extract {
        /// 纯文本试卷
        input: PathBuf,
        /// 输出文件
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// 对比 V1/V2 两个 prompt 并保存胜出版本
    Compare {
        /// 分隔文件
        file: PathBuf,
    },
    /// 直接设置 prompt 偏好
    Prefer {
        /// V1 或 V2
        variant: PromptVariant,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let config = Config::from_env();
    match &cli.config {
        Some(path) => config.with_toml_file(path),
        None => Ok(config),
    }
}

fn require_api_key(config: &Config) -> Result<()> {
    if config.llm_api_key.trim().is_empty() {
        return Err(AppError::from(ConfigError::MissingApiKey).into());
    }
    Ok(())
}

/// 被信号中断时的退出码（128 + SIGINT）
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// 置位停止标志，返回 true 表示此前已经置位过（应立即退出）
fn register_interrupt(stop: &AtomicBool) -> bool {
    stop.swap(true, Ordering::SeqCst)
}

/// 第一次 Ctrl-C 置位停止标志，第二次直接退出
fn install_ctrl_c(stop: Arc<AtomicBool>) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if register_interrupt(&stop) {
                warn!("⏹️ 再次收到 Ctrl-C，立即退出");
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
            warn!("⏹️ 收到 Ctrl-C，当前题目完成后停止（再按一次立即退出）");
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli)?;
    config.verbose_logging |= cli.verbose;

    // 初始化日志
    logger::init(config.verbose_logging);

    match cli.command {
        Commands::Generate {
            files,
            variant,
            out,
            bundle,
            template,
        } => {
            if let Some(variant) = variant {
                config.prompt_variant = Some(variant);
            }
            if let Some(out) = out {
                config.output_dir = out;
            }
            if let Some(bundle) = bundle {
                config.bundle_mode = bundle;
            }
            if let Some(template) = template {
                config.html_template = Some(template);
            }
            require_api_key(&config)?;

            let service = Arc::new(LlmService::new(&config));
            let app = App::new(config, service);
            install_ctrl_c(app.stop_flag());

            let report = app.run(&files).await?;
            if report.files.is_empty() && !report.unreadable.is_empty() {
                anyhow::bail!("所有输入文件都无法读取");
            }
        }
        Commands::Extract { input, out } => {
            run_extract(&input, out.as_deref(), config.delimiter).await?;
        }
        Commands::Compare { file } => {
            require_api_key(&config)?;

            let input = load_records(&file, config.delimiter).await?;
            let service = LlmService::new(&config);
            let store = PreferenceStore::new(&config.preference_file);
            let stop = Arc::new(AtomicBool::new(false));
            install_ctrl_c(stop.clone());

            let mut votes = StdinVotes::new();
            let mut rng = StdRng::from_entropy();
            let tally = compare_prompts(
                &config,
                &service,
                &input.records,
                &mut votes,
                &mut rng,
                &store,
                &stop,
            )
            .await?;

            if tally.has_votes() {
                println!(
                    "V1: {} 票 | V2: {} 票 → 已选用 {}",
                    tally.v1_votes,
                    tally.v2_votes,
                    tally.preferred()
                );
            } else {
                println!("没有有效投票，偏好保持不变");
            }
        }
        Commands::Prefer { variant } => {
            let store = PreferenceStore::new(&config.preference_file);
            store.save(variant).await?;
            info!("✓ 已将 prompt 偏好设置为 {} ({})", variant, store.path().display());
        }
    }

    Ok(())
}

async fn run_extract(input: &Path, out: Option<&Path>, delimiter: char) -> Result<()> {
    let text = tokio::fs::read_to_string(input)
        .await
        .map_err(|e| AppError::file_read_failed(input.display().to_string(), e))?;

    let questions = extract_questions(&text);
    let out = out.unwrap_or_else(|| Path::new(DEFAULT_EXTRACT_OUTPUT));

    tokio::fs::write(out, render_extracted(&questions, delimiter))
        .await
        .map_err(|e| AppError::file_write_failed(out.display().to_string(), e))?;

    info!("✓ 共提取 {} 道题，已保存到 {}", questions.len(), out.display());
    Ok(())
}

/// 从标准输入读取投票
struct StdinVotes {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinVotes {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

#[async_trait]
impl VoteSource for StdinVotes {
    async fn vote(
        &mut self,
        ctx: &QuestionCtx,
        record: &QuestionRecord,
        first: &str,
        second: &str,
    ) -> Result<Vote> {
        println!("\n{} {}", ctx, record.question);
        println!("  1) {}", first);
        println!("  2) {}", second);

        loop {
            println!("选择更好的解析 [1/2，s 跳过]:");
            let line = self
                .lines
                .next_line()
                .await
                .context("无法读取标准输入")?;

            // 输入结束时视为跳过
            let Some(line) = line else {
                return Ok(Vote::Skip);
            };
            match line.trim() {
                "1" => return Ok(Vote::First),
                "2" => return Ok(Vote::Second),
                "s" | "S" => return Ok(Vote::Skip),
                other => println!("无法识别的输入: '{}'", other),
            }
        }
    }
}
