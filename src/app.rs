use crate::config::Config;
use crate::input::{ask_retry, load_quota_file, prompt_paper_request};
use crate::models::{load_question_bank, QuestionBank};
use crate::utils::logging::{
    append_paper_log, init_log_file, log_bank_loaded, log_startup, print_final_stats,
};
use crate::workflow::{PaperFlow, PaperOutcome};
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{self, BufRead, Write};
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    bank: QuestionBank,
}

impl App {
    /// 初始化应用：创建日志文件并加载题库
    pub fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config);

        let bank = load_question_bank(&config.question_bank_path, config.bank_delimiter)
            .with_context(|| {
                format!(
                    "无法加载题库: {}",
                    config.question_bank_path.display()
                )
            })?;

        if bank.is_empty() {
            warn!("⚠️ 题库中没有任何题目");
        }
        log_bank_loaded(&bank);

        Ok(Self { config, bank })
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// 运行应用主逻辑
    ///
    /// 配置了配额文件时直接组卷，否则在命令行交互输入配额
    pub fn run(&self) -> Result<PaperOutcome> {
        let mut rng = self.make_rng();

        match &self.config.quota_file {
            Some(path) => {
                let request = load_quota_file(path, &self.config.output_path)?;
                let outcome = PaperFlow::new(&self.config).run(&self.bank, &request, &mut rng)?;
                self.finish(&outcome)?;
                Ok(outcome)
            }
            None => {
                let stdin = io::stdin();
                let mut input = stdin.lock();
                let mut out = io::stdout();
                self.run_interactive(&mut input, &mut out, &mut rng)
            }
        }
    }

    /// 交互式组卷，配额或抽题错误时可调整配额重试（题库不会重新加载）
    pub fn run_interactive<R, W, G>(&self, input: &mut R, out: &mut W, rng: &mut G) -> Result<PaperOutcome>
    where
        R: BufRead,
        W: Write,
        G: Rng + ?Sized,
    {
        let flow = PaperFlow::new(&self.config);

        loop {
            let request = prompt_paper_request(
                input,
                out,
                &self.bank,
                &self.config.mark_values,
                &self.config.output_path,
            )?;

            match flow.run(&self.bank, &request, rng) {
                Ok(outcome) => {
                    self.finish(&outcome)?;
                    return Ok(outcome);
                }
                Err(e) if e.is_retryable() => {
                    error!("❌ 组卷失败: {}", e);
                    writeln!(out, "错误: {}", e)?;
                    if !ask_retry(input, out)? {
                        return Err(e.into());
                    }
                    info!("🔄 重新输入配额");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn make_rng(&self) -> StdRng {
        match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }

    fn finish(&self, outcome: &PaperOutcome) -> Result<()> {
        append_paper_log(&self.config.output_log_file, outcome)?;
        print_final_stats(outcome, &self.config.output_log_file);
        Ok(())
    }
}
