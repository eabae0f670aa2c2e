use clap::Parser;
use ecourts_causelist::config::LogFormat;
use ecourts_causelist::export::tabular::render_text_table;
use ecourts_causelist::utils::error::ErrorSeverity;
use ecourts_causelist::utils::{logger, validation::Validate};
use ecourts_causelist::{
    CauseListEngine, CauseListPipeline, CliConfig, Exporter, FallbackProvider, LocalStorage,
    RunReport, SessionManager,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::info!("Starting ecourts-causelist");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    let config = match cli.validate().and_then(|_| cli.scraper_config()) {
        Ok(config) => config,
        Err(e) => fail_config(e),
    };
    if let Err(e) = config.validate() {
        fail_config(e);
    }

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 創建存儲、管道與會話
    let storage = LocalStorage::new(config.download_dir().to_string());
    let pipeline = CauseListPipeline::new(config.pipeline_settings(), Exporter::new(storage.clone()));
    let fallback = FallbackProvider::new(Exporter::new(storage));
    let sessions = SessionManager::new(config.session_settings());

    let engine = CauseListEngine::new_with_monitoring(sessions, pipeline, fallback, cli.monitor);
    let query = cli.query();

    match engine.run(&query, cli.run_options()).await {
        Ok(report) => {
            print!("{}", render_text_table(report.records()));
            match &report {
                RunReport::Live(bundle) => {
                    println!("✅ Cause list saved:");
                    for path in [&bundle.pdf, &bundle.json, &bundle.csv].into_iter().flatten() {
                        println!("📁 {}", path.display());
                    }
                }
                RunReport::Fallback { pdf, .. } => {
                    println!("⚠️  No data fetched; fallback cause list saved:");
                    println!("📁 {}", pdf.display());
                }
            }
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn fail_config(e: ecourts_causelist::ScrapeError) -> ! {
    tracing::error!("❌ Configuration validation failed: {}", e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(1);
}
