use clap::Parser;
use pdi_sheet::{cli, config, error, examine, interactive, session_file};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use pdi_sheet_common::session::SessionStore;
use session_file::FileStore;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Inspect { template, output, resume } => {
            println!("📋 pdi-sheet - PDI検査\n");

            let options = interactive::InspectOptions {
                template,
                output_dir: config.resolve_output_dir(output),
                resume,
                auto_resume: config.auto_resume,
                default_initials: config.default_initials.clone(),
            };
            let mut store = FileStore::default_location()?;

            if let Some(path) = interactive::run_interactive_inspection(&options, &mut store)? {
                println!("\n✅ 検査完了: {}", path.display());
            }
        }

        Commands::Examine { template } => {
            println!("🔍 pdi-sheet - テンプレート確認\n");
            examine::examine_template(&template)?;
        }

        Commands::Sample { output } => {
            let bytes = pdi_sheet_common::export::sample_template_bytes()?;
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(&output, bytes)?;
            println!(
                "✔ テンプレートを書き出しました: {} ({}項目)",
                output.display(),
                pdi_sheet_common::export::sample_item_count()
            );
        }

        Commands::Session { info, clear } => {
            let mut store = FileStore::default_location()?;

            if info || !clear {
                // デフォルトまたは--info: 情報表示
                match store.load() {
                    Some(snapshot) => {
                        let summary = snapshot.data.summary();
                        println!("保存された検査:");
                        println!("  パス: {}", store.path().display());
                        println!("  ステップ: {}", snapshot.step);
                        println!("  機種: {}", snapshot.data.header_info.robot_model());
                        println!("  シリアル: {}", snapshot.data.header_info.serial_number());
                        println!(
                            "  進捗: 合格 {} / 不合格 {} / 未判定 {}",
                            summary.passed, summary.failed, summary.pending
                        );
                        if let Ok(modified) = std::fs::metadata(store.path()).and_then(|m| m.modified()) {
                            let modified: chrono::DateTime<chrono::Local> = modified.into();
                            println!("  更新: {}", modified.format("%Y-%m-%d %H:%M"));
                        }
                    }
                    None if store.exists() => {
                        println!("保存ファイルを読み込めません: {}", store.path().display());
                    }
                    None => println!("保存された検査はありません"),
                }
            }

            if clear {
                match store.clear() {
                    Ok(()) => println!("✔ 保存された検査を削除しました"),
                    Err(e) => println!("削除エラー: {}", e),
                }
            }
        }

        Commands::Config { show, set_output_dir, set_initials, auto_resume } => {
            let mut config = config;

            if let Some(dir) = set_output_dir {
                config.set_output_dir(dir)?;
                println!("✔ 出力ディレクトリを設定しました");
            }

            if let Some(initials) = set_initials {
                config.set_initials(&initials)?;
                println!("✔ イニシャルを設定しました");
            }

            if let Some(value) = auto_resume {
                config.auto_resume = value;
                config.save()?;
                println!("✔ 自動再開を{}にしました", if value { "有効" } else { "無効" });
            }

            if show {
                println!("設定:");
                println!(
                    "  出力ディレクトリ: {}",
                    config.output_dir.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "(カレント)".into())
                );
                println!("  イニシャル: {}", config.default_initials.as_deref().unwrap_or("未設定"));
                println!("  自動再開: {}", if config.auto_resume { "有効" } else { "無効" });
            }
        }
    }

    Ok(())
}
