use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdi-sheet")]
#[command(about = "ロボットPDI検査シート入力ウィザード", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// テンプレートを使って対話式で検査を行う
    Inspect {
        /// PDIテンプレート（.xlsx）
        #[arg(required = true)]
        template: PathBuf,

        /// 出力ディレクトリ（デフォルト: 設定値またはカレント）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 保存された検査を再開
        #[arg(long)]
        resume: bool,
    },

    /// テンプレートの読み取り結果を表示
    Examine {
        /// PDIテンプレート（.xlsx）
        #[arg(required = true)]
        template: PathBuf,
    },

    /// 白紙のテンプレートを書き出す
    Sample {
        /// 出力ファイル
        #[arg(required = true)]
        output: PathBuf,
    },

    /// 保存された検査の管理
    Session {
        /// 保存内容を表示
        #[arg(long)]
        info: bool,

        /// 保存内容を削除
        #[arg(long)]
        clear: bool,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 出力ディレクトリを設定
        #[arg(long)]
        set_output_dir: Option<PathBuf>,

        /// イニシャルの初期値を設定
        #[arg(long)]
        set_initials: Option<String>,

        /// 保存された検査を確認なしで再開する
        #[arg(long)]
        auto_resume: Option<bool>,
    },
}
