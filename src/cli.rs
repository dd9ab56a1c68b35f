use clap::{Parser, Subcommand};
use crate::ai_provider::AiProvider;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "image-ai")]
#[command(about = "画像AI解析ツール（逐次解析キュー）", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// AIプロバイダ (gemini/claude-cli)
    #[arg(long, default_value = "gemini", global = true)]
    pub ai_provider: AiProvider,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像を解析して説明文を生成
    Analyze {
        /// 画像ファイルまたはフォルダのパス
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// AIへの指示文（省略時は汎用的な説明を生成）
        #[arg(short, long)]
        instruction: Option<String>,

        /// 結果JSONの出力先
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 解析後に指示文を変えて再解析できる対話モード
        #[arg(long)]
        interactive: bool,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
