use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "plate-triage")]
#[command(about = "Equipment data plate triage: photos in, repair-vs-replace report out", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 銘板写真を解析してトリアージレポートを表示
    Analyze {
        /// 画像ファイルまたはフォルダ（同じ1台の設備を写したもの）
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// 解析結果をJSONで保存
        #[arg(long)]
        json: Option<PathBuf>,

        /// レポートをPDFで出力（印刷用）
        #[arg(long)]
        pdf: Option<PathBuf>,
    },

    /// 保存済みJSONからレポートを再表示・PDF出力
    Report {
        /// 入力JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// レポートをPDFで出力
        #[arg(long)]
        pdf: Option<PathBuf>,
    },

    /// 設定
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },
}
