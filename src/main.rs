use std::sync::Arc;

use clap::Parser;
use indicatif::ProgressBar;
use tokio::sync::mpsc;

use image_ai_common::{notice_channel, AnalysisState, BatchController, FileSource, Notice};
use image_ai_rust::{cli, client, config, error, report, scanner};

use cli::{Cli, Commands};
use config::Config;
use error::{ImageAiError, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Analyze {
            paths,
            instruction,
            output,
            interactive,
        } => {
            println!("🖼 image-ai - 画像解析\n");

            // 1. 入力パス展開
            println!("[1/3] 入力ファイルを確認中...");
            let files = scanner::expand_paths(&paths)?;
            println!("✔ {}件のファイルを検出\n", files.len());

            if files.is_empty() {
                return Err(ImageAiError::NoImagesFound(
                    paths
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                ));
            }

            // 2. コントローラ構築と投入
            let analysis_client = client::build_client(cli.ai_provider, &config)?;
            let (notices, notice_rx) = notice_channel();
            let controller = Arc::new(BatchController::new(analysis_client, notices));

            if let Some(text) = instruction {
                controller.set_instruction(text);
            }

            // 通知をトースト風に印字するタスク
            tokio::spawn(print_notices(notice_rx, cli.verbose));

            println!("[2/3] AI解析中... ({})", cli.ai_provider.label());
            let sources: Vec<FileSource> = files.into_iter().map(FileSource::Path).collect();
            let submitted = controller.submit_new(sources);

            if submitted == 0 {
                return Err(ImageAiError::NoImagesFound(
                    "画像として受け付けられたファイルがありません".to_string(),
                ));
            }

            drain_with_progress(&controller, submitted as u64).await;
            println!("✔ 解析完了\n");

            // 3. 結果表示
            println!("[3/3] 結果\n");
            print_cards(&controller);

            save_if_requested(&controller, output.as_deref())?;

            if interactive {
                interactive_loop(&controller, output.as_deref()).await?;
            }

            println!("\n✅ 完了");
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  最大画像サイズ: {}px", config.max_image_size);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!(
                    "  APIキー: {}",
                    if config.api_key.is_some() {
                        "設定済み"
                    } else {
                        "未設定"
                    }
                );
            }
        }
    }

    Ok(())
}

/// キューが空になるまで進捗バーを更新しながら待つ
async fn drain_with_progress(controller: &BatchController, total: u64) {
    let bar = ProgressBar::new(total);
    let mut rx = controller.subscribe_items();

    loop {
        let settled = {
            let items = rx.borrow();
            items.iter().filter(|i| !i.state.is_unsettled()).count() as u64
        };
        bar.set_position(settled);

        if !controller.is_processing() {
            break;
        }
        if rx.changed().await.is_err() {
            break;
        }
    }

    bar.finish_and_clear();
}

/// アイテムをカード風に印字する
fn print_cards(controller: &BatchController) {
    for item in controller.store().snapshot() {
        println!("─ {} [{}]", item.display_name, item.state.as_str());
        match &item.state {
            AnalysisState::Done { description } => println!("  {}", description),
            AnalysisState::Failed { message } => println!("  ✖ {}", message),
            _ => {}
        }
    }
}

/// 通知チャネルをトースト風の出力へ流す
async fn print_notices(mut rx: mpsc::UnboundedReceiver<Notice>, verbose: bool) {
    while let Some(notice) = rx.recv().await {
        match notice {
            Notice::Submitted { count } => {
                if verbose {
                    println!("  {}件をキューに追加", count);
                }
            }
            Notice::InvalidFileType { name } => {
                println!("⚠ {} は画像ファイルではありません", name);
            }
            Notice::ReadFailed { name, message } => {
                println!("⚠ {} を読み込めませんでした: {}", name, message);
            }
            Notice::AnalysisFailed { name, message } => {
                println!("✖ {} の解析に失敗: {}", name, message);
            }
            Notice::Reanalyzing => println!("🔄 現在の指示文で全件を再解析します"),
            Notice::Cleared => println!("🗑 すべてクリアしました"),
        }
    }
}

fn save_if_requested(controller: &BatchController, output: Option<&std::path::Path>) -> Result<()> {
    if let Some(path) = output {
        let report = report::build_report(&controller.store().snapshot(), &controller.instruction());
        report::save_report(&report, path)?;
        println!("✔ 結果を保存: {}", path.display());
    }
    Ok(())
}

/// 指示文を変えながら再解析する対話ループ
async fn interactive_loop(
    controller: &Arc<BatchController>,
    output: Option<&std::path::Path>,
) -> Result<()> {
    loop {
        let text: String = dialoguer::Input::new()
            .with_prompt("新しい指示文（空Enterで終了、/clearで全消去）")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| ImageAiError::Input(e.to_string()))?;

        if text.trim().is_empty() {
            break;
        }
        if text.trim() == "/clear" {
            controller.clear_all();
            break;
        }

        controller.set_instruction(text);
        if !controller.reanalyze_all() {
            break;
        }

        let total = controller.store().len() as u64;
        drain_with_progress(controller, total).await;
        print_cards(controller);
        save_if_requested(controller, output)?;
    }

    Ok(())
}
