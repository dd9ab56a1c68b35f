//! 入力パス展開
//!
//! 引数に指定されたフォルダを画像ファイル一覧へ展開する。
//! 明示指定されたファイルは拡張子を問わずそのまま通す
//! （画像でないものはコントローラ側で1件ずつ警告・却下される）

use crate::error::{ImageAiError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "JPG", "JPEG", "PNG", "GIF", "WEBP",
];

pub fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if !path.exists() {
            return Err(ImageAiError::FileNotFound(path.display().to_string()));
        }
        if path.is_dir() {
            files.extend(scan_folder(path));
        } else {
            files.push(path.clone());
        }
    }

    Ok(files)
}

fn scan_folder(folder: &Path) -> Vec<PathBuf> {
    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1) // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if let Some(ext) = path.extension() {
            let ext_str = ext.to_string_lossy();
            if IMAGE_EXTENSIONS.iter().any(|&e| e == ext_str) {
                images.push(path.to_path_buf());
            }
        }
    }

    // ファイル名でソート
    images.sort();

    images
}
