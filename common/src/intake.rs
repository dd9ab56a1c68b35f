//! ファイル受け入れ
//!
//! 投入ソースのバイト列化とMIMEスニッフィング。
//! 画像のデコードや内容検証はここでは行わない（マジックバイト判定のみ）

use std::path::PathBuf;

use thiserror::Error;

/// ファイル読み込み失敗（アイテムは作られない）
#[derive(Error, Debug)]
#[error("ファイル読み込みエラー ({name}): {message}")]
pub struct ReadError {
    pub name: String,
    pub message: String,
}

/// バイト列化済みの投入ファイル
#[derive(Debug)]
pub struct MaterializedFile {
    pub name: Option<String>,
    pub bytes: Vec<u8>,
}

/// 投入ソース
///
/// ファイルピッカー由来のパスと、クリップボード貼り付け由来の
/// 無名バイト列を同じ形で受け付ける
#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Memory { name: Option<String>, bytes: Vec<u8> },
}

impl FileSource {
    /// バイト列へ実体化する
    pub fn materialize(self) -> Result<MaterializedFile, ReadError> {
        match self {
            FileSource::Path(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned());
                let bytes = std::fs::read(&path).map_err(|e| ReadError {
                    name: name.clone().unwrap_or_else(|| path.display().to_string()),
                    message: e.to_string(),
                })?;
                Ok(MaterializedFile { name, bytes })
            }
            FileSource::Memory { name, bytes } => Ok(MaterializedFile { name, bytes }),
        }
    }
}

/// マジックバイトからMIMEタイプを判定する。画像でなければNone
pub fn sniff_image_mime(bytes: &[u8]) -> Option<String> {
    image::guess_format(bytes)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}

/// 貼り付け画像の既定ファイル名
pub fn default_pasted_name() -> String {
    format!("pasted-image-{}.png", chrono::Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_sniff_image_mime_png() {
        assert_eq!(sniff_image_mime(PNG_MAGIC), Some("image/png".to_string()));
    }

    #[test]
    fn test_sniff_image_mime_jpeg() {
        let bytes = [0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(sniff_image_mime(&bytes), Some("image/jpeg".to_string()));
    }

    #[test]
    fn test_sniff_image_mime_rejects_text() {
        assert_eq!(sniff_image_mime(b"just some text"), None);
        assert_eq!(sniff_image_mime(&[]), None);
    }

    #[test]
    fn test_materialize_memory_source() {
        let source = FileSource::Memory {
            name: Some("clip.png".to_string()),
            bytes: PNG_MAGIC.to_vec(),
        };
        let file = source.materialize().unwrap();
        assert_eq!(file.name.as_deref(), Some("clip.png"));
        assert_eq!(file.bytes, PNG_MAGIC);
    }

    #[test]
    fn test_materialize_missing_path_is_read_error() {
        let source = FileSource::Path(PathBuf::from("/存在しない/フォルダ/x.png"));
        let err = source.materialize().unwrap_err();
        assert_eq!(err.name, "x.png");
        assert!(!err.message.is_empty());
    }

    #[test]
    fn test_default_pasted_name_shape() {
        let name = default_pasted_name();
        assert!(name.starts_with("pasted-image-"));
        assert!(name.ends_with(".png"));
    }
}
