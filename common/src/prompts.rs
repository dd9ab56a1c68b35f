//! プロンプト生成モジュール
//!
//! 各クライアント（Gemini API / Claude CLI）で共有される
//! 説明文生成プロンプト

/// 説明文生成プロンプトを構築
///
/// 指示文がある場合はその観点を優先し、無い場合は汎用的な説明を求める
///
/// # Arguments
/// * `instruction` - ユーザー指示文（任意）
///
/// # Returns
/// 解析用のプロンプト文字列
pub fn build_describe_prompt(instruction: Option<&str>) -> String {
    let mut prompt = String::from(
        "この画像を解析し、以下のJSON形式のみで出力してください。\n\n\
         {\n  \"description\": \"画像の説明\"\n}\n\n",
    );

    match instruction {
        Some(text) => {
            prompt.push_str("ユーザーからの指示:\n");
            prompt.push_str(text);
            prompt.push_str("\n指示に沿った観点で説明してください。");
        }
        None => {
            prompt.push_str("指示は特にないため、画像の内容を具体的かつ簡潔に説明してください。");
        }
    }

    prompt
}
