use clap::ValueEnum;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum AiProvider {
    Gemini,
    ClaudeCli,
}

impl AiProvider {
    pub fn label(&self) -> &'static str {
        match self {
            AiProvider::Gemini => "gemini",
            AiProvider::ClaudeCli => "claude-cli",
        }
    }
}
