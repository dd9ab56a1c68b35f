//! Image AI Common Library
//!
//! フロントエンド（CLIなど）で共有される解析コア:
//! アイテムストア / 逐次解析キュー / バッチコントローラ

pub mod client;
pub mod controller;
pub mod error;
pub mod intake;
pub mod notice;
pub mod parser;
pub mod prompts;
pub mod queue;
pub mod store;
pub mod types;

pub use client::{AnalysisClient, AnalysisError};
pub use controller::BatchController;
pub use error::{Error, Result};
pub use intake::{default_pasted_name, sniff_image_mime, FileSource, MaterializedFile, ReadError};
pub use notice::{notice_channel, Notice, NoticeSink};
pub use parser::{extract_json, parse_description_response};
pub use prompts::build_describe_prompt;
pub use queue::AnalysisQueue;
pub use store::ItemStore;
pub use types::{new_item_id, AnalysisState, ImageData, Item, ItemId};
