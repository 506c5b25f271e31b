//! PDI Sheet CLI
//!
//! テンプレートの読み込み・対話式入力・書き戻しを端末で行う。

pub mod cli;
pub mod config;
pub mod error;
pub mod examine;
pub mod interactive;
pub mod session_file;
