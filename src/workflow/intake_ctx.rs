//! 扫描上下文
//!
//! 封装"我正在处理这一批中的第几张图片"这一信息

use std::fmt::Display;
use std::path::Path;

/// 单张图片的处理上下文
#[derive(Debug, Clone)]
pub struct ScanCtx {
    /// 图片在本批中的序号（从1开始，仅用于日志显示）
    pub image_index: usize,

    /// 文件名（用于错误信息）
    pub file_name: String,
}

impl ScanCtx {
    /// 创建新的扫描上下文
    pub fn new(image_index: usize, path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            image_index,
            file_name,
        }
    }
}

impl Display for ScanCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[图片 #{} {}]", self.image_index, self.file_name)
    }
}
