// error.rs — 统一错误类型

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MultiViewError {
    /// 输入内容不合法：空的图片集合、形状错误的像素缓冲等。
    #[error("invalid input: {0}")]
    Validation(String),

    /// 参数越界：rotation_speed 超出 [0.1, 5.0]、插槽数量超过 8 等。
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// 输入文件无法解码。
    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// PNG 编码失败。
    #[error("image encode failed: {0}")]
    Encode(#[from] image::ImageError),

    /// 磁盘写入失败（目录不可写、磁盘满等），不做重试。
    #[error("persistence failed: {0}")]
    Persistence(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MultiViewError>;
