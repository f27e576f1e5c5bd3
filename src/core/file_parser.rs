//! 文件解析模块
//!
//! 为列选择器提供CSV文件的表头解析功能。
//!
//! ## 功能特性
//!
//! - **编码检测**: BOM检测、chardetng智能检测，回退到UTF-8
//! - **分隔符嗅探**: 只看第一行，按候选优先级统计分隔符出现次数
//! - **表头预览**: 使用检测到的分隔符读取前几行数据

use crate::core::models::{AppError, AppResult, HeaderPreview};
use crate::parsers::csv_parser::parse_csv_rows;
use crate::parsers::header_sniffer::{sniff_headers, SniffedHeaders};
use chardetng::EncodingDetector as ChardetngDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, info, warn};

/// 解码后的文件文本
#[derive(Debug, Clone)]
pub struct DecodedText {
    /// 去掉BOM后的文本
    pub text: String,
    /// 检测到的编码
    pub encoding: &'static Encoding,
    /// 解码时是否出现替换字符
    pub had_errors: bool,
}

/// 文件解析器配置
#[derive(Debug, Clone)]
pub struct FileParserConfig {
    /// 预览的最大数据行数
    pub preview_rows: usize,
    /// 文件大小上限（字节，0表示无限制）
    pub max_file_size: u64,
}

impl Default for FileParserConfig {
    fn default() -> Self {
        Self {
            preview_rows: 10,
            max_file_size: 0,
        }
    }
}

/// 编码检测器
///
/// 检测顺序：BOM → chardetng → UTF-8
pub struct EncodingDetector {
    /// 检测采样大小
    sample_size: usize,
}

impl Default for EncodingDetector {
    fn default() -> Self {
        Self { sample_size: 8192 }
    }
}

impl EncodingDetector {
    /// 创建新的编码检测器
    pub fn new() -> Self {
        Self::default()
    }

    /// 检测字节内容的编码
    pub fn detect(&self, data: &[u8]) -> &'static Encoding {
        if data.is_empty() {
            return UTF_8;
        }

        if let Some(encoding) = self.detect_bom(data) {
            debug!("通过BOM检测到编码: {}", encoding.name());
            return encoding;
        }

        if std::str::from_utf8(data).is_ok() {
            return UTF_8;
        }

        let sample = &data[..data.len().min(self.sample_size)];
        let mut detector = ChardetngDetector::new();
        detector.feed(sample, sample.len() == data.len());
        let guess = detector.guess(None, true);
        debug!("通过chardetng检测到编码: {}", guess.name());
        guess
    }

    /// BOM检测
    fn detect_bom(&self, data: &[u8]) -> Option<&'static Encoding> {
        if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
            return Some(UTF_8);
        }
        if data.starts_with(&[0xFF, 0xFE]) {
            return Some(UTF_16LE);
        }
        if data.starts_with(&[0xFE, 0xFF]) {
            return Some(UTF_16BE);
        }
        None
    }

    /// 检测编码并解码为UTF-8文本（会去掉BOM）
    pub fn decode(&self, data: &[u8]) -> DecodedText {
        let encoding = self.detect(data);
        let (text, actual, had_errors) = encoding.decode(data);
        let text = match text {
            Cow::Borrowed(s) => s.to_string(),
            Cow::Owned(s) => s,
        };
        DecodedText {
            text,
            encoding: actual,
            had_errors,
        }
    }
}

/// 文件解析器主结构
pub struct FileParser {
    config: FileParserConfig,
    encoding_detector: EncodingDetector,
}

impl Default for FileParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FileParser {
    /// 使用默认配置创建解析器
    pub fn new() -> Self {
        Self::with_config(FileParserConfig::default())
    }

    /// 使用自定义配置创建解析器
    pub fn with_config(config: FileParserConfig) -> Self {
        Self {
            config,
            encoding_detector: EncodingDetector::new(),
        }
    }

    pub fn config(&self) -> &FileParserConfig {
        &self.config
    }

    /// 解码文件字节
    pub fn decode(&self, data: &[u8]) -> AppResult<DecodedText> {
        if self.config.max_file_size > 0 && data.len() as u64 > self.config.max_file_size {
            return Err(AppError::Parse(format!(
                "File is {} bytes, limit is {} bytes",
                data.len(),
                self.config.max_file_size
            )));
        }
        let decoded = self.encoding_detector.decode(data);
        if decoded.had_errors {
            warn!("使用 {} 解码时出现无效字节", decoded.encoding.name());
        }
        Ok(decoded)
    }

    /// 解码并嗅探表头；未检测到分隔符时返回 `None`
    pub fn sniff(&self, data: &[u8]) -> AppResult<Option<SniffedHeaders>> {
        let decoded = self.decode(data)?;
        let sniffed = sniff_headers(&decoded.text);
        match &sniffed {
            Some(headers) => debug!(
                "检测到分隔符 {:?}，共 {} 列",
                headers.delimiter,
                headers.headers.len()
            ),
            None => debug!("表头中没有候选分隔符"),
        }
        Ok(sniffed)
    }

    /// 生成文件的预览信息：表头、分隔符、编码和前几行数据
    pub fn generate_preview(&self, data: &[u8]) -> AppResult<HeaderPreview> {
        let decoded = self.decode(data)?;
        let encoding = decoded.encoding.name().to_string();

        let Some(sniffed) = sniff_headers(&decoded.text) else {
            return Ok(HeaderPreview {
                headers: Vec::new(),
                delimiter: None,
                rows: Vec::new(),
                total_rows: 0,
                encoding,
            });
        };

        let (records, total_rows) = parse_csv_rows(
            decoded.text.as_bytes(),
            sniffed.delimiter,
            self.config.preview_rows,
        )
        .map_err(|e| AppError::Parse(format!("CSV预览失败: {}", e)))?;

        Ok(HeaderPreview {
            headers: sniffed.headers,
            delimiter: Some(sniffed.delimiter),
            rows: records.into_iter().map(|record| record.fields).collect(),
            total_rows,
            encoding,
        })
    }

    /// 从磁盘读取文件并生成预览
    pub async fn preview_file<P: AsRef<Path>>(&self, file_path: P) -> AppResult<HeaderPreview> {
        let path = file_path.as_ref();
        info!("生成文件预览: {}", path.display());
        let data = tokio::fs::read(path).await?;
        self.generate_preview(&data)
    }
}
