use std::{
    fs::File,
    io::{self, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use zh_core::error::{DecodeError, Result};
use zh_pinyin::SyllableIndex;

/// 单字码表文件（`zh_pinyin.bin`）。
///
/// 只在打开时检查一次长度；每次查询重新打开文件，句柄随查询结束释放。
#[derive(Debug, Clone)]
pub struct CharStore {
    path: PathBuf,
    len: u64,
}

impl CharStore {
    /// 打开码表并确认索引中的每条记录都落在文件内。
    pub fn open(path: impl Into<PathBuf>, index: &SyllableIndex) -> Result<Self> {
        let path = path.into();
        let len = std::fs::metadata(&path)
            .map_err(|e| DecodeError::store(&path, e))?
            .len();
        let extent = index.extent();
        if len < extent {
            return Err(DecodeError::malformed(
                &path,
                format!("文件长度 {len} 字节，索引需要至少 {extent} 字节"),
            ));
        }
        Ok(Self { path, len })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn reader(&self) -> Result<StoreReader<'_>> {
        let file = File::open(&self.path).map_err(|e| DecodeError::store(&self.path, e))?;
        Ok(StoreReader {
            file,
            path: &self.path,
        })
    }
}

/// 一次查询内使用的文件句柄。
pub(crate) struct StoreReader<'a> {
    file: File,
    path: &'a Path,
}

impl StoreReader<'_> {
    pub fn read_at(&mut self, pos: u64, buf: &mut [u8]) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(pos))
            .and_then(|_| self.file.read_exact(buf))
            .map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => {
                    DecodeError::malformed(self.path, format!("读取 {pos:#x} 处 {} 字节时文件结束", buf.len()))
                }
                _ => DecodeError::store(self.path, e),
            })
    }
}
