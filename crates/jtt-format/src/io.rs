//! I/O 抽象层.
//!
//! 对标 FFmpeg 的 `AVIOContext`, 为解封装器/封装器提供统一的读写接口,
//! 支持文件与内存缓冲区后端.
//!
//! 读缓冲区同时充当前瞻 (lookahead) 缓冲区: `peek_bytes()` 只查看数据而不消耗,
//! 因此解封装器在不可 seek 的输入上也能"先看后决定".

use std::io::{self, Read, Seek, Write};

use jtt_core::{JttError, JttResult};

/// I/O 上下文
///
/// 封装底层 I/O 操作, 为解封装器/封装器提供统一的数据读写接口.
pub struct IoContext {
    /// 内部 I/O 实现
    inner: Box<dyn IoBackend>,
    /// 读缓冲区
    buffer: Vec<u8>,
    /// 缓冲区中的有效数据长度
    buf_len: usize,
    /// 缓冲区当前读取位置
    buf_pos: usize,
}

/// I/O 后端 trait
///
/// 实现此 trait 以支持不同的 I/O 来源.
pub trait IoBackend: Send {
    /// 读取数据到缓冲区, 返回 0 表示流末尾
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    /// 全部写入
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;
    /// 刷新写缓冲
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
    /// 定位 (seek)
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64>;
    /// 获取当前位置
    fn position(&mut self) -> io::Result<u64>;
    /// 获取总大小 (如果可知)
    fn size(&self) -> Option<u64>;
    /// 是否支持 seek
    fn is_seekable(&self) -> bool;
}

/// 默认缓冲区大小 (32 KB)
const DEFAULT_BUFFER_SIZE: usize = 32 * 1024;

impl IoContext {
    /// 从 I/O 后端创建上下文
    pub fn new(backend: Box<dyn IoBackend>) -> Self {
        Self {
            inner: backend,
            buffer: vec![0u8; DEFAULT_BUFFER_SIZE],
            buf_len: 0,
            buf_pos: 0,
        }
    }

    /// 从文件路径打开 (只读)
    pub fn open_read(path: &str) -> JttResult<Self> {
        let file = std::fs::File::open(path)?;
        Ok(Self::new(Box::new(FileBackend::new(file))))
    }

    /// 从文件路径打开 (写入)
    pub fn open_write(path: &str) -> JttResult<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(FileBackend::new(file))))
    }

    /// 从内存数据创建只读上下文
    pub fn from_memory(data: Vec<u8>) -> Self {
        Self::new(Box::new(MemoryBackend::from_data(data)))
    }

    // ========================
    // 读取方法
    // ========================

    /// 读取指定字节数
    ///
    /// 一个字节都读不到时返回 `JttError::Eof`; 读到一部分后遇到流末尾同样返回
    /// `Eof`, 由调用方决定这是干净结束还是截断.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> JttResult<()> {
        let mut total_read = 0;
        while total_read < buf.len() {
            let buffered = self.buf_len - self.buf_pos;
            if buffered > 0 {
                let to_copy = buffered.min(buf.len() - total_read);
                buf[total_read..total_read + to_copy]
                    .copy_from_slice(&self.buffer[self.buf_pos..self.buf_pos + to_copy]);
                self.buf_pos += to_copy;
                total_read += to_copy;
            } else {
                self.buf_pos = 0;
                self.buf_len = self.inner.read(&mut self.buffer)?;
                if self.buf_len == 0 {
                    return Err(JttError::Eof);
                }
            }
        }
        Ok(())
    }

    /// 读取 1 个字节
    pub fn read_u8(&mut self) -> JttResult<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// 读取 u16 大端
    pub fn read_u16_be(&mut self) -> JttResult<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// 读取 u64 大端
    pub fn read_u64_be(&mut self) -> JttResult<u64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }

    /// 读取指定数量的字节
    pub fn read_bytes(&mut self, count: usize) -> JttResult<Vec<u8>> {
        let mut buf = vec![0u8; count];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// 读取 `count` 字节并追加到 `dst` 末尾
    ///
    /// 对标 FFmpeg 的 `av_append_packet`. 读取失败时 `dst` 恢复原长度.
    pub fn append_bytes(&mut self, dst: &mut Vec<u8>, count: usize) -> JttResult<()> {
        let old_len = dst.len();
        dst.resize(old_len + count, 0);
        if let Err(e) = self.read_exact(&mut dst[old_len..]) {
            dst.truncate(old_len);
            return Err(e);
        }
        Ok(())
    }

    /// 跳过指定字节数
    pub fn skip(&mut self, count: usize) -> JttResult<()> {
        // 先尝试消耗缓冲区中的数据
        let buffered = self.buf_len - self.buf_pos;
        if count <= buffered {
            self.buf_pos += count;
            return Ok(());
        }

        let remaining = count - buffered;
        self.buf_pos = self.buf_len;

        if self.inner.is_seekable() {
            self.inner.seek(io::SeekFrom::Current(remaining as i64))?;
        } else {
            // 逐块丢弃读取的数据
            let mut left = remaining;
            while left > 0 {
                let to_read = left.min(self.buffer.len());
                let n = self.inner.read(&mut self.buffer[..to_read])?;
                if n == 0 {
                    self.buf_pos = 0;
                    self.buf_len = 0;
                    return Err(JttError::Eof);
                }
                left -= n;
            }
            self.buf_pos = 0;
            self.buf_len = 0;
        }
        Ok(())
    }

    // ========================
    // 前瞻方法
    // ========================

    /// 尽量让缓冲区中至少有 `count` 个未消耗字节, 返回实际可用的字节数
    ///
    /// 流末尾时可能少于 `count`.
    fn fill_lookahead(&mut self, count: usize) -> JttResult<usize> {
        if count > self.buffer.len() {
            return Err(JttError::InvalidArgument(format!(
                "前瞻长度 {} 超过缓冲区大小 {}",
                count,
                self.buffer.len()
            )));
        }
        if self.buf_pos + count > self.buffer.len() {
            // 未消耗的数据搬到缓冲区开头, 为后续读取腾出空间
            self.buffer.copy_within(self.buf_pos..self.buf_len, 0);
            self.buf_len -= self.buf_pos;
            self.buf_pos = 0;
        }
        while self.buf_len - self.buf_pos < count {
            let n = self.inner.read(&mut self.buffer[self.buf_len..])?;
            if n == 0 {
                break;
            }
            self.buf_len += n;
        }
        Ok((self.buf_len - self.buf_pos).min(count))
    }

    /// 查看接下来的 `count` 个字节, 不消耗
    ///
    /// 数据不足 `count` 字节时返回 `JttError::Eof`, 已缓冲的数据保持不变.
    pub fn peek_bytes(&mut self, count: usize) -> JttResult<&[u8]> {
        if self.fill_lookahead(count)? < count {
            return Err(JttError::Eof);
        }
        Ok(&self.buffer[self.buf_pos..self.buf_pos + count])
    }

    /// 查看接下来最多 `max` 个字节, 不消耗 (用于格式探测)
    pub fn peek_available(&mut self, max: usize) -> JttResult<&[u8]> {
        let max = max.min(self.buffer.len());
        let n = self.fill_lookahead(max)?;
        Ok(&self.buffer[self.buf_pos..self.buf_pos + n])
    }

    // ========================
    // 写入方法
    // ========================

    /// 写入全部数据
    pub fn write_all(&mut self, buf: &[u8]) -> JttResult<()> {
        self.inner.write_all(buf)?;
        Ok(())
    }

    /// 刷新底层写缓冲
    pub fn flush(&mut self) -> JttResult<()> {
        self.inner.flush()?;
        Ok(())
    }

    // ========================
    // 定位方法
    // ========================

    /// 定位 (seek)
    ///
    /// 注意: seek 会清空读缓冲区.
    pub fn seek(&mut self, pos: io::SeekFrom) -> JttResult<u64> {
        self.buf_pos = 0;
        self.buf_len = 0;
        Ok(self.inner.seek(pos)?)
    }

    /// 获取当前位置
    ///
    /// 考虑读缓冲区中尚未消耗的数据量.
    pub fn position(&mut self) -> JttResult<u64> {
        let raw_pos = self.inner.position()?;
        let buffered = (self.buf_len - self.buf_pos) as u64;
        Ok(raw_pos - buffered)
    }

    /// 是否支持随机访问
    pub fn is_seekable(&self) -> bool {
        self.inner.is_seekable()
    }

    /// 获取总大小
    pub fn size(&self) -> Option<u64> {
        self.inner.size()
    }
}

/// 文件 I/O 后端
struct FileBackend {
    file: std::fs::File,
    size: Option<u64>,
}

impl FileBackend {
    fn new(file: std::fs::File) -> Self {
        let size = file.metadata().ok().map(|m| m.len());
        Self { file, size }
    }
}

impl IoBackend for FileBackend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }

    fn position(&mut self) -> io::Result<u64> {
        self.file.stream_position()
    }

    fn size(&self) -> Option<u64> {
        self.size
    }

    fn is_seekable(&self) -> bool {
        true
    }
}

/// 内存缓冲区 I/O 后端
///
/// 用于测试和内存中处理. 写入的数据可通过共享句柄 [`MemorySink`] 取回.
pub struct MemoryBackend {
    /// 数据缓冲区
    data: std::sync::Arc<std::sync::Mutex<Vec<u8>>>,
    /// 当前位置
    pos: usize,
}

/// 内存后端的数据句柄, 用于在 `IoContext` 之外读取已写入的数据
#[derive(Clone)]
pub struct MemorySink(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl MemorySink {
    /// 复制一份当前数据
    pub fn data(&self) -> Vec<u8> {
        match self.0.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl MemoryBackend {
    /// 从已有数据创建 (用于读取)
    pub fn from_data(data: Vec<u8>) -> Self {
        Self {
            data: std::sync::Arc::new(std::sync::Mutex::new(data)),
            pos: 0,
        }
    }

    /// 创建空缓冲区 (用于写入)
    pub fn new() -> Self {
        Self::from_data(Vec::new())
    }

    /// 获取数据句柄
    pub fn sink(&self) -> MemorySink {
        MemorySink(std::sync::Arc::clone(&self.data))
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, Vec<u8>>> {
        self.data
            .lock()
            .map_err(|_| io::Error::other("内存缓冲区锁已中毒"))
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl IoBackend for MemoryBackend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let pos = self.pos;
        let data = self.lock()?;
        let available = data.len().saturating_sub(pos);
        let to_read = buf.len().min(available);
        if to_read == 0 {
            return Ok(0);
        }
        buf[..to_read].copy_from_slice(&data[pos..pos + to_read]);
        drop(data);
        self.pos += to_read;
        Ok(to_read)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        let pos = self.pos;
        let mut data = self.lock()?;
        if pos >= data.len() {
            data.resize(pos, 0);
            data.extend_from_slice(buf);
        } else {
            // 覆盖已有数据
            let overlap = (data.len() - pos).min(buf.len());
            data[pos..pos + overlap].copy_from_slice(&buf[..overlap]);
            if buf.len() > overlap {
                data.extend_from_slice(&buf[overlap..]);
            }
        }
        drop(data);
        self.pos += buf.len();
        Ok(())
    }

    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let len = self.lock()?.len() as i64;
        let new_pos = match pos {
            io::SeekFrom::Start(offset) => offset as i64,
            io::SeekFrom::End(offset) => len + offset,
            io::SeekFrom::Current(offset) => self.pos as i64 + offset,
        };
        if new_pos < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek 位置不能为负",
            ));
        }
        self.pos = new_pos as usize;
        Ok(self.pos as u64)
    }

    fn position(&mut self) -> io::Result<u64> {
        Ok(self.pos as u64)
    }

    fn size(&self) -> Option<u64> {
        self.lock().ok().map(|d| d.len() as u64)
    }

    fn is_seekable(&self) -> bool {
        true
    }
}

/// 只进不退的流式后端
///
/// 包装任意 `Read`, 不支持 seek. 用于模拟网络等不可回退的输入.
pub struct StreamBackend<R: Read + Send> {
    reader: R,
    pos: u64,
}

impl<R: Read + Send> StreamBackend<R> {
    /// 包装一个读取器
    pub fn new(reader: R) -> Self {
        Self { reader, pos: 0 }
    }
}

impl<R: Read + Send> IoBackend for StreamBackend<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }

    fn write_all(&mut self, _buf: &[u8]) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "流式后端不支持写入",
        ))
    }

    fn seek(&mut self, _pos: io::SeekFrom) -> io::Result<u64> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "流式后端不支持 seek",
        ))
    }

    fn position(&mut self) -> io::Result<u64> {
        Ok(self.pos)
    }

    fn size(&self) -> Option<u64> {
        None
    }

    fn is_seekable(&self) -> bool {
        false
    }
}
