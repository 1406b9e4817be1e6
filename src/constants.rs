/// BMP 文件头 (BITMAPFILEHEADER + BITMAPINFOHEADER) 的固定大小 (字节)。
pub const BMP_HEADER_SIZE: usize = 54;

/// BMP 魔数，即 ASCII 字符 "BM" 的小端表示。
pub const BMP_MAGIC: u16 = 0x4D42;

/// 本工具支持的 DIB 头大小 (BITMAPINFOHEADER)。
pub const INFO_HEADER_SIZE: u32 = 40;

/// 本工具唯一支持的位深。
pub const SUPPORTED_BITS_PER_PIXEL: u16 = 24;

/// 无压缩 (BI_RGB)。
pub const COMPRESSION_NONE: u32 = 0;

/// 24 位图像中每个像素占用的字节数 (B, G, R)。
pub const BYTES_PER_PIXEL: usize = 3;

/// 用于隐写消息长度的像素字节数。
/// 长度字段为 `u8` (8 bits)，每个像素字节存储 1 bit，因此需要 8 个字节。
pub const LENGTH_HIDING_BYTES: usize = 8;

/// 用于隐写单个字符的像素字节数。
pub const BYTES_PER_CHAR: usize = 8;

/// 长度字段只有 8 位，因此最多可隐藏 255 个字符。
pub const MAX_MESSAGE_LENGTH: usize = u8::MAX as usize;

/// 消息文件中单行允许的最大长度。
pub const MAX_MESSAGE_LINE: usize = 1000;

/// 十六进制转储中每行显示的字节数。
pub const DUMP_ROW_WIDTH: usize = 16;
