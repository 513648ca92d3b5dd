/// 构建期生成的单个首字母分区：`(音节, 字数, 分区内字节偏移)`。
pub(crate) struct RawBucket {
    pub char_start: u32,
    pub syllables: &'static [(&'static str, u16, u32)],
}

include!(concat!(env!("OUT_DIR"), "/code_table_gen.rs"));
